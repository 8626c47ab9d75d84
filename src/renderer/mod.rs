//! Interactive family view
//!
//! A renderer-agnostic state machine for the family graph screen. It owns
//! the lifecycle (loading, ready, error), the camera (zoom and pan), the
//! gesture substate (zooming, panning, dragging, selection), collapse
//! state, and node positions under the active layout mode. Hosts feed it
//! input, drain [`ViewEvent`]s to update their widgets, and do the actual
//! drawing themselves.
//!
//! The view never talks to the network: a loader delivers built families
//! through [`FamilyView::set_family`], and fetch failures land in
//! [`FamilyView::set_error`] with a retry offered to the user.

pub mod picking;

pub use picking::{PickIndex, PickTarget};

use crate::aggregate::ContentFamily;
use crate::config::{SimulationConfig, ViewConfig};
use crate::identifiers::ContentId;
use crate::layout::{ForceSimulation, HierarchicalLayout, LayoutMode};
use crate::projections::{GraphData, GraphDataOptions};
use crate::value_objects::{Dimensions, Position2D};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, VecDeque};

/// Lifecycle phase of the view
#[derive(Debug, Clone, PartialEq)]
pub enum ViewPhase {
    /// A family fetch is in flight
    Loading,
    /// Interactive; gestures and mutations are accepted
    Ready,
    /// The fetch or build failed; the host should offer a retry
    Error { message: String },
}

/// Active gesture while the view is ready
///
/// `NodeSelected` is a resting substate: it survives
/// [`FamilyView::end_interaction`] and is only left by selecting another
/// node, clearing the selection, or leaving the ready phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    Zooming,
    Panning,
    Dragging { node: ContentId },
    NodeSelected { node: ContentId },
}

/// Notifications for the embedding host, drained via
/// [`FamilyView::poll_events`]
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    LoadStarted { content_id: ContentId },
    Ready { root_id: ContentId, node_count: usize },
    LoadFailed { message: String },
    NodeSelected { node: ContentId },
    SelectionCleared,
    SubtreeCollapsed { node: ContentId },
    SubtreeExpanded { node: ContentId },
    ZoomChanged { scale: f64 },
    LayoutSettled,
}

/// Interactive state machine for one family graph screen
pub struct FamilyView {
    view_config: ViewConfig,
    layout_mode: LayoutMode,
    dimensions: Dimensions,
    options: GraphDataOptions,
    phase: ViewPhase,
    interaction: Interaction,
    family: Option<ContentFamily>,
    data: Option<GraphData>,
    positions: HashMap<ContentId, Position2D>,
    simulation: ForceSimulation,
    scale: f64,
    offset: Position2D,
    pending_mutation: bool,
    settled_notified: bool,
    events: VecDeque<ViewEvent>,
}

impl FamilyView {
    /// Create a view in the loading phase
    pub fn new(view_config: ViewConfig, simulation_config: SimulationConfig) -> Self {
        Self {
            view_config,
            layout_mode: LayoutMode::default(),
            dimensions: Dimensions::default(),
            options: GraphDataOptions::default(),
            phase: ViewPhase::Loading,
            interaction: Interaction::Idle,
            family: None,
            data: None,
            positions: HashMap::new(),
            simulation: ForceSimulation::new(simulation_config),
            scale: 1.0,
            offset: Position2D::default(),
            pending_mutation: false,
            settled_notified: false,
            events: VecDeque::new(),
        }
    }

    /// Choose the layout mode before the first family arrives
    pub fn with_layout_mode(mut self, mode: LayoutMode) -> Self {
        self.layout_mode = mode;
        self
    }

    /// Size the viewport before the first family arrives
    pub fn with_dimensions(mut self, dimensions: Dimensions) -> Self {
        self.dimensions = dimensions;
        self
    }

    /// Override sizing and theme before the first family arrives
    pub fn with_options(mut self, options: GraphDataOptions) -> Self {
        self.options = options;
        self
    }

    pub fn phase(&self) -> &ViewPhase {
        &self.phase
    }

    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    pub fn is_ready(&self) -> bool {
        self.phase == ViewPhase::Ready
    }

    /// True when the view is showing an error and retrying makes sense
    pub fn can_retry(&self) -> bool {
        matches!(self.phase, ViewPhase::Error { .. })
    }

    /// The current projection, absent until the first family arrives
    pub fn data(&self) -> Option<&GraphData> {
        self.data.as_ref()
    }

    /// The family behind the view
    pub fn family(&self) -> Option<&ContentFamily> {
        self.family.as_ref()
    }

    /// World-space positions of the visible nodes
    pub fn positions(&self) -> &HashMap<ContentId, Position2D> {
        &self.positions
    }

    /// Drain pending notifications
    pub fn poll_events(&mut self) -> Vec<ViewEvent> {
        self.events.drain(..).collect()
    }

    // --- lifecycle ---

    /// Mark a fetch as in flight
    ///
    /// Also the retry entry point from the error phase. Stale data keeps
    /// rendering underneath the loading indicator until the new family
    /// lands.
    pub fn begin_loading(&mut self, content_id: ContentId) {
        self.phase = ViewPhase::Loading;
        self.interaction = Interaction::Idle;
        self.events.push_back(ViewEvent::LoadStarted { content_id });
    }

    /// Install a freshly built family and become interactive
    ///
    /// Camera and collapse state survive refetches, as do the positions of
    /// nodes that still exist; vanished nodes are dropped and newcomers
    /// placed by the layout.
    pub fn set_family(&mut self, family: ContentFamily) {
        self.family = Some(family);
        self.phase = ViewPhase::Ready;
        self.interaction = Interaction::Idle;
        self.regenerate();
        if let Some(data) = &self.data {
            self.events.push_back(ViewEvent::Ready {
                root_id: data.root_id,
                node_count: data.nodes.len(),
            });
        }
    }

    /// Record a failed fetch and enter the error phase
    pub fn set_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.phase = ViewPhase::Error {
            message: message.clone(),
        };
        self.interaction = Interaction::Idle;
        self.events.push_back(ViewEvent::LoadFailed { message });
    }

    /// Switch layout modes in place
    pub fn set_layout_mode(&mut self, mode: LayoutMode) {
        if self.layout_mode == mode {
            return;
        }
        self.layout_mode = mode;
        self.regenerate();
    }

    /// Resize the viewport
    pub fn set_dimensions(&mut self, dimensions: Dimensions) {
        self.dimensions = dimensions;
        self.regenerate();
    }

    /// Re-project the family and refresh positions for the visible set
    fn regenerate(&mut self) {
        let data = match &self.family {
            Some(family) => GraphData::from_family(family, &self.options),
            None => return,
        };
        match self.layout_mode {
            LayoutMode::Hierarchical => {
                let origin =
                    Position2D::new(self.dimensions.center().x, self.dimensions.height * 0.1);
                self.positions = HierarchicalLayout::centered_on(origin).apply(&data);
            }
            LayoutMode::ForceDirected => {
                if self.positions.is_empty() {
                    let seed = data.root_id.as_uuid().as_u128() as u64;
                    self.positions = self.simulation.scatter(&data, self.dimensions, seed);
                } else {
                    // Keep surviving positions; newcomers sprout just off
                    // their parent so expansion unfolds from it instead of
                    // teleporting in.
                    let mut next = HashMap::with_capacity(data.nodes.len());
                    if let Some(family) = &self.family {
                        for node in &data.nodes {
                            if let Some(existing) = self.positions.get(&node.id) {
                                next.insert(node.id, *existing);
                                continue;
                            }
                            let anchor = family
                                .node(node.id)
                                .and_then(|member| member.parent)
                                .and_then(|parent| self.positions.get(&parent))
                                .copied()
                                .unwrap_or_else(|| self.dimensions.center());
                            next.insert(node.id, sprout(anchor, node.id));
                        }
                    }
                    self.positions = next;
                }
                self.simulation.reheat();
            }
        }
        self.settled_notified = false;
        self.data = Some(data);
    }

    // --- camera ---

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> Position2D {
        self.offset
    }

    /// Zoom in one step, clamped to the configured range
    pub fn zoom_in(&mut self) {
        self.apply_zoom(self.view_config.zoom_step);
    }

    /// Zoom out one step, clamped to the configured range
    pub fn zoom_out(&mut self) {
        self.apply_zoom(1.0 / self.view_config.zoom_step);
    }

    fn apply_zoom(&mut self, factor: f64) {
        if !self.is_ready() {
            return;
        }
        let next = (self.scale * factor).clamp(self.view_config.min_zoom, self.view_config.max_zoom);
        if next == self.scale {
            // Already pinned at a bound; stepping further is a no-op.
            return;
        }
        self.scale = next;
        self.interaction = Interaction::Zooming;
        self.events.push_back(ViewEvent::ZoomChanged { scale: next });
    }

    /// Restore the default camera without touching selection or collapse
    pub fn zoom_reset(&mut self) {
        if !self.is_ready() {
            return;
        }
        if self.scale != 1.0 {
            self.events.push_back(ViewEvent::ZoomChanged { scale: 1.0 });
        }
        self.scale = 1.0;
        self.offset = Position2D::default();
    }

    /// Shift the camera by a screen-space delta
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        if !self.is_ready() {
            return;
        }
        self.offset.x += dx;
        self.offset.y += dy;
        self.interaction = Interaction::Panning;
    }

    /// Screen position of a world point under the current camera
    pub fn project(&self, world: Position2D) -> Position2D {
        Position2D::new(
            world.x * self.scale + self.offset.x,
            world.y * self.scale + self.offset.y,
        )
    }

    /// World position of a screen point under the current camera
    pub fn unproject(&self, screen: Position2D) -> Position2D {
        Position2D::new(
            (screen.x - self.offset.x) / self.scale,
            (screen.y - self.offset.y) / self.scale,
        )
    }

    // --- gestures ---

    /// Resolve the node under a screen point
    pub fn pick(&self, screen: Position2D) -> Option<ContentId> {
        if !self.is_ready() {
            return None;
        }
        let data = self.data.as_ref()?;
        PickIndex::build(data, &self.positions).hit(self.unproject(screen))
    }

    /// Handle a primary click at a screen position
    pub fn click_at(&mut self, screen: Position2D) {
        match self.pick(screen) {
            Some(node) => self.node_click(node),
            None => self.clear_selection(),
        }
    }

    /// Handle a primary click on a node
    ///
    /// Selects it, and when it has children also toggles its subtree
    /// between collapsed and expanded.
    pub fn node_click(&mut self, node: ContentId) {
        if !self.is_ready() {
            return;
        }
        let has_children = self
            .family
            .as_ref()
            .map_or(false, |family| family.has_descendants(node));
        self.interaction = Interaction::NodeSelected { node };
        self.events.push_back(ViewEvent::NodeSelected { node });
        if has_children {
            if self.options.collapsed.remove(&node) {
                self.events.push_back(ViewEvent::SubtreeExpanded { node });
            } else {
                self.options.collapsed.insert(node);
                self.events.push_back(ViewEvent::SubtreeCollapsed { node });
            }
            self.regenerate();
        }
    }

    /// Drop the selection, returning to idle
    pub fn clear_selection(&mut self) {
        if !self.is_ready() {
            return;
        }
        if matches!(self.interaction, Interaction::NodeSelected { .. }) {
            self.events.push_back(ViewEvent::SelectionCleared);
        }
        self.interaction = Interaction::Idle;
    }

    /// The selected node, if any
    pub fn selected_node(&self) -> Option<ContentId> {
        match self.interaction {
            Interaction::NodeSelected { node } => Some(node),
            _ => None,
        }
    }

    /// True when the node's subtree is currently hidden
    pub fn is_collapsed(&self, node: ContentId) -> bool {
        self.options.collapsed.contains(&node)
    }

    /// Begin dragging a node; it pins to the cursor until the gesture ends
    pub fn begin_drag(&mut self, node: ContentId) {
        if !self.is_ready() || !self.positions.contains_key(&node) {
            return;
        }
        self.interaction = Interaction::Dragging { node };
    }

    /// Move the dragged node to a world position
    pub fn drag_to(&mut self, world: Position2D) {
        let node = match self.interaction {
            Interaction::Dragging { node } => node,
            _ => return,
        };
        self.positions.insert(node, world);
        if self.layout_mode == LayoutMode::ForceDirected {
            self.simulation.reheat();
            self.settled_notified = false;
        }
    }

    /// End the active gesture
    ///
    /// Selection persists; zooming, panning, and dragging return to idle.
    pub fn end_interaction(&mut self) {
        if !self.is_ready() {
            return;
        }
        if !matches!(self.interaction, Interaction::NodeSelected { .. }) {
            self.interaction = Interaction::Idle;
        }
    }

    // --- simulation ---

    /// Step the force simulation by `dt` seconds
    ///
    /// Does nothing in hierarchical mode. A node being dragged stays
    /// pinned under the cursor while everything else keeps moving.
    pub fn advance(&mut self, dt: f64) {
        if !self.is_ready() || self.layout_mode != LayoutMode::ForceDirected {
            return;
        }
        let data = match &self.data {
            Some(data) => data,
            None => return,
        };
        let pinned = match self.interaction {
            Interaction::Dragging { node } => self.positions.get(&node).map(|p| (node, *p)),
            _ => None,
        };
        let mut next = self.simulation.advance(&self.positions, &data.edges, dt);
        if let Some((node, position)) = pinned {
            next.insert(node, position);
        }
        self.positions = next;
        if self.simulation.is_settled() && !self.settled_notified {
            self.settled_notified = true;
            self.events.push_back(ViewEvent::LayoutSettled);
        }
    }

    // --- mutation guard ---

    /// True while a structural mutation is awaiting its result
    pub fn mutation_pending(&self) -> bool {
        self.pending_mutation
    }

    /// Claim the single mutation slot
    ///
    /// Returns false while another mutation is in flight or the view is
    /// not interactive; hosts disable their mutation triggers on false.
    pub fn begin_mutation(&mut self) -> bool {
        if !self.is_ready() || self.pending_mutation {
            return false;
        }
        self.pending_mutation = true;
        true
    }

    /// Release the mutation slot once the backend answered
    pub fn finish_mutation(&mut self) {
        self.pending_mutation = false;
    }
}

/// Starting position for a node appearing next to `anchor`
///
/// The nudge is derived from the node id, so replays place newcomers
/// identically and a newcomer never spawns exactly on its parent.
fn sprout(anchor: Position2D, node: ContentId) -> Position2D {
    let mut rng = StdRng::seed_from_u64(node.as_uuid().as_u128() as u64);
    Position2D::new(
        anchor.x + rng.gen_range(-30.0..30.0),
        anchor.y + rng.gen_range(-30.0..30.0),
    )
}
