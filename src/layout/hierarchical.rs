//! Depth-layered tree layout
//!
//! Places the root row at the origin and each deeper generation one layer
//! further down, with every layer centered horizontally. Collapse filtering
//! happens upstream in the projection, so any node present in the graph
//! data gets a position.

use crate::identifiers::ContentId;
use crate::projections::GraphData;
use crate::value_objects::Position2D;
use std::collections::{BTreeMap, HashMap};

/// Layered layout for the parental hierarchy
pub struct HierarchicalLayout {
    /// Horizontal distance between sibling centers, in pixels
    pub node_spacing: f64,
    /// Vertical distance between depth layers, in pixels
    pub layer_spacing: f64,
    /// Where the root layer's center sits
    pub origin: Position2D,
}

impl Default for HierarchicalLayout {
    fn default() -> Self {
        Self {
            node_spacing: 140.0,
            layer_spacing: 120.0,
            origin: Position2D::default(),
        }
    }
}

impl HierarchicalLayout {
    /// Center the layout on a point, typically the viewport center
    pub fn centered_on(origin: Position2D) -> Self {
        Self {
            origin,
            ..Self::default()
        }
    }

    /// Assign a position to every node in the projection
    ///
    /// Nodes are grouped by depth in projection order, which keeps siblings
    /// adjacent, and each row is centered on the origin's x axis.
    pub fn apply(&self, data: &GraphData) -> HashMap<ContentId, Position2D> {
        let mut layers: BTreeMap<usize, Vec<ContentId>> = BTreeMap::new();
        for node in &data.nodes {
            layers.entry(node.depth).or_default().push(node.id);
        }

        let mut positions = HashMap::new();
        for (depth, members) in &layers {
            let count = members.len() as f64;
            let y = self.origin.y + *depth as f64 * self.layer_spacing;
            for (index, id) in members.iter().enumerate() {
                let x = self.origin.x + (index as f64 - (count - 1.0) / 2.0) * self.node_spacing;
                positions.insert(*id, Position2D::new(x, y));
            }
        }
        positions
    }
}
