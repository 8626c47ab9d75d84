//! Renderer-agnostic visualization projection
//!
//! Transforms a [`ContentFamily`] into flat node and edge lists with all
//! visual attributes precomputed: size, fill and label colors, border
//! emphasis, stroke width and dash pattern. These structures are ephemeral;
//! regenerate them from the family on every data change instead of patching
//! them in place.

use crate::aggregate::ContentFamily;
use crate::identifiers::{ContentId, RelationshipId};
use crate::value_objects::{
    Color, ContentMetrics, ContentType, HierarchicalPath, PlatformType, RelationshipType,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Write;

/// Smallest node diameter, in pixels
pub const MIN_NODE_SIZE: f64 = 20.0;
/// Largest node diameter, in pixels
pub const MAX_NODE_SIZE: f64 = 100.0;
/// Diameter used by [`NodeSizing::Fixed`]
pub const FIXED_NODE_SIZE: f64 = 40.0;

/// How node sizes are derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeSizing {
    /// Log-compressed view count. Logarithmic on purpose: linear scaling
    /// lets one viral item dwarf the rest of the family.
    #[default]
    Metric,
    /// Linear shrink from the root (largest) to the deepest leaf (smallest)
    Depth,
    /// Uniform diameter for every node
    Fixed,
}

/// Colors applied on top of platform branding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphTheme {
    pub background: Color,
    pub edge_color: Color,
    pub node_border: Color,
    pub node_border_width: f64,
    /// Border marking the family root
    pub root_border: Color,
    pub root_border_width: f64,
}

impl Default for GraphTheme {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            edge_color: Color::rgb(0x9c, 0xa3, 0xaf),
            node_border: Color::rgb(0xd1, 0xd5, 0xdb),
            node_border_width: 1.5,
            root_border: Color::rgb(0x25, 0x63, 0xeb),
            root_border_width: 3.0,
        }
    }
}

/// Options controlling projection output
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphDataOptions {
    pub node_sizing: NodeSizing,
    pub theme: GraphTheme,
    /// Nodes whose descendant subtrees are hidden from the output. The
    /// collapsed nodes themselves stay visible, flagged as collapsed.
    pub collapsed: HashSet<ContentId>,
}

/// One renderable node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: ContentId,
    pub label: String,
    pub platform: PlatformType,
    pub content_type: ContentType,
    pub metrics: ContentMetrics,
    /// Diameter in pixels, already clamped
    pub size: f64,
    pub fill_color: Color,
    /// Label color chosen for contrast against the fill
    pub text_color: Color,
    pub border_color: Color,
    pub border_width: f64,
    pub is_root: bool,
    pub depth: usize,
    pub path: HierarchicalPath,
    pub has_children: bool,
    pub collapsed: bool,
}

/// One renderable edge, always drawn source to target
///
/// Parental edges are emitted parent-first regardless of how the underlying
/// relationship was recorded, so arrows read down the hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub id: RelationshipId,
    pub source: ContentId,
    pub target: ContentId,
    pub relationship_type: RelationshipType,
    /// Stroke width in pixels
    pub width: f64,
    /// Dash segment lengths; `None` renders solid
    pub dash_pattern: Option<Vec<f64>>,
    pub color: Color,
}

/// Flat node/edge lists ready for a renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub root_id: ContentId,
    /// The family version this projection was generated from
    pub family_version: u64,
}

/// Stroke width and dash pattern for a relationship type
///
/// Parental edges are solid and widest: weight signals structural
/// importance, not confidence.
pub fn edge_stroke(relationship_type: RelationshipType) -> (f64, Option<Vec<f64>>) {
    match relationship_type {
        RelationshipType::Parent | RelationshipType::Child => (3.0, None),
        RelationshipType::Derivative => (2.0, Some(vec![6.0, 3.0])),
        RelationshipType::Repurposed => (2.0, Some(vec![2.0, 2.0])),
        RelationshipType::Reaction => (1.5, Some(vec![4.0, 2.0])),
        RelationshipType::Reference => (1.0, Some(vec![1.0, 3.0])),
    }
}

fn metric_size(views: u64) -> f64 {
    (MIN_NODE_SIZE + 10.0 * ((views as f64) + 1.0).log10()).clamp(MIN_NODE_SIZE, MAX_NODE_SIZE)
}

fn depth_size(depth: usize, max_depth: usize) -> f64 {
    if max_depth == 0 {
        return MAX_NODE_SIZE;
    }
    let step = (MAX_NODE_SIZE - MIN_NODE_SIZE) / max_depth as f64;
    (MAX_NODE_SIZE - depth as f64 * step).max(MIN_NODE_SIZE)
}

impl GraphData {
    /// Project a family into renderable nodes and edges
    pub fn from_family(family: &ContentFamily, options: &GraphDataOptions) -> Self {
        // Paths of collapsed members; anything strictly below one is hidden.
        let collapsed_paths: Vec<HierarchicalPath> = options
            .collapsed
            .iter()
            .filter_map(|id| family.node(*id))
            .map(|node| node.path.clone())
            .collect();
        let hidden = |path: &HierarchicalPath| {
            collapsed_paths
                .iter()
                .any(|ancestor| ancestor.is_ancestor_of(path))
        };

        let max_depth = family.max_depth();
        let theme = &options.theme;

        let mut nodes = Vec::with_capacity(family.len());
        let mut visible: HashSet<ContentId> = HashSet::with_capacity(family.len());
        for member in family.nodes() {
            if hidden(&member.path) {
                continue;
            }
            let id = member.id();
            visible.insert(id);

            let size = match options.node_sizing {
                NodeSizing::Metric => metric_size(member.item.metrics_or_default().views),
                NodeSizing::Depth => depth_size(member.depth, max_depth),
                NodeSizing::Fixed => FIXED_NODE_SIZE,
            };
            let fill_color = member.item.platform.brand_color();
            let is_root = member.is_root();
            let (border_color, border_width) = if is_root {
                (theme.root_border, theme.root_border_width)
            } else {
                (theme.node_border, theme.node_border_width)
            };

            nodes.push(GraphNode {
                id,
                label: member.item.title.clone(),
                platform: member.item.platform,
                content_type: member.item.content_type,
                metrics: member.item.metrics_or_default(),
                size,
                fill_color,
                text_color: fill_color.contrasting_text_color(),
                border_color,
                border_width,
                is_root,
                depth: member.depth,
                path: member.path.clone(),
                has_children: family.has_descendants(id),
                collapsed: options.collapsed.contains(&id),
            });
        }

        let mut edges = Vec::with_capacity(family.relationships().len());
        for relationship in family.relationships() {
            // Draw parental edges parent-first.
            let (source, target) = relationship
                .parental_endpoints()
                .unwrap_or((relationship.source, relationship.target));
            if !visible.contains(&source) || !visible.contains(&target) {
                continue;
            }
            let (width, dash_pattern) = edge_stroke(relationship.relationship_type);
            edges.push(GraphEdge {
                id: relationship.id,
                source,
                target,
                relationship_type: relationship.relationship_type,
                width,
                dash_pattern,
                color: theme.edge_color,
            });
        }

        Self {
            nodes,
            edges,
            root_id: family.root_id(),
            family_version: family.version(),
        }
    }

    /// Look up a rendered node
    pub fn node(&self, id: ContentId) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Generate GraphViz DOT format
    pub fn to_dot(&self) -> String {
        let mut output = String::new();
        writeln!(&mut output, "digraph ContentFamily {{").unwrap();
        writeln!(&mut output, "    rankdir=TB;").unwrap();
        writeln!(&mut output, "    node [shape=circle style=filled];").unwrap();
        writeln!(&mut output).unwrap();

        for node in &self.nodes {
            let label = node.label.replace('"', "\\\"");
            writeln!(
                &mut output,
                "    \"{}\" [label=\"{}\" fillcolor=\"{}\" fontcolor=\"{}\" width={:.2}];",
                node.id,
                label,
                node.fill_color.to_hex(),
                node.text_color.to_hex(),
                node.size / MAX_NODE_SIZE * 2.0,
            )
            .unwrap();
        }
        writeln!(&mut output).unwrap();

        for edge in &self.edges {
            let style = if edge.dash_pattern.is_some() {
                "dashed"
            } else {
                "solid"
            };
            writeln!(
                &mut output,
                "    \"{}\" -> \"{}\" [style={} penwidth={:.1} label=\"{}\"];",
                edge.source, edge.target, style, edge.width, edge.relationship_type,
            )
            .unwrap();
        }

        writeln!(&mut output, "}}").unwrap();
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::FamilyBuilder;
    use crate::identifiers::CreatorId;
    use crate::value_objects::{
        Confidence, ContentItem, ContentRelationship, CreationMethod,
    };
    use chrono::Utc;

    fn item(id: ContentId, platform: PlatformType, title: &str, views: u64) -> ContentItem {
        ContentItem::new(
            id,
            CreatorId::new(),
            platform,
            ContentType::Video,
            title,
            Utc::now(),
        )
        .with_metrics(ContentMetrics {
            views,
            ..Default::default()
        })
    }

    fn edge(
        source: ContentId,
        target: ContentId,
        relationship_type: RelationshipType,
    ) -> ContentRelationship {
        ContentRelationship::new(
            source,
            target,
            relationship_type,
            Confidence::FULL,
            CreationMethod::SystemDetected,
        )
    }

    /// Root -> a -> leaf, plus b under the root and a reference a -> b.
    fn sample() -> (ContentFamily, ContentId, ContentId, ContentId, ContentId) {
        let root = ContentId::new();
        let a = ContentId::new();
        let b = ContentId::new();
        let leaf = ContentId::new();
        let family = FamilyBuilder::new(root)
            .with_items([
                item(root, PlatformType::Podcast, "episode", 10_000),
                item(a, PlatformType::Youtube, "clip", 85_000),
                item(b, PlatformType::Blog, "post", 0),
                item(leaf, PlatformType::Tiktok, "short", 999),
            ])
            .with_relationships([
                edge(root, a, RelationshipType::Parent),
                edge(root, b, RelationshipType::Parent),
                edge(a, leaf, RelationshipType::Parent),
                edge(a, b, RelationshipType::Reference),
            ])
            .build()
            .unwrap()
            .family;
        (family, root, a, b, leaf)
    }

    #[test]
    fn test_metric_sizing_is_log_compressed() {
        assert_eq!(metric_size(0), 20.0);
        // 999 views: 20 + 10 * log10(1000) = 50.
        assert!((metric_size(999) - 50.0).abs() < 1e-9);
        // A hundred-million-view outlier hits the cap instead of dwarfing
        // everything else.
        assert_eq!(metric_size(100_000_000), 100.0);
        assert_eq!(metric_size(u64::MAX), 100.0);
    }

    #[test]
    fn test_depth_sizing_shrinks_linearly() {
        assert_eq!(depth_size(0, 2), 100.0);
        assert_eq!(depth_size(1, 2), 60.0);
        assert_eq!(depth_size(2, 2), 20.0);
        // Root-only family stays at maximum.
        assert_eq!(depth_size(0, 0), 100.0);
    }

    #[test]
    fn test_fixed_sizing_is_uniform() {
        let (family, ..) = sample();
        let options = GraphDataOptions {
            node_sizing: NodeSizing::Fixed,
            ..Default::default()
        };
        let data = GraphData::from_family(&family, &options);
        assert!(data.nodes.iter().all(|node| node.size == FIXED_NODE_SIZE));
    }

    #[test]
    fn test_platform_fill_and_contrast() {
        let (family, _, a, _, _) = sample();
        let data = GraphData::from_family(&family, &GraphDataOptions::default());

        let clip = data.node(a).unwrap();
        assert_eq!(clip.fill_color, PlatformType::Youtube.brand_color());
        // Saturated brand red needs light labels.
        assert_eq!(clip.text_color, Color::WHITE);
    }

    #[test]
    fn test_root_gets_border_emphasis() {
        let (family, root, a, _, _) = sample();
        let options = GraphDataOptions::default();
        let data = GraphData::from_family(&family, &options);

        let root_node = data.node(root).unwrap();
        assert!(root_node.is_root);
        assert_eq!(root_node.border_color, options.theme.root_border);
        assert_eq!(root_node.border_width, options.theme.root_border_width);
        assert_eq!(data.node(a).unwrap().border_color, options.theme.node_border);
    }

    #[test]
    fn test_edge_stroke_lookup() {
        assert_eq!(edge_stroke(RelationshipType::Parent), (3.0, None));
        assert_eq!(edge_stroke(RelationshipType::Child), (3.0, None));
        assert_eq!(
            edge_stroke(RelationshipType::Derivative),
            (2.0, Some(vec![6.0, 3.0]))
        );
        assert_eq!(
            edge_stroke(RelationshipType::Reference),
            (1.0, Some(vec![1.0, 3.0]))
        );
    }

    #[test]
    fn test_parental_edges_draw_parent_first() {
        let root = ContentId::new();
        let child = ContentId::new();
        let family = FamilyBuilder::new(root)
            .with_items([
                item(root, PlatformType::Youtube, "root", 1),
                item(child, PlatformType::Tiktok, "short", 1),
            ])
            // Recorded child-side: "child is a child of root".
            .with_relationships([edge(child, root, RelationshipType::Child)])
            .build()
            .unwrap()
            .family;

        let data = GraphData::from_family(&family, &GraphDataOptions::default());
        assert_eq!(data.edges.len(), 1);
        assert_eq!(data.edges[0].source, root);
        assert_eq!(data.edges[0].target, child);
    }

    #[test]
    fn test_collapse_hides_subtree_without_touching_family() {
        let (family, root, a, b, leaf) = sample();
        let options = GraphDataOptions {
            collapsed: HashSet::from([a]),
            ..Default::default()
        };
        let data = GraphData::from_family(&family, &options);

        // a stays visible and flagged; its subtree is gone.
        let shown: Vec<ContentId> = data.nodes.iter().map(|node| node.id).collect();
        assert!(shown.contains(&root));
        assert!(shown.contains(&a));
        assert!(shown.contains(&b));
        assert!(!shown.contains(&leaf));
        assert!(data.node(a).unwrap().collapsed);

        // Edges touching the hidden leaf are dropped; the reference edge
        // between two visible nodes survives.
        assert!(data
            .edges
            .iter()
            .all(|edge| edge.source != leaf && edge.target != leaf));
        assert!(data
            .edges
            .iter()
            .any(|edge| edge.relationship_type == RelationshipType::Reference));

        // The source of truth is untouched.
        assert_eq!(family.len(), 4);
        assert!(family.node(leaf).is_some());
    }

    #[test]
    fn test_collapsing_the_root_leaves_only_the_root() {
        let (family, root, ..) = sample();
        let options = GraphDataOptions {
            collapsed: HashSet::from([root]),
            ..Default::default()
        };
        let data = GraphData::from_family(&family, &options);
        assert_eq!(data.nodes.len(), 1);
        assert_eq!(data.nodes[0].id, root);
        assert!(data.edges.is_empty());
        assert_eq!(family.len(), 4);
    }

    #[test]
    fn test_unknown_collapsed_ids_are_ignored() {
        let (family, ..) = sample();
        let options = GraphDataOptions {
            collapsed: HashSet::from([ContentId::new()]),
            ..Default::default()
        };
        let data = GraphData::from_family(&family, &options);
        assert_eq!(data.nodes.len(), 4);
    }

    #[test]
    fn test_dot_export() {
        let (family, root, a, ..) = sample();
        let data = GraphData::from_family(&family, &GraphDataOptions::default());
        let dot = data.to_dot();

        assert!(dot.starts_with("digraph ContentFamily {"));
        assert!(dot.contains(&format!("\"{root}\" -> \"{a}\"")));
        assert!(dot.contains("style=dashed"));
        assert!(dot.trim_end().ends_with('}'));
    }
}
