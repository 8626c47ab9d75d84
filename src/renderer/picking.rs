//! Spatial hit-testing for the interactive view
//!
//! Wraps an R-tree over the rendered nodes so cursor hits resolve in
//! logarithmic time regardless of family size. Coordinates here are world
//! coordinates; the view unprojects screen space through its pan and zoom
//! before asking.

use crate::identifiers::ContentId;
use crate::projections::GraphData;
use crate::value_objects::Position2D;
use rstar::{PointDistance, RTree, RTreeObject, AABB};
use std::collections::HashMap;

/// Spatial index entry for one rendered node
#[derive(Debug, Clone)]
pub struct PickTarget {
    pub id: ContentId,
    pub center: [f64; 2],
    /// Hit radius, half the rendered diameter
    pub radius: f64,
}

impl RTreeObject for PickTarget {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.center[0] - self.radius, self.center[1] - self.radius],
            [self.center[0] + self.radius, self.center[1] + self.radius],
        )
    }
}

impl PointDistance for PickTarget {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.center[0] - point[0];
        let dy = self.center[1] - point[1];
        dx * dx + dy * dy
    }
}

/// Hit-test index over the currently visible nodes
pub struct PickIndex {
    tree: RTree<PickTarget>,
}

impl PickIndex {
    /// Build the index from projected nodes and their current positions
    ///
    /// Nodes without a position are left out; they cannot be hit.
    pub fn build(data: &GraphData, positions: &HashMap<ContentId, Position2D>) -> Self {
        let targets: Vec<PickTarget> = data
            .nodes
            .iter()
            .filter_map(|node| {
                positions.get(&node.id).map(|position| PickTarget {
                    id: node.id,
                    center: [position.x, position.y],
                    radius: node.size / 2.0,
                })
            })
            .collect();
        Self {
            tree: RTree::bulk_load(targets),
        }
    }

    /// The node whose circle contains the point, if any
    ///
    /// When circles overlap, the nearest center wins.
    pub fn hit(&self, point: Position2D) -> Option<ContentId> {
        let query = [point.x, point.y];
        self.tree
            .nearest_neighbor(&query)
            .filter(|target| target.distance_2(&query) <= target.radius * target.radius)
            .map(|target| target.id)
    }

    /// All nodes whose hit box intersects the given world-space region
    pub fn in_region(&self, min: Position2D, max: Position2D) -> Vec<ContentId> {
        let envelope = AABB::from_corners([min.x, min.y], [max.x, max.y]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|target| target.id)
            .collect()
    }

    /// Number of indexed nodes
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// True when nothing is indexed
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::FamilyBuilder;
    use crate::identifiers::CreatorId;
    use crate::projections::GraphDataOptions;
    use crate::value_objects::{
        Confidence, ContentItem, ContentRelationship, ContentType, CreationMethod, PlatformType,
        RelationshipType,
    };
    use chrono::Utc;

    fn indexed_pair() -> (PickIndex, ContentId, ContentId) {
        let creator = CreatorId::new();
        let make = |title: &str| {
            ContentItem::new(
                ContentId::new(),
                creator,
                PlatformType::Youtube,
                ContentType::Video,
                title,
                Utc::now(),
            )
        };
        let root = make("Root");
        let child = make("Child");
        let (root_id, child_id) = (root.id, child.id);
        let built = FamilyBuilder::new(root_id)
            .with_items([root, child])
            .with_relationships([ContentRelationship::new(
                root_id,
                child_id,
                RelationshipType::Parent,
                Confidence::FULL,
                CreationMethod::UserDefined,
            )])
            .build()
            .unwrap();
        let data = GraphData::from_family(&built.family, &GraphDataOptions::default());

        let mut positions = HashMap::new();
        positions.insert(root_id, Position2D::new(0.0, 0.0));
        positions.insert(child_id, Position2D::new(200.0, 0.0));
        (PickIndex::build(&data, &positions), root_id, child_id)
    }

    #[test]
    fn test_hits_inside_the_node_circle() {
        let (index, root_id, child_id) = indexed_pair();

        // Metrics are absent, so both nodes render at the minimum size of
        // 20px and a 10px hit radius.
        assert_eq!(index.hit(Position2D::new(3.0, 3.0)), Some(root_id));
        assert_eq!(index.hit(Position2D::new(205.0, -4.0)), Some(child_id));
    }

    #[test]
    fn test_misses_outside_every_circle() {
        let (index, _, _) = indexed_pair();
        assert_eq!(index.hit(Position2D::new(100.0, 100.0)), None);
        // Just past the rim.
        assert_eq!(index.hit(Position2D::new(0.0, 10.5)), None);
    }

    #[test]
    fn test_region_queries_find_intersecting_nodes() {
        let (index, root_id, child_id) = indexed_pair();

        let around_root =
            index.in_region(Position2D::new(-50.0, -50.0), Position2D::new(50.0, 50.0));
        assert_eq!(around_root, vec![root_id]);

        let mut everything =
            index.in_region(Position2D::new(-50.0, -50.0), Position2D::new(250.0, 50.0));
        everything.sort();
        let mut expected = vec![root_id, child_id];
        expected.sort();
        assert_eq!(everything, expected);
        assert_eq!(index.len(), 2);
        assert!(!index.is_empty());
    }
}
