//! The content family aggregate
//!
//! A family is the connected, acyclic subgraph of content descending from a
//! single root item, together with every relationship edge among its
//! members. All structural invariants are enforced by this type's methods;
//! code outside the aggregate can read freely but never mutate directly.

use crate::aggregate::StructuralError;
use crate::identifiers::{ContentId, RelationshipId};
use crate::value_objects::{ContentItem, ContentMetrics, ContentRelationship, HierarchicalPath};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One member of a built family, carrying its place in the hierarchy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentNode {
    pub item: ContentItem,
    /// Materialized ancestor chain, root first
    pub path: HierarchicalPath,
    /// Number of ancestors above this node; the root has depth 0
    pub depth: usize,
    /// The node's single parent; `None` only for the root
    pub parent: Option<ContentId>,
}

impl ContentNode {
    /// The id of the underlying content item
    pub fn id(&self) -> ContentId {
        self.item.id
    }

    /// True for the family root
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// The connected hierarchy of content items descending from one root
///
/// Node order is stable: the root first, then the breadth-first order the
/// builder produced, then any later attachments in arrival order. The
/// `version` counter increments on every mutation so downstream projections
/// know when to regenerate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentFamily {
    root_id: ContentId,
    nodes: IndexMap<ContentId, ContentNode>,
    edges: Vec<ContentRelationship>,
    built_at: DateTime<Utc>,
    version: u64,
}

impl ContentFamily {
    pub(crate) fn from_parts(
        root_id: ContentId,
        nodes: IndexMap<ContentId, ContentNode>,
        edges: Vec<ContentRelationship>,
    ) -> Self {
        Self {
            root_id,
            nodes,
            edges,
            built_at: Utc::now(),
            version: 1,
        }
    }

    /// The id of the family root
    pub fn root_id(&self) -> ContentId {
        self.root_id
    }

    /// The root node
    pub fn root(&self) -> &ContentNode {
        // The builder and every mutation preserve the root entry.
        &self.nodes[&self.root_id]
    }

    /// Monotonic change counter; bumps on every structural or metric change
    pub fn version(&self) -> u64 {
        self.version
    }

    /// When this family was assembled from its snapshot
    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// Number of member nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a family contains at least its root
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// True when the given content item belongs to this family
    pub fn contains(&self, id: ContentId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Look up a member node
    pub fn node(&self, id: ContentId) -> Option<&ContentNode> {
        self.nodes.get(&id)
    }

    /// All member nodes in stable order, root first
    pub fn nodes(&self) -> impl Iterator<Item = &ContentNode> {
        self.nodes.values()
    }

    /// Every relationship among family members
    pub fn relationships(&self) -> &[ContentRelationship] {
        &self.edges
    }

    /// Look up a relationship by id
    pub fn relationship(&self, id: RelationshipId) -> Option<&ContentRelationship> {
        self.edges.iter().find(|edge| edge.id == id)
    }

    /// Direct children of the given node, in node order
    pub fn children_of(&self, id: ContentId) -> impl Iterator<Item = &ContentNode> {
        self.nodes
            .values()
            .filter(move |node| node.parent == Some(id))
    }

    /// True when the node has at least one child
    pub fn has_descendants(&self, id: ContentId) -> bool {
        self.children_of(id).next().is_some()
    }

    /// Every strict descendant of the given node, in node order
    ///
    /// An O(n) path-prefix scan, no traversal required.
    pub fn descendants_of(&self, id: ContentId) -> Vec<&ContentNode> {
        match self.nodes.get(&id) {
            Some(ancestor) => self
                .nodes
                .values()
                .filter(|node| node.path.is_descendant_of(&ancestor.path))
                .collect(),
            None => Vec::new(),
        }
    }

    /// The ancestor chain of the given node, nearest parent first
    pub fn ancestors_of(&self, id: ContentId) -> Vec<ContentId> {
        let mut ancestors = Vec::new();
        let mut current = self.nodes.get(&id).and_then(|node| node.parent);
        while let Some(ancestor) = current {
            ancestors.push(ancestor);
            current = self.nodes.get(&ancestor).and_then(|node| node.parent);
        }
        ancestors
    }

    /// Deepest node level in the family; 0 for a root-only family
    pub fn max_depth(&self) -> usize {
        self.nodes.values().map(|node| node.depth).max().unwrap_or(0)
    }

    /// Add a relationship between two existing members
    ///
    /// Associative edges are checked for duplicates only. Parental edges
    /// run the full hierarchy validation; since every non-root member
    /// already has exactly one parent, a parental edge between members is
    /// rejected with the specific rule it breaks.
    pub fn add_relationship(
        &mut self,
        relationship: ContentRelationship,
    ) -> Result<(), StructuralError> {
        if relationship.source == relationship.target {
            return Err(StructuralError::SelfRelationship(relationship.source));
        }

        match relationship.parental_endpoints() {
            Some((parent, child)) => {
                let parent_node = self
                    .nodes
                    .get(&parent)
                    .ok_or(StructuralError::OrphanContent(parent))?;
                let child_node = self
                    .nodes
                    .get(&child)
                    .ok_or(StructuralError::OrphanContent(child))?;

                if child_node.path.is_ancestor_of(&parent_node.path) {
                    return Err(StructuralError::CycleDetected { parent, child });
                }
                match child_node.parent {
                    Some(existing_parent) => Err(StructuralError::MultipleParents {
                        child,
                        existing_parent,
                        rejected_parent: parent,
                    }),
                    // A member without a parent is the root.
                    None => Err(StructuralError::RootHasParent {
                        root: child,
                        parent,
                    }),
                }
            }
            None => {
                for endpoint in [relationship.source, relationship.target] {
                    if !self.nodes.contains_key(&endpoint) {
                        return Err(StructuralError::OrphanContent(endpoint));
                    }
                }
                let duplicate = self.edges.iter().any(|edge| {
                    edge.source == relationship.source
                        && edge.target == relationship.target
                        && edge.relationship_type == relationship.relationship_type
                });
                if duplicate {
                    return Err(StructuralError::DuplicateRelationship {
                        source: relationship.source,
                        target: relationship.target,
                    });
                }
                self.edges.push(relationship);
                self.version += 1;
                Ok(())
            }
        }
    }

    /// Attach a new content item under an existing member
    ///
    /// The relationship must be parental and must name `item` as the child;
    /// the new node's path extends its parent's. A brand-new child cannot be
    /// anyone's ancestor, so no cycle check is needed here.
    pub fn attach(
        &mut self,
        item: ContentItem,
        relationship: ContentRelationship,
    ) -> Result<(), StructuralError> {
        let child_id = item.id;
        if relationship.source == relationship.target {
            return Err(StructuralError::SelfRelationship(child_id));
        }
        let (parent, child) = relationship
            .parental_endpoints()
            .filter(|(_, child)| *child == child_id)
            .ok_or(StructuralError::InvalidAttachment { child: child_id })?;

        if let Some(existing) = self.nodes.get(&child) {
            return Err(match existing.parent {
                Some(existing_parent) => StructuralError::MultipleParents {
                    child,
                    existing_parent,
                    rejected_parent: parent,
                },
                None => StructuralError::RootHasParent {
                    root: child,
                    parent,
                },
            });
        }
        let parent_node = self
            .nodes
            .get(&parent)
            .ok_or(StructuralError::OrphanContent(parent))?;

        let node = ContentNode {
            path: parent_node.path.child(child),
            depth: parent_node.depth + 1,
            parent: Some(parent),
            item,
        };
        self.nodes.insert(child, node);
        self.edges.push(relationship);
        self.version += 1;
        Ok(())
    }

    /// Remove an associative relationship, returning it
    ///
    /// Parental edges define the hierarchy itself; removing one restructures
    /// the family, which is done by rebuilding from the remaining snapshot
    /// through the builder. This method therefore refuses parental edges.
    pub fn remove_associative(&mut self, id: RelationshipId) -> Option<ContentRelationship> {
        let index = self
            .edges
            .iter()
            .position(|edge| edge.id == id && !edge.relationship_type.is_parental())?;
        self.version += 1;
        Some(self.edges.remove(index))
    }

    /// Replace a member's metrics snapshot after a platform refresh
    pub fn refresh_metrics(
        &mut self,
        id: ContentId,
        metrics: ContentMetrics,
    ) -> Result<(), StructuralError> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(StructuralError::OrphanContent(id))?;
        node.item.metrics = Some(metrics);
        self.version += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::FamilyBuilder;
    use crate::identifiers::CreatorId;
    use crate::value_objects::{Confidence, ContentType, CreationMethod, PlatformType, RelationshipType};

    fn item(id: ContentId, title: &str) -> ContentItem {
        ContentItem::new(
            id,
            CreatorId::new(),
            PlatformType::Youtube,
            ContentType::Video,
            title,
            Utc::now(),
        )
    }

    fn parent_edge(parent: ContentId, child: ContentId) -> ContentRelationship {
        ContentRelationship::new(
            parent,
            child,
            RelationshipType::Parent,
            Confidence::FULL,
            CreationMethod::UserDefined,
        )
    }

    /// Root with two children, one grandchild under the first child.
    fn sample_family() -> (ContentFamily, ContentId, ContentId, ContentId, ContentId) {
        let root = ContentId::new();
        let a = ContentId::new();
        let b = ContentId::new();
        let leaf = ContentId::new();

        let built = FamilyBuilder::new(root)
            .with_items([
                item(root, "root"),
                item(a, "child a"),
                item(b, "child b"),
                item(leaf, "grandchild"),
            ])
            .with_relationships([
                parent_edge(root, a),
                parent_edge(root, b),
                parent_edge(a, leaf),
            ])
            .build()
            .unwrap();
        (built.family, root, a, b, leaf)
    }

    #[test]
    fn test_navigation_accessors() {
        let (family, root, a, b, leaf) = sample_family();

        assert_eq!(family.len(), 4);
        assert_eq!(family.root().id(), root);
        assert!(family.root().is_root());
        assert_eq!(family.max_depth(), 2);

        let children: Vec<ContentId> = family.children_of(root).map(|n| n.id()).collect();
        assert_eq!(children, vec![a, b]);

        let descendants: Vec<ContentId> = family
            .descendants_of(root)
            .into_iter()
            .map(|n| n.id())
            .collect();
        assert_eq!(descendants.len(), 3);
        assert!(!descendants.contains(&root));

        assert_eq!(family.ancestors_of(leaf), vec![a, root]);
        assert!(family.has_descendants(a));
        assert!(!family.has_descendants(b));
    }

    #[test]
    fn test_associative_edge_between_members() {
        let (mut family, _, a, b, _) = sample_family();
        let version = family.version();

        let edge = ContentRelationship::new(
            a,
            b,
            RelationshipType::Reference,
            Confidence::new(0.9).unwrap(),
            CreationMethod::UserDefined,
        );
        family.add_relationship(edge.clone()).unwrap();
        assert_eq!(family.version(), version + 1);

        // An identical edge is a duplicate.
        let again = ContentRelationship::new(
            a,
            b,
            RelationshipType::Reference,
            Confidence::new(0.5).unwrap(),
            CreationMethod::AiSuggested,
        );
        assert_eq!(
            family.add_relationship(again),
            Err(StructuralError::DuplicateRelationship { source: a, target: b })
        );

        // The same pair under a different type is allowed.
        let other_type = ContentRelationship::new(
            a,
            b,
            RelationshipType::Reaction,
            Confidence::FULL,
            CreationMethod::UserDefined,
        );
        assert!(family.add_relationship(other_type).is_ok());
    }

    #[test]
    fn test_second_parent_is_rejected() {
        let (mut family, _, _, b, leaf) = sample_family();

        // leaf already hangs under a; b cannot adopt it.
        let result = family.add_relationship(parent_edge(b, leaf));
        assert!(matches!(
            result,
            Err(StructuralError::MultipleParents { child, rejected_parent, .. })
                if child == leaf && rejected_parent == b
        ));
    }

    #[test]
    fn test_ancestor_cannot_become_descendant() {
        let (mut family, _, a, _, leaf) = sample_family();

        // Proposing a as a child of its own grandchild closes a loop.
        let result = family.add_relationship(parent_edge(leaf, a));
        assert_eq!(
            result,
            Err(StructuralError::CycleDetected { parent: leaf, child: a })
        );
    }

    #[test]
    fn test_root_cannot_become_a_child() {
        let (mut family, root, a, _, _) = sample_family();

        // The root is an ancestor of every member, so this is a cycle.
        let result = family.add_relationship(parent_edge(a, root));
        assert_eq!(
            result,
            Err(StructuralError::CycleDetected { parent: a, child: root })
        );
    }

    #[test]
    fn test_edges_to_non_members_are_rejected() {
        let (mut family, _, a, _, _) = sample_family();
        let outsider = ContentId::new();

        let result = family.add_relationship(ContentRelationship::new(
            a,
            outsider,
            RelationshipType::Reference,
            Confidence::FULL,
            CreationMethod::UserDefined,
        ));
        assert_eq!(result, Err(StructuralError::OrphanContent(outsider)));
    }

    #[test]
    fn test_attach_extends_parent_path() {
        let (mut family, _, a, _, _) = sample_family();
        let new_id = ContentId::new();

        family
            .attach(item(new_id, "new clip"), parent_edge(a, new_id))
            .unwrap();

        let node = family.node(new_id).unwrap();
        assert_eq!(node.depth, 2);
        assert_eq!(node.parent, Some(a));
        let parent_path = family.node(a).unwrap().path.clone();
        assert!(parent_path.is_ancestor_of(&node.path));
    }

    #[test]
    fn test_attach_child_orientation_is_normalized() {
        let (mut family, root, ..) = sample_family();
        let new_id = ContentId::new();

        // A Child edge from the new item to the root says the same thing.
        let inverse = ContentRelationship::new(
            new_id,
            root,
            RelationshipType::Child,
            Confidence::FULL,
            CreationMethod::PlatformLinked,
        );
        family.attach(item(new_id, "linked short"), inverse).unwrap();
        assert_eq!(family.node(new_id).unwrap().parent, Some(root));
    }

    #[test]
    fn test_attach_rejects_unknown_parent_and_existing_member() {
        let (mut family, _, a, b, _) = sample_family();
        let outsider = ContentId::new();
        let new_id = ContentId::new();

        let result = family.attach(item(new_id, "stray"), parent_edge(outsider, new_id));
        assert_eq!(result, Err(StructuralError::OrphanContent(outsider)));

        // Attaching an existing member is a second parent.
        let result = family.attach(item(b, "child b again"), parent_edge(a, b));
        assert!(matches!(result, Err(StructuralError::MultipleParents { .. })));

        // A non-parental edge cannot attach anything.
        let reference = ContentRelationship::new(
            a,
            new_id,
            RelationshipType::Reference,
            Confidence::FULL,
            CreationMethod::UserDefined,
        );
        let result = family.attach(item(new_id, "stray"), reference);
        assert_eq!(
            result,
            Err(StructuralError::InvalidAttachment { child: new_id })
        );
    }

    #[test]
    fn test_remove_associative_refuses_parental_edges() {
        let (mut family, _, a, b, _) = sample_family();

        let reference = ContentRelationship::new(
            a,
            b,
            RelationshipType::Reference,
            Confidence::FULL,
            CreationMethod::UserDefined,
        );
        let reference_id = reference.id;
        family.add_relationship(reference).unwrap();
        assert!(family.remove_associative(reference_id).is_some());
        assert!(family.relationship(reference_id).is_none());

        let parental_id = family
            .relationships()
            .iter()
            .find(|edge| edge.relationship_type.is_parental())
            .map(|edge| edge.id)
            .unwrap();
        assert!(family.remove_associative(parental_id).is_none());
        assert!(family.relationship(parental_id).is_some());
    }

    #[test]
    fn test_refresh_metrics_bumps_version() {
        let (mut family, _, a, _, _) = sample_family();
        let version = family.version();

        let metrics = ContentMetrics {
            views: 42,
            ..Default::default()
        };
        family.refresh_metrics(a, metrics).unwrap();
        assert_eq!(family.version(), version + 1);
        assert_eq!(family.node(a).unwrap().item.metrics_or_default().views, 42);

        let missing = ContentId::new();
        assert_eq!(
            family.refresh_metrics(missing, metrics),
            Err(StructuralError::OrphanContent(missing))
        );
    }
}
