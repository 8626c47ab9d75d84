//! Snapshot-to-family assembly
//!
//! The builder turns a flat snapshot of items and relationship edges into a
//! validated [`ContentFamily`]: it resolves each child's single parent,
//! rejects structural corruption (a parented root, double parents, cycles),
//! assigns hierarchical paths breadth-first from the root, and reports
//! whatever could not be placed instead of silently dropping it.

use crate::aggregate::{ContentFamily, ContentNode, StructuralError};
use crate::events::FamilyRebuilt;
use crate::identifiers::ContentId;
use crate::value_objects::{ContentItem, ContentRelationship, HierarchicalPath};
use indexmap::IndexMap;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet, VecDeque};

/// A successfully assembled family plus everything excluded from it
#[derive(Debug, Clone)]
pub struct BuiltFamily {
    pub family: ContentFamily,
    /// Items with no parental path to the root, excluded but reported
    pub orphans: Vec<ContentItem>,
    /// Edges excluded because an endpoint is missing from the snapshot or
    /// did not make it into the family
    pub dangling_edges: Vec<ContentRelationship>,
}

impl BuiltFamily {
    /// The event announcing this rebuild to downstream projections
    pub fn rebuild_event(&self) -> FamilyRebuilt {
        FamilyRebuilt {
            root_id: self.family.root_id(),
            node_count: self.family.len(),
            edge_count: self.family.relationships().len(),
            orphan_count: self.orphans.len(),
            version: self.family.version(),
            occurred_at: self.family.built_at(),
        }
    }
}

/// Assembles a [`ContentFamily`] from a content snapshot
pub struct FamilyBuilder {
    root_id: ContentId,
    items: Vec<ContentItem>,
    relationships: Vec<ContentRelationship>,
}

impl FamilyBuilder {
    /// Start building the family rooted at the given content item
    pub fn new(root_id: ContentId) -> Self {
        Self {
            root_id,
            items: Vec::new(),
            relationships: Vec::new(),
        }
    }

    /// Add content items to the snapshot
    pub fn with_items(mut self, items: impl IntoIterator<Item = ContentItem>) -> Self {
        self.items.extend(items);
        self
    }

    /// Add relationship edges to the snapshot
    pub fn with_relationships(
        mut self,
        relationships: impl IntoIterator<Item = ContentRelationship>,
    ) -> Self {
        self.relationships.extend(relationships);
        self
    }

    /// Validate the snapshot and assemble the family
    pub fn build(self) -> Result<BuiltFamily, StructuralError> {
        // Index items by id, keeping the first occurrence of any duplicate.
        let mut items: IndexMap<ContentId, ContentItem> =
            IndexMap::with_capacity(self.items.len());
        for item in self.items {
            if items.contains_key(&item.id) {
                tracing::debug!(content_id = %item.id, "duplicate content item in snapshot");
                continue;
            }
            items.insert(item.id, item);
        }
        if !items.contains_key(&self.root_id) {
            return Err(StructuralError::MissingContent(self.root_id));
        }

        // Edges whose endpoints are not both in the snapshot cannot be
        // validated or placed; set them aside.
        let mut dangling_edges = Vec::new();
        let mut edges = Vec::new();
        for edge in self.relationships {
            if edge.source == edge.target {
                return Err(StructuralError::SelfRelationship(edge.source));
            }
            if items.contains_key(&edge.source) && items.contains_key(&edge.target) {
                edges.push(edge);
            } else {
                dangling_edges.push(edge);
            }
        }

        // The root is defined by having no parent; check before anything else.
        for edge in &edges {
            if let Some((parent, child)) = edge.parental_endpoints() {
                if child == self.root_id {
                    return Err(StructuralError::RootHasParent {
                        root: self.root_id,
                        parent,
                    });
                }
            }
        }

        // Resolve each child's single parent. An exact repeat of an edge
        // already applied is dropped; a conflicting parent is an error.
        let mut parent_of: HashMap<ContentId, ContentId> = HashMap::new();
        let mut children_of: IndexMap<ContentId, Vec<ContentId>> = IndexMap::new();
        let mut redundant: HashSet<crate::identifiers::RelationshipId> = HashSet::new();
        for edge in &edges {
            let (parent, child) = match edge.parental_endpoints() {
                Some(endpoints) => endpoints,
                None => continue,
            };
            match parent_of.get(&child) {
                Some(&existing_parent) if existing_parent == parent => {
                    tracing::debug!(%child, %parent, "redundant parental edge in snapshot");
                    redundant.insert(edge.id);
                }
                Some(&existing_parent) => {
                    return Err(StructuralError::MultipleParents {
                        child,
                        existing_parent,
                        rejected_parent: parent,
                    });
                }
                None => {
                    parent_of.insert(child, parent);
                    children_of.entry(parent).or_default().push(child);
                }
            }
        }

        // A cycle among parental edges can never reach the root, so without
        // this guard its members would surface as orphans and mask the real
        // problem. Any strongly connected component larger than one node is
        // such a cycle.
        let mut graph: DiGraph<ContentId, ()> =
            DiGraph::with_capacity(items.len(), parent_of.len());
        let mut indices: HashMap<ContentId, NodeIndex> = HashMap::with_capacity(items.len());
        for &id in items.keys() {
            indices.insert(id, graph.add_node(id));
        }
        for (&child, &parent) in &parent_of {
            if let (Some(&from), Some(&to)) = (indices.get(&parent), indices.get(&child)) {
                graph.add_edge(from, to, ());
            }
        }
        for component in tarjan_scc(&graph) {
            if component.len() > 1 {
                return Err(StructuralError::CycleDetected {
                    parent: graph[component[0]],
                    child: graph[component[1]],
                });
            }
        }

        // Assign hierarchical paths breadth-first from the root.
        let mut nodes: IndexMap<ContentId, ContentNode> = IndexMap::with_capacity(items.len());
        let mut queue: VecDeque<(ContentId, HierarchicalPath, usize, Option<ContentId>)> =
            VecDeque::new();
        queue.push_back((self.root_id, HierarchicalPath::root(self.root_id), 0, None));
        while let Some((id, path, depth, parent)) = queue.pop_front() {
            if let Some(children) = children_of.get(&id) {
                for &child in children {
                    queue.push_back((child, path.child(child), depth + 1, Some(id)));
                }
            }
            if let Some(item) = items.get(&id) {
                nodes.insert(
                    id,
                    ContentNode {
                        item: item.clone(),
                        path,
                        depth,
                        parent,
                    },
                );
            }
        }

        // Whatever the traversal never reached has no parental path to the
        // root: report it rather than silently dropping it.
        let orphans: Vec<ContentItem> = items
            .into_iter()
            .filter(|(id, _)| !nodes.contains_key(id))
            .map(|(_, item)| item)
            .collect();

        let mut family_edges = Vec::with_capacity(edges.len());
        for edge in edges {
            if redundant.contains(&edge.id) {
                continue;
            }
            if nodes.contains_key(&edge.source) && nodes.contains_key(&edge.target) {
                family_edges.push(edge);
            } else {
                dangling_edges.push(edge);
            }
        }

        Ok(BuiltFamily {
            family: ContentFamily::from_parts(self.root_id, nodes, family_edges),
            orphans,
            dangling_edges,
        })
    }
}
