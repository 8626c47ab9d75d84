//! Hierarchical path labels for family members
//!
//! Every node in a built family carries a path that encodes its chain of
//! ancestors: the root's path is its own id, and a child's path is its
//! parent's path with the child's id appended. Paths make subtree queries
//! (collapse, descendant filtering) a string prefix check instead of a
//! graph traversal.

use crate::identifiers::ContentId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dot-joined chain of content ids from the family root down to one node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HierarchicalPath(String);

impl HierarchicalPath {
    /// Path of a family root: just the root's own id
    pub fn root(id: ContentId) -> Self {
        Self(id.to_string())
    }

    /// Path of a direct child of `self`
    pub fn child(&self, id: ContentId) -> Self {
        Self(format!("{}.{}", self.0, id))
    }

    /// Number of ancestors above this node; the root has depth 0
    pub fn depth(&self) -> usize {
        self.0.matches('.').count()
    }

    /// True when `self` labels a strict ancestor of the node at `other`
    ///
    /// The check respects segment boundaries, so a path is never treated as
    /// an ancestor just because its text happens to prefix another id.
    pub fn is_ancestor_of(&self, other: &HierarchicalPath) -> bool {
        other.0.len() > self.0.len()
            && other.0.starts_with(&self.0)
            && other.0.as_bytes()[self.0.len()] == b'.'
    }

    /// True when `self` labels a strict descendant of the node at `other`
    pub fn is_descendant_of(&self, other: &HierarchicalPath) -> bool {
        other.is_ancestor_of(self)
    }

    /// Content ids along the path, root first
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// The path as its wire representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HierarchicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
