//! In-memory relationship backend
//!
//! A complete [`ContentRelationshipService`] over process-local state, used
//! by tests and demos. It is also the reference implementation of the
//! concurrency contract: every mutation takes the store's write lock, so
//! mutations apply in a single global order and the loser of any race fails
//! with the structural reason rather than corrupting the family.

use crate::aggregate::StructuralError;
use crate::commands::{CommandError, CommandResult, NewRelationship};
use crate::identifiers::{ContentId, RelationshipId, SuggestionId};
use crate::infrastructure::{ContentRelationshipService, FamilySnapshot, FetchError};
use crate::value_objects::{
    ContentItem, ContentMetrics, ContentRelationship, ContentSuggestion, RelationshipType,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Debug, Default)]
struct StoreInner {
    items: HashMap<ContentId, ContentItem>,
    relationships: Vec<ContentRelationship>,
    suggestions: Vec<ContentSuggestion>,
    /// Change counters keyed by family root
    versions: HashMap<ContentId, u64>,
}

impl StoreInner {
    /// The parental edge naming `child` as the child, if any
    fn parent_edge_of(&self, child: ContentId) -> Option<&ContentRelationship> {
        self.relationships.iter().find(|edge| {
            edge.parental_endpoints()
                .map_or(false, |(_, c)| c == child)
        })
    }

    /// Walk parent edges to the top of the tree containing `id`
    fn root_of(&self, id: ContentId) -> ContentId {
        let mut current = id;
        // Bounded walk; the store never admits a parental cycle.
        for _ in 0..=self.items.len() {
            match self
                .parent_edge_of(current)
                .and_then(|edge| edge.parental_endpoints())
            {
                Some((parent, _)) => current = parent,
                None => break,
            }
        }
        current
    }

    /// True when `ancestor` sits somewhere on `node`'s parent chain
    fn is_ancestor(&self, ancestor: ContentId, node: ContentId) -> bool {
        let mut current = node;
        for _ in 0..=self.items.len() {
            match self
                .parent_edge_of(current)
                .and_then(|edge| edge.parental_endpoints())
            {
                Some((parent, _)) => {
                    if parent == ancestor {
                        return true;
                    }
                    current = parent;
                }
                None => break,
            }
        }
        false
    }

    /// Items served with a family snapshot: everything reachable from the
    /// root over any edge, plus the rest of the root creator's catalog so
    /// unconnected content is reported as orphaned instead of hidden.
    fn snapshot_pool(&self, root: ContentId) -> HashSet<ContentId> {
        let mut pool = HashSet::new();
        let mut queue = VecDeque::new();
        pool.insert(root);
        queue.push_back(root);
        while let Some(current) = queue.pop_front() {
            for edge in &self.relationships {
                let next = if edge.source == current {
                    edge.target
                } else if edge.target == current {
                    edge.source
                } else {
                    continue;
                };
                if self.items.contains_key(&next) && pool.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        if let Some(root_item) = self.items.get(&root) {
            for item in self.items.values() {
                if item.creator_id == root_item.creator_id {
                    pool.insert(item.id);
                }
            }
        }
        pool
    }

    /// Structural gate every new edge passes before it is recorded
    fn validate_new_edge(&self, edge: &ContentRelationship) -> Result<(), StructuralError> {
        if edge.source == edge.target {
            return Err(StructuralError::SelfRelationship(edge.source));
        }
        for endpoint in [edge.source, edge.target] {
            if !self.items.contains_key(&endpoint) {
                return Err(StructuralError::MissingContent(endpoint));
            }
        }
        let duplicate = self.relationships.iter().any(|existing| {
            existing.source == edge.source
                && existing.target == edge.target
                && existing.relationship_type == edge.relationship_type
        });
        if duplicate {
            return Err(StructuralError::DuplicateRelationship {
                source: edge.source,
                target: edge.target,
            });
        }
        if let Some((parent, child)) = edge.parental_endpoints() {
            if let Some((existing_parent, _)) = self
                .parent_edge_of(child)
                .and_then(|existing| existing.parental_endpoints())
            {
                return Err(StructuralError::MultipleParents {
                    child,
                    existing_parent,
                    rejected_parent: parent,
                });
            }
            // Parenting under one of the child's own descendants closes a loop.
            if self.is_ancestor(child, parent) {
                return Err(StructuralError::CycleDetected { parent, child });
            }
        }
        Ok(())
    }

    /// The family whose version a mutation on this edge shape is judged
    /// against: the parent side for parental edges, the source side
    /// otherwise.
    fn anchor_root(&self, source: ContentId, target: ContentId, kind: RelationshipType) -> ContentId {
        match kind {
            RelationshipType::Child => self.root_of(target),
            _ => self.root_of(source),
        }
    }

    fn check_version(&self, root: ContentId, expected: Option<u64>) -> CommandResult<()> {
        if let Some(expected) = expected {
            let found = self.versions.get(&root).copied().unwrap_or(0);
            if found != expected {
                return Err(CommandError::StructuralConflict {
                    detail: format!("family {root} moved from version {expected} to {found}"),
                });
            }
        }
        Ok(())
    }

    fn bump(&mut self, root: ContentId) {
        *self.versions.entry(root).or_insert(0) += 1;
    }
}

/// Process-local [`ContentRelationshipService`] behind a single lock
pub struct InMemoryRelationshipService {
    inner: RwLock<StoreInner>,
}

impl InMemoryRelationshipService {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
        }
    }

    /// Add a content item to the catalog, replacing any previous revision
    pub fn insert_item(&self, item: ContentItem) {
        self.inner.write().items.insert(item.id, item);
    }

    /// Seed a relationship, subject to the same validation as
    /// [`ContentRelationshipService::create_relationship`]
    pub fn insert_relationship(
        &self,
        relationship: ContentRelationship,
    ) -> Result<(), StructuralError> {
        let mut inner = self.inner.write();
        inner.validate_new_edge(&relationship)?;
        inner.relationships.push(relationship.clone());
        // Recompute after the push so a parental edge bumps the merged tree.
        let root = inner.root_of(relationship.source);
        inner.bump(root);
        Ok(())
    }

    /// Seed a pending suggestion
    pub fn insert_suggestion(&self, suggestion: ContentSuggestion) {
        self.inner.write().suggestions.push(suggestion);
    }

    /// Number of catalogued content items
    pub fn item_count(&self) -> usize {
        self.inner.read().items.len()
    }

    /// Number of recorded relationships
    pub fn relationship_count(&self) -> usize {
        self.inner.read().relationships.len()
    }

    /// Number of pending suggestions
    pub fn suggestion_count(&self) -> usize {
        self.inner.read().suggestions.len()
    }
}

impl Default for InMemoryRelationshipService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentRelationshipService for InMemoryRelationshipService {
    async fn fetch_family(&self, content_id: ContentId) -> Result<FamilySnapshot, FetchError> {
        let inner = self.inner.read();
        if !inner.items.contains_key(&content_id) {
            return Err(FetchError::NotFound {
                resource: format!("content {content_id}"),
            });
        }
        let root_id = inner.root_of(content_id);
        let pool = inner.snapshot_pool(root_id);
        let items = inner
            .items
            .values()
            .filter(|item| pool.contains(&item.id))
            .cloned()
            .collect();
        let relationships = inner
            .relationships
            .iter()
            .filter(|edge| pool.contains(&edge.source) || pool.contains(&edge.target))
            .cloned()
            .collect();
        let version = inner.versions.get(&root_id).copied().unwrap_or(0);
        Ok(FamilySnapshot {
            root_id,
            items,
            relationships,
            version,
        })
    }

    async fn fetch_suggestions(
        &self,
        content_id: ContentId,
    ) -> Result<Vec<ContentSuggestion>, FetchError> {
        let inner = self.inner.read();
        Ok(inner
            .suggestions
            .iter()
            .filter(|suggestion| {
                suggestion.source == content_id || suggestion.target == content_id
            })
            .cloned()
            .collect())
    }

    async fn create_relationship(
        &self,
        new_relationship: NewRelationship,
        expected_version: Option<u64>,
    ) -> CommandResult<ContentRelationship> {
        let mut inner = self.inner.write();
        let anchor = inner.anchor_root(
            new_relationship.source,
            new_relationship.target,
            new_relationship.relationship_type,
        );
        inner.check_version(anchor, expected_version)?;
        let relationship = ContentRelationship::new(
            new_relationship.source,
            new_relationship.target,
            new_relationship.relationship_type,
            new_relationship.confidence,
            new_relationship.created_by,
        );
        inner.validate_new_edge(&relationship)?;
        tracing::debug!(
            "Recording {} relationship {} -> {}",
            relationship.relationship_type,
            relationship.source,
            relationship.target
        );
        inner.relationships.push(relationship.clone());
        let root = inner.root_of(relationship.source);
        inner.bump(root);
        Ok(relationship)
    }

    async fn delete_relationship(
        &self,
        relationship_id: RelationshipId,
        expected_version: Option<u64>,
    ) -> CommandResult<()> {
        let mut inner = self.inner.write();
        let position = inner
            .relationships
            .iter()
            .position(|edge| edge.id == relationship_id)
            .ok_or(CommandError::RelationshipNotFound(relationship_id))?;
        // Resolve the family before the edge disappears from it.
        let root = inner.root_of(inner.relationships[position].source);
        inner.check_version(root, expected_version)?;
        let removed = inner.relationships.remove(position);
        tracing::debug!("Deleted relationship {}", removed.id);
        inner.bump(root);
        Ok(())
    }

    async fn approve_suggestion(
        &self,
        suggestion_id: SuggestionId,
        expected_version: Option<u64>,
    ) -> CommandResult<ContentRelationship> {
        let mut inner = self.inner.write();
        let position = inner
            .suggestions
            .iter()
            .position(|suggestion| suggestion.id == suggestion_id)
            .ok_or(CommandError::SuggestionNotFound(suggestion_id))?;
        let suggestion = inner.suggestions[position].clone();
        let anchor =
            inner.anchor_root(suggestion.source, suggestion.target, suggestion.suggested_type);
        inner.check_version(anchor, expected_version)?;
        let relationship = suggestion.into_relationship();
        // A structural rejection leaves the suggestion pending; the caller
        // can still reject it explicitly.
        inner.validate_new_edge(&relationship)?;
        inner.suggestions.remove(position);
        inner.relationships.push(relationship.clone());
        let root = inner.root_of(relationship.source);
        inner.bump(root);
        tracing::debug!(
            "Approved suggestion {} into relationship {}",
            suggestion_id,
            relationship.id
        );
        Ok(relationship)
    }

    async fn reject_suggestion(&self, suggestion_id: SuggestionId) -> CommandResult<()> {
        let mut inner = self.inner.write();
        let position = inner
            .suggestions
            .iter()
            .position(|suggestion| suggestion.id == suggestion_id)
            .ok_or(CommandError::SuggestionNotFound(suggestion_id))?;
        inner.suggestions.remove(position);
        // No structural change, so the family version stays put. Nothing
        // stops the classifier from proposing the same pairing again later.
        tracing::debug!("Rejected suggestion {}", suggestion_id);
        Ok(())
    }

    async fn refresh_metrics(
        &self,
        content_id: ContentId,
        metrics: ContentMetrics,
    ) -> CommandResult<()> {
        let mut inner = self.inner.write();
        match inner.items.get_mut(&content_id) {
            Some(item) => item.metrics = Some(metrics),
            None => return Err(StructuralError::MissingContent(content_id).into()),
        }
        let root = inner.root_of(content_id);
        inner.bump(root);
        Ok(())
    }
}
