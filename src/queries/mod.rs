//! Family queries
//!
//! Read-only access to content families. Queries fetch a fresh snapshot
//! from the relationship service, run it through the family builder, and
//! answer from the validated aggregate, so every result reflects the
//! backend's current ordering of mutations.

use crate::aggregate::{BuiltFamily, ContentFamily, ContentNode, StructuralError};
use crate::identifiers::ContentId;
use crate::infrastructure::{ContentRelationshipService, FetchError};
use crate::projections::{AggregateMetrics, GraphData, GraphDataOptions};
use crate::value_objects::{ContentMetrics, ContentType, HierarchicalPath, PlatformType};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Query result type
pub type FamilyQueryResult<T> = Result<T, FamilyQueryError>;

/// Errors that can occur during family queries
#[derive(Debug, Error)]
pub enum FamilyQueryError {
    /// The content item is not a member of the family
    #[error("content {0} is not part of the family")]
    ContentNotFound(ContentId),

    /// The snapshot could not be fetched
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The backend served a snapshot the builder refuses
    #[error("family snapshot is structurally invalid: {0}")]
    Corrupt(#[from] StructuralError),
}

/// Family-level information for query results
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyInfo {
    pub root_id: ContentId,
    /// Title of the root content item
    pub title: String,
    pub node_count: usize,
    pub edge_count: usize,
    pub orphan_count: usize,
    pub max_depth: usize,
    /// Backend change counter at snapshot time
    pub version: u64,
    pub built_at: DateTime<Utc>,
}

/// Node-level information for query results
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDetail {
    pub id: ContentId,
    pub title: String,
    pub platform: PlatformType,
    pub content_type: ContentType,
    pub path: HierarchicalPath,
    pub depth: usize,
    pub parent: Option<ContentId>,
    pub child_count: usize,
    pub metrics: Option<ContentMetrics>,
}

impl NodeDetail {
    fn from_node(family: &ContentFamily, node: &ContentNode) -> Self {
        Self {
            id: node.id(),
            title: node.item.title.clone(),
            platform: node.item.platform,
            content_type: node.item.content_type,
            path: node.path.clone(),
            depth: node.depth,
            parent: node.parent,
            child_count: family.children_of(node.id()).count(),
            metrics: node.item.metrics,
        }
    }
}

/// Trait for family query operations
#[async_trait]
pub trait FamilyQueryHandler: Send + Sync {
    /// Get summary information for the family containing `content_id`
    async fn get_family_info(&self, content_id: ContentId) -> FamilyQueryResult<FamilyInfo>;

    /// Get the full built family, orphans included
    async fn get_family(&self, content_id: ContentId) -> FamilyQueryResult<BuiltFamily>;

    /// Get detail for one family member
    async fn get_node(&self, content_id: ContentId) -> FamilyQueryResult<NodeDetail>;

    /// Get the direct children of a member
    async fn get_children(&self, content_id: ContentId) -> FamilyQueryResult<Vec<NodeDetail>>;

    /// Get the ancestor chain of a member, nearest first
    async fn get_ancestors(&self, content_id: ContentId) -> FamilyQueryResult<Vec<ContentId>>;

    /// Get every descendant of a member, in traversal order
    async fn get_descendants(&self, content_id: ContentId) -> FamilyQueryResult<Vec<NodeDetail>>;

    /// Fold the family's metrics bottom-up into one aggregate
    async fn get_aggregate_metrics(
        &self,
        content_id: ContentId,
    ) -> FamilyQueryResult<AggregateMetrics>;

    /// Project the family into renderable graph data
    async fn get_graph_data(
        &self,
        content_id: ContentId,
        options: GraphDataOptions,
    ) -> FamilyQueryResult<GraphData>;
}

/// Query handler backed by a relationship service
pub struct FamilyQueryHandlerImpl {
    service: Arc<dyn ContentRelationshipService>,
}

impl FamilyQueryHandlerImpl {
    /// Create a new query handler over the given service
    pub fn new(service: Arc<dyn ContentRelationshipService>) -> Self {
        Self { service }
    }

    /// Fetch and build the family, keeping the backend's version counter
    async fn load(&self, content_id: ContentId) -> FamilyQueryResult<(BuiltFamily, u64)> {
        let snapshot = self.service.fetch_family(content_id).await?;
        let version = snapshot.version;
        let built = snapshot.build()?;
        Ok((built, version))
    }
}

#[async_trait]
impl FamilyQueryHandler for FamilyQueryHandlerImpl {
    async fn get_family_info(&self, content_id: ContentId) -> FamilyQueryResult<FamilyInfo> {
        let (built, version) = self.load(content_id).await?;
        let family = &built.family;
        Ok(FamilyInfo {
            root_id: family.root_id(),
            title: family.root().item.title.clone(),
            node_count: family.len(),
            edge_count: family.relationships().len(),
            orphan_count: built.orphans.len(),
            max_depth: family.max_depth(),
            version,
            built_at: family.built_at(),
        })
    }

    async fn get_family(&self, content_id: ContentId) -> FamilyQueryResult<BuiltFamily> {
        let (built, _) = self.load(content_id).await?;
        Ok(built)
    }

    async fn get_node(&self, content_id: ContentId) -> FamilyQueryResult<NodeDetail> {
        let (built, _) = self.load(content_id).await?;
        let node = built
            .family
            .node(content_id)
            .ok_or(FamilyQueryError::ContentNotFound(content_id))?;
        Ok(NodeDetail::from_node(&built.family, node))
    }

    async fn get_children(&self, content_id: ContentId) -> FamilyQueryResult<Vec<NodeDetail>> {
        let (built, _) = self.load(content_id).await?;
        if !built.family.contains(content_id) {
            return Err(FamilyQueryError::ContentNotFound(content_id));
        }
        Ok(built
            .family
            .children_of(content_id)
            .map(|node| NodeDetail::from_node(&built.family, node))
            .collect())
    }

    async fn get_ancestors(&self, content_id: ContentId) -> FamilyQueryResult<Vec<ContentId>> {
        let (built, _) = self.load(content_id).await?;
        if !built.family.contains(content_id) {
            return Err(FamilyQueryError::ContentNotFound(content_id));
        }
        Ok(built.family.ancestors_of(content_id))
    }

    async fn get_descendants(&self, content_id: ContentId) -> FamilyQueryResult<Vec<NodeDetail>> {
        let (built, _) = self.load(content_id).await?;
        if !built.family.contains(content_id) {
            return Err(FamilyQueryError::ContentNotFound(content_id));
        }
        Ok(built
            .family
            .descendants_of(content_id)
            .into_iter()
            .map(|node| NodeDetail::from_node(&built.family, node))
            .collect())
    }

    async fn get_aggregate_metrics(
        &self,
        content_id: ContentId,
    ) -> FamilyQueryResult<AggregateMetrics> {
        let (built, _) = self.load(content_id).await?;
        Ok(AggregateMetrics::from_family(&built.family))
    }

    async fn get_graph_data(
        &self,
        content_id: ContentId,
        options: GraphDataOptions,
    ) -> FamilyQueryResult<GraphData> {
        let (built, _) = self.load(content_id).await?;
        Ok(GraphData::from_family(&built.family, &options))
    }
}
