//! Infrastructure layer for the content graph
//!
//! Defines the [`ContentRelationshipService`] boundary that the handlers and
//! the renderer talk through, plus the two concrete backends: an in-memory
//! store for tests and demos, and a REST client for the production
//! relationship service.

pub mod memory;
pub mod rest;

pub use memory::InMemoryRelationshipService;
pub use rest::RestRelationshipService;

use crate::aggregate::{BuiltFamily, FamilyBuilder, StructuralError};
use crate::commands::{CommandResult, NewRelationship};
use crate::identifiers::{ContentId, RelationshipId, SuggestionId};
use crate::value_objects::{ContentItem, ContentMetrics, ContentRelationship, ContentSuggestion};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised on the read path of the relationship service
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never completed
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response arrived but could not be decoded
    #[error("invalid response from {url}: {detail}")]
    Decode { url: String, detail: String },

    /// The requested resource does not exist upstream
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// The backend answered with a non-success status
    #[error("backend returned {status}: {message}")]
    Backend { status: u16, message: String },
}

/// Raw family data as served by the backend
///
/// This is the input to [`FamilyBuilder`]: the item pool and every recorded
/// relationship touching it, before any structural validation. `version` is
/// the backend's change counter for the family; mutations can pass it back
/// to detect concurrent edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilySnapshot {
    pub root_id: ContentId,
    pub items: Vec<ContentItem>,
    pub relationships: Vec<ContentRelationship>,
    pub version: u64,
}

impl FamilySnapshot {
    /// Run the family builder over this snapshot
    pub fn build(&self) -> Result<BuiltFamily, StructuralError> {
        FamilyBuilder::new(self.root_id)
            .with_items(self.items.clone())
            .with_relationships(self.relationships.clone())
            .build()
    }
}

/// The boundary to the content relationship backend
///
/// Reads return [`FetchError`]; mutations return the full command error
/// taxonomy so structural rejections surface as ordinary outcomes rather
/// than transport failures. Implementations must apply mutations in a
/// single global order per family: when two mutations race, whichever
/// commits first wins and the loser fails deterministically.
#[async_trait]
pub trait ContentRelationshipService: Send + Sync {
    /// Fetch the raw family snapshot for the family containing `content_id`
    async fn fetch_family(&self, content_id: ContentId) -> Result<FamilySnapshot, FetchError>;

    /// Fetch all pending suggestions involving `content_id`, unfiltered
    async fn fetch_suggestions(
        &self,
        content_id: ContentId,
    ) -> Result<Vec<ContentSuggestion>, FetchError>;

    /// Record a new relationship after structural validation
    ///
    /// `expected_version` makes the mutation conditional on the family
    /// still being at that version.
    async fn create_relationship(
        &self,
        new_relationship: NewRelationship,
        expected_version: Option<u64>,
    ) -> CommandResult<ContentRelationship>;

    /// Delete a relationship; any subtree it carried becomes orphaned
    async fn delete_relationship(
        &self,
        relationship_id: RelationshipId,
        expected_version: Option<u64>,
    ) -> CommandResult<()>;

    /// Resolve a suggestion into a real relationship
    ///
    /// Fails with the structural reason when the family has changed in a
    /// way that makes the suggested edge invalid; the suggestion stays
    /// pending in that case.
    async fn approve_suggestion(
        &self,
        suggestion_id: SuggestionId,
        expected_version: Option<u64>,
    ) -> CommandResult<ContentRelationship>;

    /// Dismiss a suggestion without recording anything
    async fn reject_suggestion(&self, suggestion_id: SuggestionId) -> CommandResult<()>;

    /// Replace the metrics snapshot of a single content item
    async fn refresh_metrics(
        &self,
        content_id: ContentId,
        metrics: ContentMetrics,
    ) -> CommandResult<()>;
}
