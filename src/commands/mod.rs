//! Content graph commands
//!
//! Commands represent intent to modify a content family. They are processed
//! by command handlers which validate structural rules and emit
//! corresponding events.

use crate::aggregate::StructuralError;
use crate::identifiers::{ContentId, RelationshipId, SuggestionId};
use crate::infrastructure::FetchError;
use crate::value_objects::{Confidence, ContentMetrics, CreationMethod, RelationshipType};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Parameters for creating a relationship edge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRelationship {
    /// The source content item of the edge
    pub source: ContentId,
    /// The target content item of the edge
    pub target: ContentId,
    /// Semantic label for the edge
    pub relationship_type: RelationshipType,
    /// Classifier certainty, or [`Confidence::FULL`] for manual edges
    pub confidence: Confidence,
    /// How the edge came to exist
    pub created_by: CreationMethod,
}

impl NewRelationship {
    /// A relationship entered manually by the creator
    pub fn user_defined(
        source: ContentId,
        target: ContentId,
        relationship_type: RelationshipType,
    ) -> Self {
        Self {
            source,
            target,
            relationship_type,
            confidence: Confidence::FULL,
            created_by: CreationMethod::UserDefined,
        }
    }
}

/// Commands for content family operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RelationshipCommand {
    /// Create a relationship edge inside a family
    CreateRelationship {
        /// The family to mutate, keyed by its root
        root_id: ContentId,
        /// The edge to create
        relationship: NewRelationship,
    },

    /// Delete a relationship edge from a family
    DeleteRelationship {
        /// The family to mutate
        root_id: ContentId,
        /// The edge to delete
        relationship_id: RelationshipId,
    },

    /// Approve a pending AI suggestion, materializing it into an edge
    ApproveSuggestion {
        /// The family to mutate
        root_id: ContentId,
        /// The suggestion being approved
        suggestion_id: SuggestionId,
    },

    /// Reject a pending AI suggestion, discarding it
    RejectSuggestion {
        /// The family the suggestion targeted
        root_id: ContentId,
        /// The suggestion being rejected
        suggestion_id: SuggestionId,
    },

    /// Replace a member's platform metrics snapshot
    RefreshMetrics {
        /// The family containing the member
        root_id: ContentId,
        /// The member to refresh
        content_id: ContentId,
        /// The new snapshot
        metrics: ContentMetrics,
    },
}

impl RelationshipCommand {
    /// The family this command targets
    pub fn root_id(&self) -> ContentId {
        match self {
            Self::CreateRelationship { root_id, .. }
            | Self::DeleteRelationship { root_id, .. }
            | Self::ApproveSuggestion { root_id, .. }
            | Self::RejectSuggestion { root_id, .. }
            | Self::RefreshMetrics { root_id, .. } => *root_id,
        }
    }
}

/// Result type for command processing
pub type CommandResult<T> = Result<T, CommandError>;

/// Errors that can occur during command processing
#[derive(Debug, Error)]
pub enum CommandError {
    /// The mutation violates the family's structural rules
    #[error(transparent)]
    Structural(#[from] StructuralError),

    /// Lost a concurrent-edit race; whichever mutation committed first won
    #[error("concurrent edit detected: {detail}")]
    StructuralConflict {
        /// Human-readable account of what moved underneath the caller
        detail: String,
    },

    /// No family is rooted at the named content item
    #[error("no content family is rooted at {0}")]
    FamilyNotFound(ContentId),

    /// The suggestion does not exist or was already resolved
    #[error("suggestion {0} was not found or is already resolved")]
    SuggestionNotFound(SuggestionId),

    /// The relationship does not exist in the family
    #[error("relationship {0} was not found")]
    RelationshipNotFound(RelationshipId),

    /// The backing relationship service failed
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl CommandError {
    /// True for outcomes a client should surface and move on from rather
    /// than retry: the family itself rejected the mutation.
    pub fn is_structural_rejection(&self) -> bool {
        matches!(
            self,
            CommandError::Structural(_) | CommandError::StructuralConflict { .. }
        )
    }
}
