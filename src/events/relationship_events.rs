//! Events describing changes to content families

use crate::events::DomainEvent;
use crate::identifiers::{ContentId, RelationshipId, SuggestionId};
use crate::value_objects::{ContentMetrics, ContentRelationship};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A family was assembled (or reassembled) from a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyRebuilt {
    /// The root content item of the family
    pub root_id: ContentId,
    /// Number of member nodes in the rebuilt family
    pub node_count: usize,
    /// Number of relationship edges among the members
    pub edge_count: usize,
    /// Number of items that could not be connected to the root
    pub orphan_count: usize,
    /// The family's change counter after the rebuild
    pub version: u64,
    /// When the rebuild happened
    pub occurred_at: DateTime<Utc>,
}

/// A relationship edge was committed to a family
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipCreated {
    /// The family the edge belongs to
    pub root_id: ContentId,
    /// The committed edge
    pub relationship: ContentRelationship,
}

/// A relationship edge was removed from a family
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipRemoved {
    /// The family the edge belonged to
    pub root_id: ContentId,
    /// The removed edge
    pub relationship_id: RelationshipId,
}

/// An AI suggestion was approved and materialized into an edge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionApproved {
    /// The family the new edge belongs to
    pub root_id: ContentId,
    /// The resolved suggestion
    pub suggestion_id: SuggestionId,
    /// The edge the approval created
    pub relationship_id: RelationshipId,
}

/// An AI suggestion was rejected and discarded
///
/// No blocklist record is kept, so an identical suggestion may resurface on
/// the next classification pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionRejected {
    /// The family the suggestion targeted
    pub root_id: ContentId,
    /// The discarded suggestion
    pub suggestion_id: SuggestionId,
}

/// A member's platform metrics snapshot was replaced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsRefreshed {
    /// The family containing the refreshed member
    pub root_id: ContentId,
    /// The member whose metrics changed
    pub content_id: ContentId,
    /// The new snapshot
    pub metrics: ContentMetrics,
}

impl DomainEvent for FamilyRebuilt {
    fn aggregate_id(&self) -> Uuid {
        self.root_id.into()
    }

    fn event_type(&self) -> &'static str {
        "FamilyRebuilt"
    }

    fn subject(&self) -> String {
        "content.family.rebuilt.v1".to_string()
    }
}

impl DomainEvent for RelationshipCreated {
    fn aggregate_id(&self) -> Uuid {
        self.root_id.into()
    }

    fn event_type(&self) -> &'static str {
        "RelationshipCreated"
    }

    fn subject(&self) -> String {
        "content.relationship.created.v1".to_string()
    }
}

impl DomainEvent for RelationshipRemoved {
    fn aggregate_id(&self) -> Uuid {
        self.root_id.into()
    }

    fn event_type(&self) -> &'static str {
        "RelationshipRemoved"
    }

    fn subject(&self) -> String {
        "content.relationship.removed.v1".to_string()
    }
}

impl DomainEvent for SuggestionApproved {
    fn aggregate_id(&self) -> Uuid {
        self.root_id.into()
    }

    fn event_type(&self) -> &'static str {
        "SuggestionApproved"
    }

    fn subject(&self) -> String {
        "content.suggestion.approved.v1".to_string()
    }
}

impl DomainEvent for SuggestionRejected {
    fn aggregate_id(&self) -> Uuid {
        self.root_id.into()
    }

    fn event_type(&self) -> &'static str {
        "SuggestionRejected"
    }

    fn subject(&self) -> String {
        "content.suggestion.rejected.v1".to_string()
    }
}

impl DomainEvent for MetricsRefreshed {
    fn aggregate_id(&self) -> Uuid {
        self.root_id.into()
    }

    fn event_type(&self) -> &'static str {
        "MetricsRefreshed"
    }

    fn subject(&self) -> String {
        "content.metrics.refreshed.v1".to_string()
    }
}
