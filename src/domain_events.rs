//! Domain events enum for the content graph

use crate::events::{
    DomainEvent, FamilyRebuilt, MetricsRefreshed, RelationshipCreated, RelationshipRemoved,
    SuggestionApproved, SuggestionRejected,
};
use serde::{Deserialize, Serialize};

/// Enum wrapper for content graph events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ContentGraphEvent {
    /// A family was assembled or reassembled
    FamilyRebuilt(FamilyRebuilt),
    /// A relationship edge was committed
    RelationshipCreated(RelationshipCreated),
    /// A relationship edge was removed
    RelationshipRemoved(RelationshipRemoved),
    /// A suggestion was approved into an edge
    SuggestionApproved(SuggestionApproved),
    /// A suggestion was discarded
    SuggestionRejected(SuggestionRejected),
    /// A member's metrics snapshot was replaced
    MetricsRefreshed(MetricsRefreshed),
}

impl DomainEvent for ContentGraphEvent {
    fn aggregate_id(&self) -> uuid::Uuid {
        match self {
            Self::FamilyRebuilt(e) => e.aggregate_id(),
            Self::RelationshipCreated(e) => e.aggregate_id(),
            Self::RelationshipRemoved(e) => e.aggregate_id(),
            Self::SuggestionApproved(e) => e.aggregate_id(),
            Self::SuggestionRejected(e) => e.aggregate_id(),
            Self::MetricsRefreshed(e) => e.aggregate_id(),
        }
    }

    fn event_type(&self) -> &'static str {
        match self {
            Self::FamilyRebuilt(e) => e.event_type(),
            Self::RelationshipCreated(e) => e.event_type(),
            Self::RelationshipRemoved(e) => e.event_type(),
            Self::SuggestionApproved(e) => e.event_type(),
            Self::SuggestionRejected(e) => e.event_type(),
            Self::MetricsRefreshed(e) => e.event_type(),
        }
    }

    fn subject(&self) -> String {
        match self {
            Self::FamilyRebuilt(e) => e.subject(),
            Self::RelationshipCreated(e) => e.subject(),
            Self::RelationshipRemoved(e) => e.subject(),
            Self::SuggestionApproved(e) => e.subject(),
            Self::SuggestionRejected(e) => e.subject(),
            Self::MetricsRefreshed(e) => e.subject(),
        }
    }
}
