//! Content graph domain events
//!
//! Events record facts that already happened to a family. They are emitted
//! by the command handlers after a mutation commits and consumed by
//! projections and any outside subscriber.

pub mod relationship_events;

pub use relationship_events::*;

use uuid::Uuid;

/// Behavior shared by every content graph event
pub trait DomainEvent: std::fmt::Debug + Send + Sync {
    /// The family this event belongs to, keyed by its root content id
    fn aggregate_id(&self) -> Uuid;

    /// Stable name for logging and routing
    fn event_type(&self) -> &'static str;

    /// Versioned subject for message routing
    fn subject(&self) -> String;
}
