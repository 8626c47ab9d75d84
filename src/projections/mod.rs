//! Content family projections
//!
//! Projections are derived read models. [`AggregateMetrics`] and
//! [`GraphData`] are pure functions of a family, recomputed in full on every
//! change rather than patched incrementally; [`FamilySummaryProjection`] is
//! an event-maintained index across many families.

pub mod family_summary;
pub mod graph_data;
pub mod metrics;

pub use family_summary::*;
pub use graph_data::*;
pub use metrics::*;

use crate::domain_events::ContentGraphEvent;
use async_trait::async_trait;

/// Trait for event-maintained content graph projections
#[async_trait]
pub trait ContentProjection: Send + Sync {
    /// Handle a content graph event to update the projection
    async fn handle_event(&mut self, event: ContentGraphEvent) -> Result<(), String>;

    /// Reset the projection to its empty state
    async fn clear(&mut self) -> Result<(), String>;
}
