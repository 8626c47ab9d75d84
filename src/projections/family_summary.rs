//! Family summary projection
//!
//! Maintains a lightweight per-family index (counts, version, resolution
//! tallies) across every family this process has seen, updated from domain
//! events. Backs list views that should not load whole families.

use crate::domain_events::ContentGraphEvent;
use crate::identifiers::ContentId;
use crate::projections::ContentProjection;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Summary information about one content family
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilySummary {
    /// The family's root content item
    pub root_id: ContentId,
    /// Current number of member nodes
    pub node_count: usize,
    /// Current number of relationship edges
    pub edge_count: usize,
    /// Items reported unattached at the last rebuild
    pub orphan_count: usize,
    /// The family's change counter at the last event
    pub version: u64,
    /// Suggestions approved into edges over this family's lifetime
    pub approved_suggestions: usize,
    /// Suggestions rejected over this family's lifetime
    pub rejected_suggestions: usize,
    /// When the family last changed
    pub last_event_at: DateTime<Utc>,
}

impl FamilySummary {
    fn empty(root_id: ContentId) -> Self {
        Self {
            root_id,
            node_count: 0,
            edge_count: 0,
            orphan_count: 0,
            version: 0,
            approved_suggestions: 0,
            rejected_suggestions: 0,
            last_event_at: Utc::now(),
        }
    }
}

/// Projection that maintains family summaries
#[derive(Debug, Clone, Default)]
pub struct FamilySummaryProjection {
    summaries: HashMap<ContentId, FamilySummary>,
}

impl FamilySummaryProjection {
    /// Create a new family summary projection
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a family's summary by its root id
    pub fn get_summary(&self, root_id: &ContentId) -> Option<&FamilySummary> {
        self.summaries.get(root_id)
    }

    /// Get all family summaries
    pub fn get_all_summaries(&self) -> Vec<&FamilySummary> {
        self.summaries.values().collect()
    }

    /// Total number of families tracked
    pub fn total_families(&self) -> usize {
        self.summaries.len()
    }

    fn summary_mut(&mut self, root_id: ContentId) -> &mut FamilySummary {
        self.summaries
            .entry(root_id)
            .or_insert_with(|| FamilySummary::empty(root_id))
    }
}

#[async_trait]
impl ContentProjection for FamilySummaryProjection {
    async fn handle_event(&mut self, event: ContentGraphEvent) -> Result<(), String> {
        match event {
            ContentGraphEvent::FamilyRebuilt(e) => {
                let summary = self.summary_mut(e.root_id);
                summary.node_count = e.node_count;
                summary.edge_count = e.edge_count;
                summary.orphan_count = e.orphan_count;
                summary.version = e.version;
                summary.last_event_at = e.occurred_at;
            }
            ContentGraphEvent::RelationshipCreated(e) => {
                let summary = self.summary_mut(e.root_id);
                summary.edge_count += 1;
                summary.version += 1;
                summary.last_event_at = e.relationship.created_at;
            }
            ContentGraphEvent::RelationshipRemoved(e) => {
                let summary = self.summary_mut(e.root_id);
                summary.edge_count = summary.edge_count.saturating_sub(1);
                summary.version += 1;
                summary.last_event_at = Utc::now();
            }
            ContentGraphEvent::SuggestionApproved(e) => {
                // The approval materialized a new edge.
                let summary = self.summary_mut(e.root_id);
                summary.edge_count += 1;
                summary.approved_suggestions += 1;
                summary.version += 1;
                summary.last_event_at = Utc::now();
            }
            ContentGraphEvent::SuggestionRejected(e) => {
                let summary = self.summary_mut(e.root_id);
                summary.rejected_suggestions += 1;
                summary.last_event_at = Utc::now();
            }
            ContentGraphEvent::MetricsRefreshed(e) => {
                let summary = self.summary_mut(e.root_id);
                summary.version += 1;
                summary.last_event_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn clear(&mut self) -> Result<(), String> {
        self.summaries.clear();
        Ok(())
    }
}
