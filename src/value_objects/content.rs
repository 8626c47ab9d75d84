//! Content items, relationships, and suggestions
//!
//! These are the inbound shapes of the content graph: what the platform
//! ingestion pipeline produces and what the relationship service serves.
//! Families are built from them but they carry no family-level state
//! themselves.

use crate::identifiers::{ContentId, CreatorId, RelationshipId, SuggestionId};
use crate::value_objects::{Confidence, ContentType, CreationMethod, PlatformType, RelationshipType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Performance snapshot captured from the owning platform at ingestion time
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentMetrics {
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    /// Platform-reported engagement rate; recomputed family-wide during aggregation
    pub engagement_rate: f64,
    /// Estimated monetary value in the creator's currency
    pub estimated_value: f64,
}

impl ContentMetrics {
    /// Total engagement events: likes, comments, and shares combined
    pub fn engagements(&self) -> u64 {
        self.likes + self.comments + self.shares
    }
}

/// One piece of published content
///
/// Immutable once ingested except for the metrics snapshot, which is
/// refreshed out of band. Items are never deleted while a relationship
/// still references them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: ContentId,
    pub creator_id: CreatorId,
    pub platform: PlatformType,
    pub content_type: ContentType,
    pub title: String,
    pub published_at: DateTime<Utc>,
    /// Absent until the first metrics refresh completes
    pub metrics: Option<ContentMetrics>,
}

impl ContentItem {
    /// Create a content item without a metrics snapshot
    pub fn new(
        id: ContentId,
        creator_id: CreatorId,
        platform: PlatformType,
        content_type: ContentType,
        title: impl Into<String>,
        published_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            creator_id,
            platform,
            content_type,
            title: title.into(),
            published_at,
            metrics: None,
        }
    }

    /// Attach a metrics snapshot
    pub fn with_metrics(mut self, metrics: ContentMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// The metrics snapshot, or zeroes when none has been captured yet
    pub fn metrics_or_default(&self) -> ContentMetrics {
        self.metrics.unwrap_or_default()
    }
}

/// Directed edge between two content items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRelationship {
    pub id: RelationshipId,
    pub source: ContentId,
    pub target: ContentId,
    pub relationship_type: RelationshipType,
    pub confidence: Confidence,
    pub created_by: CreationMethod,
    pub created_at: DateTime<Utc>,
}

impl ContentRelationship {
    /// Create a relationship with a fresh id, stamped now
    pub fn new(
        source: ContentId,
        target: ContentId,
        relationship_type: RelationshipType,
        confidence: Confidence,
        created_by: CreationMethod,
    ) -> Self {
        Self {
            id: RelationshipId::new(),
            source,
            target,
            relationship_type,
            confidence,
            created_by,
            created_at: Utc::now(),
        }
    }

    /// Normalize a parental edge to `(parent, child)` regardless of which
    /// orientation the edge was recorded in
    ///
    /// A `Parent` edge reads "source is the parent of target"; a `Child`
    /// edge is the inverse. Associative edges return `None`.
    pub fn parental_endpoints(&self) -> Option<(ContentId, ContentId)> {
        match self.relationship_type {
            RelationshipType::Parent => Some((self.source, self.target)),
            RelationshipType::Child => Some((self.target, self.source)),
            _ => None,
        }
    }

    /// True when this edge touches the given content item
    pub fn involves(&self, id: ContentId) -> bool {
        self.source == id || self.target == id
    }
}

/// A candidate relationship proposed by the external classifier
///
/// Not yet part of any family; resolved by explicit user action into either
/// a [`ContentRelationship`] (approved) or nothing (rejected).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSuggestion {
    pub id: SuggestionId,
    pub source: ContentId,
    pub target: ContentId,
    pub suggested_type: RelationshipType,
    pub confidence: Confidence,
    /// Human-readable reason the classifier proposed this pairing
    pub rationale: String,
    pub suggested_at: DateTime<Utc>,
}

impl ContentSuggestion {
    pub fn new(
        source: ContentId,
        target: ContentId,
        suggested_type: RelationshipType,
        confidence: Confidence,
        rationale: impl Into<String>,
    ) -> Self {
        Self {
            id: SuggestionId::new(),
            source,
            target,
            suggested_type,
            confidence,
            rationale: rationale.into(),
            suggested_at: Utc::now(),
        }
    }

    /// Materialize this suggestion into a real relationship
    pub fn into_relationship(self) -> ContentRelationship {
        ContentRelationship::new(
            self.source,
            self.target,
            self.suggested_type,
            self.confidence,
            CreationMethod::AiSuggested,
        )
    }
}
