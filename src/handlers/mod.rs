//! Command handlers and the suggestion engine
//!
//! Handlers sit between callers and the [`ContentRelationshipService`]
//! boundary: they route commands, attach the resulting domain events, and
//! apply the confidence policy to suggestion listings. Structural
//! validation itself lives behind the service, which owns the single
//! global mutation order per family.

use crate::commands::{CommandError, CommandResult, RelationshipCommand};
use crate::config::SuggestionConfig;
use crate::domain_events::ContentGraphEvent;
use crate::events::{
    MetricsRefreshed, RelationshipCreated, RelationshipRemoved, SuggestionApproved,
    SuggestionRejected,
};
use crate::identifiers::ContentId;
use crate::infrastructure::{ContentRelationshipService, FetchError};
use crate::value_objects::ContentSuggestion;
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for routing relationship commands
#[async_trait]
pub trait RelationshipCommandHandler: Send + Sync {
    /// Process a command and return the events it produced
    async fn handle_relationship_command(
        &self,
        command: RelationshipCommand,
    ) -> CommandResult<Vec<ContentGraphEvent>>;
}

/// Command handler backed by a relationship service
pub struct RelationshipCommandHandlerImpl {
    service: Arc<dyn ContentRelationshipService>,
}

impl RelationshipCommandHandlerImpl {
    /// Create a new command handler over the given service
    pub fn new(service: Arc<dyn ContentRelationshipService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl RelationshipCommandHandler for RelationshipCommandHandlerImpl {
    async fn handle_relationship_command(
        &self,
        command: RelationshipCommand,
    ) -> CommandResult<Vec<ContentGraphEvent>> {
        match command {
            RelationshipCommand::CreateRelationship {
                root_id,
                relationship,
            } => {
                let created = self.service.create_relationship(relationship, None).await?;
                Ok(vec![ContentGraphEvent::RelationshipCreated(
                    RelationshipCreated {
                        root_id,
                        relationship: created,
                    },
                )])
            }

            RelationshipCommand::DeleteRelationship {
                root_id,
                relationship_id,
            } => {
                self.service
                    .delete_relationship(relationship_id, None)
                    .await?;
                Ok(vec![ContentGraphEvent::RelationshipRemoved(
                    RelationshipRemoved {
                        root_id,
                        relationship_id,
                    },
                )])
            }

            RelationshipCommand::ApproveSuggestion {
                root_id,
                suggestion_id,
            } => {
                let created = self.service.approve_suggestion(suggestion_id, None).await?;
                Ok(vec![ContentGraphEvent::SuggestionApproved(
                    SuggestionApproved {
                        root_id,
                        suggestion_id,
                        relationship_id: created.id,
                    },
                )])
            }

            RelationshipCommand::RejectSuggestion {
                root_id,
                suggestion_id,
            } => {
                self.service.reject_suggestion(suggestion_id).await?;
                Ok(vec![ContentGraphEvent::SuggestionRejected(
                    SuggestionRejected {
                        root_id,
                        suggestion_id,
                    },
                )])
            }

            RelationshipCommand::RefreshMetrics {
                root_id,
                content_id,
                metrics,
            } => {
                self.service.refresh_metrics(content_id, metrics).await?;
                Ok(vec![ContentGraphEvent::MetricsRefreshed(MetricsRefreshed {
                    root_id,
                    content_id,
                    metrics,
                })])
            }
        }
    }
}

/// Review surface for classifier-proposed relationships
///
/// Listings are filtered by a confidence threshold: the caller's override
/// when given, the configured default otherwise. Suggestions scoring below
/// the threshold are never surfaced, but they stay pending upstream and
/// reappear if the threshold is lowered.
pub struct SuggestionEngine {
    service: Arc<dyn ContentRelationshipService>,
    config: SuggestionConfig,
}

impl SuggestionEngine {
    /// Create an engine with the given confidence policy
    pub fn new(service: Arc<dyn ContentRelationshipService>, config: SuggestionConfig) -> Self {
        Self { service, config }
    }

    /// The threshold applied when the caller does not override it
    pub fn default_threshold(&self) -> f64 {
        self.config.default_confidence_threshold
    }

    /// Pending suggestions involving `content_id` at or above the
    /// threshold, strongest first
    pub async fn list_suggestions(
        &self,
        content_id: ContentId,
        threshold: Option<f64>,
    ) -> Result<Vec<ContentSuggestion>, FetchError> {
        let threshold = threshold.unwrap_or(self.config.default_confidence_threshold);
        let mut suggestions = self.service.fetch_suggestions(content_id).await?;
        suggestions.retain(|suggestion| suggestion.confidence.value() >= threshold);
        suggestions.sort_by(|a, b| b.confidence.value().total_cmp(&a.confidence.value()));
        tracing::debug!(
            "{} suggestions for {} at threshold {}",
            suggestions.len(),
            content_id,
            threshold
        );
        Ok(suggestions)
    }

    /// Approve a suggestion, materializing it into a relationship
    ///
    /// A structural rejection is an expected outcome here, not a fault:
    /// the family may have changed since the suggestion was generated.
    pub async fn approve(
        &self,
        suggestion: &ContentSuggestion,
        expected_version: Option<u64>,
    ) -> CommandResult<ContentGraphEvent> {
        let root_id = self.family_root(suggestion).await?;
        let created = self
            .service
            .approve_suggestion(suggestion.id, expected_version)
            .await?;
        Ok(ContentGraphEvent::SuggestionApproved(SuggestionApproved {
            root_id,
            suggestion_id: suggestion.id,
            relationship_id: created.id,
        }))
    }

    /// Reject a suggestion, discarding it without leaving a trace
    pub async fn reject(&self, suggestion: &ContentSuggestion) -> CommandResult<ContentGraphEvent> {
        let root_id = self.family_root(suggestion).await?;
        self.service.reject_suggestion(suggestion.id).await?;
        Ok(ContentGraphEvent::SuggestionRejected(SuggestionRejected {
            root_id,
            suggestion_id: suggestion.id,
        }))
    }

    /// The root of the family a suggestion would mutate, for event routing
    async fn family_root(&self, suggestion: &ContentSuggestion) -> CommandResult<ContentId> {
        let snapshot = self
            .service
            .fetch_family(suggestion.source)
            .await
            .map_err(CommandError::from)?;
        Ok(snapshot.root_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::NewRelationship;
    use crate::events::DomainEvent;
    use crate::identifiers::CreatorId;
    use crate::infrastructure::InMemoryRelationshipService;
    use crate::value_objects::{
        Confidence, ContentItem, ContentType, PlatformType, RelationshipType,
    };
    use chrono::Utc;

    fn seeded_pair() -> (Arc<InMemoryRelationshipService>, ContentId, ContentId) {
        let service = Arc::new(InMemoryRelationshipService::new());
        let creator = CreatorId::new();
        let root = ContentItem::new(
            ContentId::new(),
            creator,
            PlatformType::Youtube,
            ContentType::Video,
            "Launch video",
            Utc::now(),
        );
        let clip = ContentItem::new(
            ContentId::new(),
            creator,
            PlatformType::Tiktok,
            ContentType::Clip,
            "Launch clip",
            Utc::now(),
        );
        let (root_id, clip_id) = (root.id, clip.id);
        service.insert_item(root);
        service.insert_item(clip);
        (service, root_id, clip_id)
    }

    #[tokio::test]
    async fn test_create_command_emits_relationship_created() {
        let (service, root_id, clip_id) = seeded_pair();
        let handler = RelationshipCommandHandlerImpl::new(service);

        let events = handler
            .handle_relationship_command(RelationshipCommand::CreateRelationship {
                root_id,
                relationship: NewRelationship::user_defined(
                    root_id,
                    clip_id,
                    RelationshipType::Parent,
                ),
            })
            .await
            .unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "RelationshipCreated");
        assert_eq!(events[0].subject(), "content.relationship.created.v1");
    }

    #[tokio::test]
    async fn test_structural_rejection_propagates_through_the_handler() {
        let (service, root_id, clip_id) = seeded_pair();
        let handler = RelationshipCommandHandlerImpl::new(service);

        handler
            .handle_relationship_command(RelationshipCommand::CreateRelationship {
                root_id,
                relationship: NewRelationship::user_defined(
                    root_id,
                    clip_id,
                    RelationshipType::Parent,
                ),
            })
            .await
            .unwrap();

        // Parenting the root under its own clip would close a loop.
        let error = handler
            .handle_relationship_command(RelationshipCommand::CreateRelationship {
                root_id,
                relationship: NewRelationship::user_defined(
                    clip_id,
                    root_id,
                    RelationshipType::Parent,
                ),
            })
            .await
            .unwrap_err();
        assert!(error.is_structural_rejection());
    }

    #[tokio::test]
    async fn test_listing_applies_the_default_threshold() {
        let (service, root_id, clip_id) = seeded_pair();
        let strong = ContentSuggestion::new(
            root_id,
            clip_id,
            RelationshipType::Derivative,
            Confidence::new(0.92).unwrap(),
            "Audio fingerprint match",
        );
        let weak = ContentSuggestion::new(
            root_id,
            clip_id,
            RelationshipType::Reference,
            Confidence::new(0.4).unwrap(),
            "Shared hashtag",
        );
        service.insert_suggestion(strong.clone());
        service.insert_suggestion(weak.clone());

        let engine = SuggestionEngine::new(service, SuggestionConfig::default());

        let visible = engine.list_suggestions(root_id, None).await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, strong.id);

        // Lowering the threshold surfaces the weak suggestion as well.
        let all = engine.list_suggestions(root_id, Some(0.3)).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, strong.id);

        // A threshold exactly at the score keeps the suggestion visible.
        let at_boundary = engine.list_suggestions(root_id, Some(0.92)).await.unwrap();
        assert_eq!(at_boundary.len(), 1);
    }

    #[tokio::test]
    async fn test_approve_and_reject_emit_routable_events() {
        let (service, root_id, clip_id) = seeded_pair();
        let keep = ContentSuggestion::new(
            root_id,
            clip_id,
            RelationshipType::Parent,
            Confidence::new(0.9).unwrap(),
            "Cut from the same recording",
        );
        let drop = ContentSuggestion::new(
            root_id,
            clip_id,
            RelationshipType::Reference,
            Confidence::new(0.8).unwrap(),
            "Same week",
        );
        service.insert_suggestion(keep.clone());
        service.insert_suggestion(drop.clone());

        let engine = SuggestionEngine::new(service.clone(), SuggestionConfig::default());

        let approved = engine.approve(&keep, None).await.unwrap();
        assert_eq!(approved.subject(), "content.suggestion.approved.v1");
        assert_eq!(service.relationship_count(), 1);

        let rejected = engine.reject(&drop).await.unwrap();
        assert_eq!(rejected.subject(), "content.suggestion.rejected.v1");
        assert_eq!(service.suggestion_count(), 0);
    }
}
