//! Last-request-wins family loading
//!
//! A navigation burst can fire several family fetches before the first one
//! answers, and the slow answers may arrive out of order. The loader tags
//! every request with a monotonically increasing generation; only outcomes
//! carrying the newest generation survive [`FamilyLoader::poll`], so the
//! view always ends up showing the family the user asked for last.

use crate::aggregate::BuiltFamily;
use crate::identifiers::ContentId;
use crate::infrastructure::ContentRelationshipService;
use crate::renderer::FamilyView;
use crossbeam::channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;

/// Result of one family fetch, tagged with its request generation
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    Loaded {
        content_id: ContentId,
        generation: u64,
        /// Backend version of the snapshot the family was built from
        version: u64,
        built: BuiltFamily,
    },
    Failed {
        content_id: ContentId,
        generation: u64,
        message: String,
    },
}

impl LoadOutcome {
    pub fn generation(&self) -> u64 {
        match self {
            LoadOutcome::Loaded { generation, .. } => *generation,
            LoadOutcome::Failed { generation, .. } => *generation,
        }
    }

    pub fn content_id(&self) -> ContentId {
        match self {
            LoadOutcome::Loaded { content_id, .. } => *content_id,
            LoadOutcome::Failed { content_id, .. } => *content_id,
        }
    }
}

/// Fetches families on the runtime and hands results to the frame loop
pub struct FamilyLoader {
    service: Arc<dyn ContentRelationshipService>,
    runtime_handle: Handle,
    generation: Arc<AtomicU64>,
    outcome_tx: Sender<LoadOutcome>,
    outcome_rx: Receiver<LoadOutcome>,
}

impl FamilyLoader {
    /// Create a loader backed by the given relationship service
    pub fn new(service: Arc<dyn ContentRelationshipService>, runtime_handle: Handle) -> Self {
        let (outcome_tx, outcome_rx) = bounded(crate::bridge::CHANNEL_CAPACITY);
        Self {
            service,
            runtime_handle,
            generation: Arc::new(AtomicU64::new(0)),
            outcome_tx,
            outcome_rx,
        }
    }

    /// The generation of the most recent request
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Start fetching the family around a content item
    ///
    /// Supersedes any fetch still in flight; its result will be discarded
    /// whenever it lands. Returns the new request's generation.
    pub fn request(&self, content_id: ContentId) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let service = self.service.clone();
        let counter = self.generation.clone();
        let outcome_tx = self.outcome_tx.clone();
        self.runtime_handle.spawn(async move {
            let outcome = match service.fetch_family(content_id).await {
                Ok(snapshot) => match snapshot.build() {
                    Ok(built) => LoadOutcome::Loaded {
                        content_id,
                        generation,
                        version: snapshot.version,
                        built,
                    },
                    Err(error) => LoadOutcome::Failed {
                        content_id,
                        generation,
                        message: error.to_string(),
                    },
                },
                Err(error) => LoadOutcome::Failed {
                    content_id,
                    generation,
                    message: error.to_string(),
                },
            };
            if counter.load(Ordering::SeqCst) != generation {
                tracing::debug!(%content_id, generation, "family load superseded before delivery");
                return;
            }
            if outcome_tx.send(outcome).is_err() {
                tracing::warn!(%content_id, generation, "family loader dropped before delivery");
            }
        });
        generation
    }

    /// Drain finished fetches, keeping only the newest generation
    pub fn poll(&self) -> Option<LoadOutcome> {
        let current = self.generation.load(Ordering::SeqCst);
        let mut latest = None;
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            if outcome.generation() == current {
                latest = Some(outcome);
            } else {
                tracing::debug!(
                    stale_generation = outcome.generation(),
                    current_generation = current,
                    "discarding superseded family load"
                );
            }
        }
        latest
    }

    /// Poll once and apply any result to the view
    ///
    /// Returns true when the view changed phase.
    pub fn drive(&self, view: &mut FamilyView) -> bool {
        match self.poll() {
            Some(LoadOutcome::Loaded { built, .. }) => {
                view.set_family(built.family);
                true
            }
            Some(LoadOutcome::Failed { message, .. }) => {
                view.set_error(message);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::InMemoryRelationshipService;
    use crate::value_objects::{
        Confidence, ContentItem, ContentRelationship, ContentType, CreationMethod, PlatformType,
        RelationshipType,
    };
    use chrono::Utc;

    fn seeded_service() -> (Arc<InMemoryRelationshipService>, ContentId, ContentId) {
        let service = Arc::new(InMemoryRelationshipService::new());
        let creator = crate::identifiers::CreatorId::new();
        let make = |title: &str| {
            ContentItem::new(
                ContentId::new(),
                creator,
                PlatformType::Youtube,
                ContentType::Video,
                title,
                Utc::now(),
            )
        };
        let root_a = make("family a");
        let root_b = make("family b");
        let clip = make("clip of a");
        let (a, b) = (root_a.id, root_b.id);
        let clip_id = clip.id;
        service.insert_item(root_a);
        service.insert_item(root_b);
        service.insert_item(clip);
        service
            .insert_relationship(ContentRelationship::new(
                a,
                clip_id,
                RelationshipType::Parent,
                Confidence::FULL,
                CreationMethod::UserDefined,
            ))
            .unwrap();
        (service, a, b)
    }

    #[tokio::test]
    async fn test_family_load_round_trip() {
        let (service, root_a, _) = seeded_service();
        let loader = FamilyLoader::new(service, Handle::current());

        let generation = loader.request(root_a);
        assert_eq!(generation, 1);
        tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;

        match loader.poll() {
            Some(LoadOutcome::Loaded {
                content_id, built, ..
            }) => {
                assert_eq!(content_id, root_a);
                assert_eq!(built.family.len(), 2);
            }
            other => panic!("expected a loaded family, got {other:?}"),
        }
        // Nothing further queued.
        assert!(loader.poll().is_none());
    }

    #[tokio::test]
    async fn test_newest_request_wins() {
        let (service, root_a, root_b) = seeded_service();
        let loader = FamilyLoader::new(service, Handle::current());

        loader.request(root_a);
        let newest = loader.request(root_b);
        assert_eq!(loader.current_generation(), newest);
        tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;

        // Whatever order the two fetches finished in, only the second one
        // may surface.
        match loader.poll() {
            Some(outcome) => {
                assert_eq!(outcome.generation(), newest);
                assert_eq!(outcome.content_id(), root_b);
            }
            None => panic!("expected the newest load to surface"),
        }
    }

    #[tokio::test]
    async fn test_failed_load_drives_the_view_into_error() {
        let (service, _, _) = seeded_service();
        let loader = FamilyLoader::new(service, Handle::current());
        let mut view = FamilyView::new(Default::default(), Default::default());

        let unknown = ContentId::new();
        view.begin_loading(unknown);
        loader.request(unknown);
        tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;

        assert!(loader.drive(&mut view));
        assert!(view.can_retry());
    }

    #[tokio::test]
    async fn test_drive_installs_the_family() {
        let (service, root_a, _) = seeded_service();
        let loader = FamilyLoader::new(service, Handle::current());
        let mut view = FamilyView::new(Default::default(), Default::default());

        view.begin_loading(root_a);
        loader.request(root_a);
        tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;

        assert!(loader.drive(&mut view));
        assert!(view.is_ready());
        assert_eq!(view.data().unwrap().nodes.len(), 2);
        assert!(!loader.drive(&mut view));
    }
}
