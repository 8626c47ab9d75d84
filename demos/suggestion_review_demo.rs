//! Suggestion Review Demo
//!
//! This example demonstrates:
//! - Listing classifier-proposed relationships filtered by confidence
//! - Approving a suggestion into a real relationship
//! - Rejecting a suggestion without leaving a trace
//! - How the family graph grows as suggestions are approved

use chrono::Utc;
use engagerr_content_graph::{
    config::SuggestionConfig,
    events::DomainEvent,
    handlers::SuggestionEngine,
    identifiers::{ContentId, CreatorId},
    infrastructure::InMemoryRelationshipService,
    queries::{FamilyQueryHandler, FamilyQueryHandlerImpl},
    value_objects::{
        Confidence, ContentItem, ContentRelationship, ContentSuggestion, ContentType,
        CreationMethod, PlatformType, RelationshipType,
    },
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Suggestion Review Demo ===\n");

    // 1. Seed a family plus three classifier suggestions
    println!("1. Seeding family and pending suggestions...");
    let (service, root_id) = seed()?;
    println!("   {} suggestions pending", service.suggestion_count());

    let engine = SuggestionEngine::new(service.clone(), SuggestionConfig::default());
    let queries = FamilyQueryHandlerImpl::new(service.clone());

    // 2. List at the default threshold
    println!(
        "\n2. Listing suggestions at the default threshold ({:.2})...",
        engine.default_threshold()
    );
    let visible = engine.list_suggestions(root_id, None).await?;
    for suggestion in &visible {
        println!(
            "   [{}] {} -> {} ({}): {}",
            suggestion.confidence,
            suggestion.source,
            suggestion.target,
            suggestion.suggested_type,
            suggestion.rationale
        );
    }

    // 3. Approve the strongest suggestion
    println!("\n3. Approving the strongest suggestion...");
    let strongest = visible.first().ok_or("no suggestion cleared the threshold")?;
    let approved = engine.approve(strongest, None).await?;
    println!("   emitted {} on {}", approved.event_type(), approved.subject());
    let info = queries.get_family_info(root_id).await?;
    println!(
        "   Family now has {} items and {} edges",
        info.node_count, info.edge_count
    );

    // 4. Reject the runner-up
    println!("\n4. Rejecting the next suggestion...");
    if let Some(runner_up) = visible.get(1) {
        let rejected = engine.reject(runner_up).await?;
        println!("   emitted {} on {}", rejected.event_type(), rejected.subject());
    }
    println!("   {} suggestions still pending", service.suggestion_count());

    // 5. The weak suggestion only appears when the threshold drops
    println!("\n5. Listing again at threshold 0.3...");
    for suggestion in engine.list_suggestions(root_id, Some(0.3)).await? {
        println!("   [{}] {}", suggestion.confidence, suggestion.rationale);
    }

    println!("\n=== Demo Complete ===");
    Ok(())
}

type DemoResult<T> = Result<T, Box<dyn std::error::Error>>;

fn seed() -> DemoResult<(Arc<InMemoryRelationshipService>, ContentId)> {
    let service = Arc::new(InMemoryRelationshipService::new());
    let creator = CreatorId::new();

    let item = |platform, content_type, title: &str| {
        ContentItem::new(ContentId::new(), creator, platform, content_type, title, Utc::now())
    };

    let video = item(PlatformType::Youtube, ContentType::Video, "Interview: building in public");
    let clip = item(PlatformType::Tiktok, ContentType::Clip, "Interview highlight");
    let short = item(PlatformType::Youtube, ContentType::Short, "Best interview moment");
    let post = item(PlatformType::Linkedin, ContentType::Post, "Notes from the interview");

    let root_id = video.id;
    let clip_id = clip.id;
    let short_id = short.id;
    let post_id = post.id;
    for content in [video, clip, short, post] {
        service.insert_item(content);
    }

    // The clip is already confirmed; the rest arrive as suggestions.
    service.insert_relationship(ContentRelationship::new(
        root_id,
        clip_id,
        RelationshipType::Parent,
        Confidence::FULL,
        CreationMethod::UserDefined,
    ))?;

    service.insert_suggestion(ContentSuggestion::new(
        root_id,
        short_id,
        RelationshipType::Parent,
        Confidence::new(0.94)?,
        "Same audio track, cut at 02:14",
    ));
    service.insert_suggestion(ContentSuggestion::new(
        root_id,
        post_id,
        RelationshipType::Repurposed,
        Confidence::new(0.78)?,
        "Title stem and publish window match",
    ));
    service.insert_suggestion(ContentSuggestion::new(
        root_id,
        post_id,
        RelationshipType::Reference,
        Confidence::new(0.41)?,
        "Shared hashtag only",
    ));

    Ok((service, root_id))
}
