//! Content Family Graph Demo
//!
//! This example demonstrates:
//! - Seeding the in-memory relationship service with a cross-platform family
//! - Querying family structure and aggregate metrics
//! - Driving the interactive view: loading, zooming, collapsing a subtree

use chrono::Utc;
use engagerr_content_graph::{
    bridge::FamilyLoader,
    identifiers::{ContentId, CreatorId},
    infrastructure::InMemoryRelationshipService,
    queries::{FamilyQueryHandler, FamilyQueryHandlerImpl},
    renderer::FamilyView,
    value_objects::{
        Confidence, ContentItem, ContentMetrics, ContentRelationship, ContentType, CreationMethod,
        PlatformType, RelationshipType,
    },
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Content Family Graph Demo ===\n");

    // 1. Seed a family: a YouTube video echoed across three platforms
    println!("1. Seeding a cross-platform content family...");
    let (service, root_id, short_id) = seed_family()?;
    println!("   Seeded {} items around root {root_id}", service.item_count());

    // 2. Query the family structure
    println!("\n2. Querying family structure...");
    let queries = FamilyQueryHandlerImpl::new(service.clone());
    let info = queries.get_family_info(root_id).await?;
    println!(
        "   Family '{}': {} items, {} edges, max depth {}",
        info.title, info.node_count, info.edge_count, info.max_depth
    );
    for child in queries.get_children(root_id).await? {
        println!("   - {} on {} (depth {})", child.title, child.platform, child.depth);
    }

    // 3. Aggregate metrics across the whole family
    println!("\n3. Aggregating metrics...");
    let metrics = queries.get_aggregate_metrics(root_id).await?;
    println!("   {metrics}");

    // 4. Load the family into the interactive view
    println!("\n4. Loading the interactive view...");
    let loader = FamilyLoader::new(service.clone(), tokio::runtime::Handle::current());
    let mut view = FamilyView::new(Default::default(), Default::default());
    view.begin_loading(root_id);
    loader.request(root_id);
    while !loader.drive(&mut view) {
        tokio::time::sleep(tokio::time::Duration::from_millis(5)).await;
    }
    println!(
        "   View ready with {} visible nodes",
        view.data().map(|data| data.nodes.len()).unwrap_or(0)
    );

    // 5. Zoom in and collapse the short's subtree
    println!("\n5. Zooming and collapsing the short's subtree...");
    view.zoom_in();
    view.zoom_in();
    view.node_click(short_id);
    println!(
        "   After collapse: {} visible nodes at zoom {:.2}",
        view.data().map(|data| data.nodes.len()).unwrap_or(0),
        view.scale()
    );
    for event in view.poll_events() {
        println!("   event: {event:?}");
    }

    println!("\n=== Demo Complete ===");
    Ok(())
}

type DemoResult<T> = Result<T, Box<dyn std::error::Error>>;

fn seed_family() -> DemoResult<(Arc<InMemoryRelationshipService>, ContentId, ContentId)> {
    let service = Arc::new(InMemoryRelationshipService::new());
    let creator = CreatorId::new();

    let item = |platform, content_type, title: &str, views: u64| {
        ContentItem::new(ContentId::new(), creator, platform, content_type, title, Utc::now())
            .with_metrics(ContentMetrics {
                views,
                likes: views / 40,
                comments: views / 300,
                shares: views / 700,
                engagement_rate: 0.0,
                estimated_value: views as f64 * 0.01,
            })
    };

    let root = item(PlatformType::Youtube, ContentType::Video, "Studio Tour 2026", 220_000);
    let short = item(PlatformType::Tiktok, ContentType::Short, "Studio Tour in 60s", 890_000);
    let reel = item(PlatformType::Instagram, ContentType::Clip, "Tour highlights", 310_000);
    let thread = item(PlatformType::Twitter, ContentType::Thread, "Gear list from the tour", 45_000);

    let root_id = root.id;
    let short_id = short.id;
    let edges = vec![
        (root.id, short.id, RelationshipType::Parent),
        (root.id, reel.id, RelationshipType::Parent),
        (short.id, thread.id, RelationshipType::Parent),
    ];

    for content in [root, short, reel, thread] {
        service.insert_item(content);
    }
    for (source, target, relationship_type) in edges {
        service.insert_relationship(ContentRelationship::new(
            source,
            target,
            relationship_type,
            Confidence::FULL,
            CreationMethod::UserDefined,
        ))?;
    }

    Ok((service, root_id, short_id))
}
