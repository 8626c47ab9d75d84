//! Generate a content family graph visualization
//!
//! This binary assembles a sample cross-platform content family, projects it
//! into renderable graph data, and writes a GraphViz DOT file plus a metrics
//! report for quick inspection.

use anyhow::Result;
use chrono::Utc;
use engagerr_content_graph::aggregate::{BuiltFamily, FamilyBuilder};
use engagerr_content_graph::identifiers::{ContentId, CreatorId};
use engagerr_content_graph::projections::{AggregateMetrics, GraphData, GraphDataOptions};
use engagerr_content_graph::value_objects::{
    Confidence, ContentItem, ContentMetrics, ContentRelationship, ContentType, CreationMethod,
    PlatformType, RelationshipType,
};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

fn main() -> Result<()> {
    println!("Building sample content family...");
    let built = sample_family()?;
    println!(
        "Built family of {} items with {} orphans",
        built.family.len(),
        built.orphans.len()
    );

    let data = GraphData::from_family(&built.family, &GraphDataOptions::default());

    // Create output directory
    let output_dir = Path::new("family-graphs");
    fs::create_dir_all(output_dir)?;

    // Generate GraphViz DOT
    let dot_path = output_dir.join("content-family.dot");
    fs::write(&dot_path, data.to_dot())?;
    println!("Generated DOT diagram: {}", dot_path.display());

    // Generate metrics report
    let metrics = AggregateMetrics::from_family(&built.family);
    let report_path = output_dir.join("family-metrics.md");
    fs::write(&report_path, metrics_report(&built, &metrics))?;
    println!("Generated metrics report: {}", report_path.display());

    println!("\nFamily summary:\n{metrics}");
    println!("\nTo generate a PNG from the DOT file, run:");
    println!("  dot -Tpng {} -o content-family.png", dot_path.display());

    Ok(())
}

/// A podcast episode that echoed across the creator's platforms, plus one
/// stray post the classifier has not placed yet
fn sample_family() -> Result<BuiltFamily> {
    let creator = CreatorId::new();
    let item = |platform, content_type, title: &str, views: u64| {
        ContentItem::new(ContentId::new(), creator, platform, content_type, title, Utc::now())
            .with_metrics(ContentMetrics {
                views,
                likes: views / 50,
                comments: views / 400,
                shares: views / 900,
                engagement_rate: 0.0,
                estimated_value: views as f64 * 0.012,
            })
    };

    let episode = item(
        PlatformType::Podcast,
        ContentType::PodcastEpisode,
        "Creator Economy Deep Dive #18",
        24_000,
    );
    let full_video = item(
        PlatformType::Youtube,
        ContentType::Video,
        "Deep Dive #18 (full video)",
        96_000,
    );
    let short = item(PlatformType::Tiktok, ContentType::Clip, "Best moment from #18", 410_000);
    let reel = item(PlatformType::Instagram, ContentType::Clip, "Deep Dive highlight", 150_000);
    let writeup = item(PlatformType::Blog, ContentType::Article, "Deep Dive #18 notes", 5_600);
    let reaction = item(PlatformType::Youtube, ContentType::Video, "Reacting to Deep Dive #18", 31_000);
    let stray = item(PlatformType::Twitter, ContentType::Thread, "Hot takes thread", 12_400);

    let edge = |source: &ContentItem, target: &ContentItem, relationship_type| {
        ContentRelationship::new(
            source.id,
            target.id,
            relationship_type,
            Confidence::FULL,
            CreationMethod::UserDefined,
        )
    };

    let relationships = vec![
        edge(&episode, &full_video, RelationshipType::Parent),
        edge(&full_video, &short, RelationshipType::Parent),
        edge(&full_video, &reel, RelationshipType::Parent),
        edge(&episode, &writeup, RelationshipType::Parent),
        edge(&full_video, &reaction, RelationshipType::Parent),
        // The writeup embeds the video; kept alongside the parental edges.
        edge(&writeup, &full_video, RelationshipType::Reference),
    ];

    let built = FamilyBuilder::new(episode.id)
        .with_items([episode, full_video, short, reel, writeup, reaction, stray])
        .with_relationships(relationships)
        .build()?;
    Ok(built)
}

fn metrics_report(built: &BuiltFamily, metrics: &AggregateMetrics) -> String {
    let mut report = String::new();

    report.push_str("# Content Family Report\n\n");
    report.push_str("## Summary\n\n");
    let _ = writeln!(report, "- Root: `{}`", metrics.root_id);
    let _ = writeln!(report, "- Items: {}", metrics.content_count);
    let _ = writeln!(report, "- Orphans: {}", built.orphans.len());
    let _ = writeln!(report, "- Total views: {}", metrics.total_views);
    let _ = writeln!(report, "- Total engagements: {}", metrics.total_engagements);
    let _ = writeln!(
        report,
        "- Engagement rate: {:.2}%",
        metrics.overall_engagement_rate * 100.0
    );
    let _ = writeln!(
        report,
        "- Estimated value: {:.2}",
        metrics.estimated_total_value
    );

    report.push_str("\n## Platform Breakdown\n\n");
    report.push_str("| Platform | Items | Views | View % | Engagement % |\n");
    report.push_str("|----------|-------|-------|--------|---------------|\n");
    for bucket in &metrics.platform_breakdown {
        let _ = writeln!(
            report,
            "| {} | {} | {} | {:.1}% | {:.1}% |",
            bucket.platform,
            bucket.content_count,
            bucket.views,
            bucket.view_percentage,
            bucket.engagement_percentage
        );
    }

    if !built.orphans.is_empty() {
        report.push_str("\n## Unplaced Content\n\n");
        for orphan in &built.orphans {
            let _ = writeln!(report, "- {} ({})", orphan.title, orphan.platform);
        }
    }

    report
}
