//! Structural and Aggregation Invariant Tests
//!
//! Property tests over randomly shaped families. Assembly discipline, path
//! arithmetic, aggregation totals, percentage closure, and collapse
//! filtering have to hold for every tree, not just the handcrafted
//! fixtures in the unit tests.

use chrono::Utc;
use engagerr_content_graph::aggregate::{BuiltFamily, FamilyBuilder};
use engagerr_content_graph::identifiers::{ContentId, CreatorId};
use engagerr_content_graph::projections::{
    AggregateMetrics, GraphData, GraphDataOptions, MAX_NODE_SIZE, MIN_NODE_SIZE,
};
use engagerr_content_graph::value_objects::{
    Confidence, ContentItem, ContentMetrics, ContentRelationship, ContentType, CreationMethod,
    PlatformType, RelationshipType,
};
use proptest::prelude::*;
use std::collections::HashSet;

#[cfg(test)]
mod tests {
    use super::*;

    /// Shape and performance of one family member: which earlier node it
    /// hangs under, where it was published, and how it performed.
    #[derive(Debug, Clone)]
    struct NodeSeed {
        parent_choice: usize,
        platform: PlatformType,
        views: u64,
        likes: u64,
        comments: u64,
        shares: u64,
    }

    fn arb_platform() -> impl Strategy<Value = PlatformType> {
        prop::sample::select(vec![
            PlatformType::Youtube,
            PlatformType::Instagram,
            PlatformType::Tiktok,
            PlatformType::Twitter,
            PlatformType::Linkedin,
            PlatformType::Podcast,
            PlatformType::Blog,
        ])
    }

    fn arb_seed() -> impl Strategy<Value = NodeSeed> {
        (
            any::<usize>(),
            arb_platform(),
            0u64..500_000,
            0u64..10_000,
            0u64..5_000,
            0u64..2_000,
        )
            .prop_map(
                |(parent_choice, platform, views, likes, comments, shares)| NodeSeed {
                    parent_choice,
                    platform,
                    views,
                    likes,
                    comments,
                    shares,
                },
            )
    }

    /// Seeds for a whole family. Node 0 is the root and every later node
    /// parents onto an earlier one, so assembly always yields one tree.
    fn arb_family(max: usize) -> impl Strategy<Value = Vec<NodeSeed>> {
        prop::collection::vec(arb_seed(), 1..=max)
    }

    fn assemble(seeds: &[NodeSeed]) -> (BuiltFamily, Vec<ContentId>) {
        let creator = CreatorId::new();
        let ids: Vec<ContentId> = seeds.iter().map(|_| ContentId::new()).collect();
        let items = seeds.iter().zip(&ids).map(|(seed, &id)| {
            ContentItem::new(
                id,
                creator,
                seed.platform,
                ContentType::Video,
                "member",
                Utc::now(),
            )
            .with_metrics(ContentMetrics {
                views: seed.views,
                likes: seed.likes,
                comments: seed.comments,
                shares: seed.shares,
                engagement_rate: 0.0,
                estimated_value: seed.views as f64 * 0.01,
            })
        });
        let edges = seeds.iter().enumerate().skip(1).map(|(index, seed)| {
            ContentRelationship::new(
                ids[seed.parent_choice % index],
                ids[index],
                RelationshipType::Parent,
                Confidence::FULL,
                CreationMethod::SystemDetected,
            )
        });
        let built = FamilyBuilder::new(ids[0])
            .with_items(items)
            .with_relationships(edges)
            .build()
            .unwrap();
        (built, ids)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        /// Property: every generated tree assembles completely, and each
        /// node's path is a strict extension of its parent's path.
        #[test]
        fn prop_random_trees_assemble_with_path_discipline(seeds in arb_family(24)) {
            let (built, ids) = assemble(&seeds);

            prop_assert!(built.orphans.is_empty());
            prop_assert!(built.dangling_edges.is_empty());
            prop_assert_eq!(built.family.len(), seeds.len());
            prop_assert_eq!(built.family.root_id(), ids[0]);
            prop_assert_eq!(built.family.root().depth, 0);

            for member in built.family.nodes() {
                prop_assert_eq!(member.path.depth(), member.depth);
                match member.parent {
                    Some(parent_id) => {
                        let parent = built.family.node(parent_id).unwrap();
                        prop_assert_eq!(member.depth, parent.depth + 1);
                        prop_assert!(parent.path.is_ancestor_of(&member.path));
                        prop_assert_eq!(
                            member.path.as_str(),
                            format!("{}.{}", parent.path.as_str(), member.id())
                        );
                    }
                    None => prop_assert_eq!(member.id(), ids[0]),
                }
            }
        }

        /// Property: aggregate totals equal the sum of member metrics, and
        /// the platform buckets partition them exactly.
        #[test]
        fn prop_aggregate_totals_equal_member_sums(seeds in arb_family(24)) {
            let (built, _) = assemble(&seeds);
            let metrics = AggregateMetrics::from_family(&built.family);

            let views: u64 = seeds.iter().map(|seed| seed.views).sum();
            let engagements: u64 = seeds
                .iter()
                .map(|seed| seed.likes + seed.comments + seed.shares)
                .sum();
            prop_assert_eq!(metrics.content_count, seeds.len());
            prop_assert_eq!(metrics.total_views, views);
            prop_assert_eq!(metrics.total_engagements, engagements);
            prop_assert_eq!(
                metrics.total_shares,
                seeds.iter().map(|seed| seed.shares).sum::<u64>()
            );
            prop_assert_eq!(
                metrics.total_comments,
                seeds.iter().map(|seed| seed.comments).sum::<u64>()
            );

            let bucket_views: u64 = metrics.platform_breakdown.iter().map(|b| b.views).sum();
            let bucket_members: usize = metrics
                .platform_breakdown
                .iter()
                .map(|b| b.content_count)
                .sum();
            prop_assert_eq!(bucket_views, views);
            prop_assert_eq!(bucket_members, seeds.len());
        }

        /// Property: per-platform percentages close to 100 whenever there
        /// are any views, and every share sits inside [0, 100].
        #[test]
        fn prop_percentage_closure(seeds in arb_family(24)) {
            let (built, _) = assemble(&seeds);
            let metrics = AggregateMetrics::from_family(&built.family);

            for bucket in &metrics.platform_breakdown {
                prop_assert!(bucket.view_percentage >= 0.0);
                prop_assert!(bucket.view_percentage <= 100.0);
            }
            if metrics.total_views > 0 {
                let sum: f64 = metrics
                    .platform_breakdown
                    .iter()
                    .map(|bucket| bucket.view_percentage)
                    .sum();
                prop_assert!((sum - 100.0).abs() < 1e-6);
            }
            if metrics.total_engagements > 0 {
                let sum: f64 = metrics
                    .platform_breakdown
                    .iter()
                    .map(|bucket| bucket.engagement_percentage)
                    .sum();
                prop_assert!((sum - 100.0).abs() < 1e-6);
            }
        }

        /// Property: a family with no recorded performance aggregates to
        /// zero everywhere instead of dividing by zero.
        #[test]
        fn prop_zero_metrics_aggregate_to_zero(seeds in arb_family(16)) {
            let muted: Vec<NodeSeed> = seeds
                .iter()
                .map(|seed| NodeSeed {
                    views: 0,
                    likes: 0,
                    comments: 0,
                    shares: 0,
                    ..seed.clone()
                })
                .collect();
            let (built, _) = assemble(&muted);
            let metrics = AggregateMetrics::from_family(&built.family);

            prop_assert_eq!(metrics.total_views, 0);
            prop_assert_eq!(metrics.overall_engagement_rate, 0.0);
            prop_assert_eq!(metrics.estimated_total_value, 0.0);
            for bucket in &metrics.platform_breakdown {
                prop_assert_eq!(bucket.view_percentage, 0.0);
                prop_assert_eq!(bucket.engagement_percentage, 0.0);
            }
        }

        /// Property: aggregating the same family twice is bit-identical.
        #[test]
        fn prop_aggregation_is_deterministic(seeds in arb_family(24)) {
            let (built, _) = assemble(&seeds);
            let first = AggregateMetrics::from_family(&built.family);
            let second = AggregateMetrics::from_family(&built.family);
            prop_assert_eq!(first, second);
        }

        /// Property: collapsing one node hides exactly its strict
        /// descendants, determined by path prefixing alone.
        #[test]
        fn prop_collapse_is_path_prefix_filtering(
            seeds in arb_family(24),
            pick in any::<usize>(),
        ) {
            let (built, ids) = assemble(&seeds);
            let collapsed = ids[pick % ids.len()];
            let collapsed_path = built.family.node(collapsed).unwrap().path.clone();

            let options = GraphDataOptions {
                collapsed: HashSet::from([collapsed]),
                ..Default::default()
            };
            let data = GraphData::from_family(&built.family, &options);

            let expected: HashSet<ContentId> = built
                .family
                .nodes()
                .filter(|member| !collapsed_path.is_ancestor_of(&member.path))
                .map(|member| member.id())
                .collect();
            let shown: HashSet<ContentId> = data.nodes.iter().map(|node| node.id).collect();
            prop_assert_eq!(&shown, &expected);
            prop_assert!(data.node(collapsed).unwrap().collapsed);

            // No edge may reference a hidden endpoint.
            for edge in &data.edges {
                prop_assert!(shown.contains(&edge.source));
                prop_assert!(shown.contains(&edge.target));
            }
            // Every parental edge between visible nodes survives, so the
            // visible subgraph stays connected: node count = edge count + 1.
            prop_assert_eq!(data.nodes.len(), data.edges.len() + 1);
        }

        /// Property: metric node sizing stays clamped and never ranks a
        /// lower-viewed node above a higher-viewed one.
        #[test]
        fn prop_metric_sizes_clamped_and_monotone(seeds in arb_family(24)) {
            let (built, _) = assemble(&seeds);
            let data = GraphData::from_family(&built.family, &GraphDataOptions::default());

            for node in &data.nodes {
                prop_assert!(node.size >= MIN_NODE_SIZE);
                prop_assert!(node.size <= MAX_NODE_SIZE);
            }
            let mut ranked: Vec<(u64, f64)> = data
                .nodes
                .iter()
                .map(|node| (node.metrics.views, node.size))
                .collect();
            ranked.sort_by_key(|(views, _)| *views);
            for pair in ranked.windows(2) {
                prop_assert!(pair[0].1 <= pair[1].1);
            }
        }
    }
}
