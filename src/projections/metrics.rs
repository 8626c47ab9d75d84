//! Family-wide metric aggregation
//!
//! A pure bottom-up fold over a family's member metrics. The output carries
//! no timestamp and reads nothing but the family, so aggregating the same
//! family twice yields bit-identical results; percentages are stored
//! unrounded and only formatted at the presentation boundary.

use crate::aggregate::ContentFamily;
use crate::identifiers::ContentId;
use crate::value_objects::PlatformType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One platform's share of a family's performance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformBreakdown {
    pub platform: PlatformType,
    /// Number of family members published on this platform
    pub content_count: usize,
    pub views: u64,
    pub engagements: u64,
    pub estimated_value: f64,
    /// Share of family views on the 0-100 scale, unrounded
    pub view_percentage: f64,
    /// Share of family engagements on the 0-100 scale, unrounded
    pub engagement_percentage: f64,
}

/// Rolled-up performance totals across an entire content family
///
/// Derived, never persisted independently: recompute from the family after
/// any structural or metric change instead of patching increments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateMetrics {
    pub root_id: ContentId,
    pub content_count: usize,
    pub total_views: u64,
    pub total_engagements: u64,
    pub total_shares: u64,
    pub total_comments: u64,
    /// Family engagements divided by family views; 0 when there are no views
    pub overall_engagement_rate: f64,
    pub estimated_total_value: f64,
    /// Per-platform buckets in first-seen node order, root's platform first
    pub platform_breakdown: Vec<PlatformBreakdown>,
}

#[derive(Default)]
struct PlatformBucket {
    content_count: usize,
    views: u64,
    engagements: u64,
    estimated_value: f64,
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

impl AggregateMetrics {
    /// Fold a family's member metrics into aggregate totals
    ///
    /// Members without a metrics snapshot count as zero everywhere.
    pub fn from_family(family: &ContentFamily) -> Self {
        let mut total_views = 0u64;
        let mut total_engagements = 0u64;
        let mut total_shares = 0u64;
        let mut total_comments = 0u64;
        let mut estimated_total_value = 0.0f64;
        let mut buckets: IndexMap<PlatformType, PlatformBucket> = IndexMap::new();

        for node in family.nodes() {
            let metrics = node.item.metrics_or_default();
            total_views += metrics.views;
            total_engagements += metrics.engagements();
            total_shares += metrics.shares;
            total_comments += metrics.comments;
            estimated_total_value += metrics.estimated_value;

            let bucket = buckets.entry(node.item.platform).or_default();
            bucket.content_count += 1;
            bucket.views += metrics.views;
            bucket.engagements += metrics.engagements();
            bucket.estimated_value += metrics.estimated_value;
        }

        let overall_engagement_rate = if total_views == 0 {
            0.0
        } else {
            total_engagements as f64 / total_views as f64
        };

        let platform_breakdown = buckets
            .into_iter()
            .map(|(platform, bucket)| PlatformBreakdown {
                platform,
                content_count: bucket.content_count,
                views: bucket.views,
                engagements: bucket.engagements,
                estimated_value: bucket.estimated_value,
                view_percentage: percentage(bucket.views, total_views),
                engagement_percentage: percentage(bucket.engagements, total_engagements),
            })
            .collect();

        Self {
            root_id: family.root_id(),
            content_count: family.len(),
            total_views,
            total_engagements,
            total_shares,
            total_comments,
            overall_engagement_rate,
            estimated_total_value,
            platform_breakdown,
        }
    }

    /// Look up the bucket for one platform
    pub fn platform(&self, platform: PlatformType) -> Option<&PlatformBreakdown> {
        self.platform_breakdown
            .iter()
            .find(|bucket| bucket.platform == platform)
    }
}

impl fmt::Display for AggregateMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} items | {} views | {} engagements | rate {:.1}% | value {:.2}",
            self.content_count,
            self.total_views,
            self.total_engagements,
            self.overall_engagement_rate * 100.0,
            self.estimated_total_value
        )?;
        for bucket in &self.platform_breakdown {
            write!(
                f,
                "\n  {}: {} views ({:.1}%)",
                bucket.platform, bucket.views, bucket.view_percentage
            )?;
        }
        Ok(())
    }
}
