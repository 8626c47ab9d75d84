//! Content graph value objects
//!
//! Value objects are immutable types that represent concepts in the content
//! relationship domain. They are compared by value rather than identity and
//! encapsulate domain validation, so malformed data is rejected at the system
//! boundary instead of being trusted downstream.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

mod content;
mod path;
mod visual;

pub use content::{ContentItem, ContentMetrics, ContentRelationship, ContentSuggestion};
pub use path::HierarchicalPath;
pub use visual::{Color, Dimensions, Position2D};

/// Validation failures for value object constructors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    /// Confidence scores live in [0, 1]
    #[error("confidence {0} is outside the [0, 1] range")]
    ConfidenceOutOfRange(f64),
    /// Hierarchical paths are dot-joined and never empty
    #[error("hierarchical path segment cannot be empty")]
    EmptyPathSegment,
    /// Colors parse from `#rrggbb` hex strings
    #[error("invalid hex color: {0}")]
    InvalidHexColor(String),
}

/// Semantic label on a directed edge between two content items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    /// Source is the hierarchical parent of target
    Parent,
    /// Source is a hierarchical child of target (inverse orientation)
    Child,
    /// Target was derived from source (cut-down, excerpt, remix)
    Derivative,
    /// Target repurposes source for another platform or format
    Repurposed,
    /// Target reacts to or comments on source
    Reaction,
    /// Target merely references source
    Reference,
}

/// Whether a relationship participates in the parent/child hierarchy or only
/// annotates the family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipClass {
    /// Forms the family tree; subject to the single-parent invariant
    Parental,
    /// Extra edge inside a family; any number may target the same node
    Associative,
}

impl RelationshipType {
    /// Classify this type for invariant checking
    pub fn class(&self) -> RelationshipClass {
        match self {
            RelationshipType::Parent | RelationshipType::Child => RelationshipClass::Parental,
            RelationshipType::Derivative
            | RelationshipType::Repurposed
            | RelationshipType::Reaction
            | RelationshipType::Reference => RelationshipClass::Associative,
        }
    }

    /// True for edges that form the family tree
    pub fn is_parental(&self) -> bool {
        self.class() == RelationshipClass::Parental
    }

    /// Get the string representation of the relationship type
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::Parent => "parent",
            RelationshipType::Child => "child",
            RelationshipType::Derivative => "derivative",
            RelationshipType::Repurposed => "repurposed",
            RelationshipType::Reaction => "reaction",
            RelationshipType::Reference => "reference",
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a relationship came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreationMethod {
    /// Detected automatically during platform ingestion
    SystemDetected,
    /// Proposed by the AI classifier and approved by the creator
    AiSuggested,
    /// Entered manually by the creator
    UserDefined,
    /// Established by a platform-native link (e.g. a video description URL)
    PlatformLinked,
}

impl CreationMethod {
    /// Get the string representation of the creation method
    pub fn as_str(&self) -> &'static str {
        match self {
            CreationMethod::SystemDetected => "system_detected",
            CreationMethod::AiSuggested => "ai_suggested",
            CreationMethod::UserDefined => "user_defined",
            CreationMethod::PlatformLinked => "platform_linked",
        }
    }
}

impl fmt::Display for CreationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Platforms a creator publishes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformType {
    Youtube,
    Instagram,
    Tiktok,
    Twitter,
    Linkedin,
    Podcast,
    Blog,
}

impl PlatformType {
    /// Get the string representation of the platform
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformType::Youtube => "youtube",
            PlatformType::Instagram => "instagram",
            PlatformType::Tiktok => "tiktok",
            PlatformType::Twitter => "twitter",
            PlatformType::Linkedin => "linkedin",
            PlatformType::Podcast => "podcast",
            PlatformType::Blog => "blog",
        }
    }

    /// Brand color used as the default node fill in visualizations
    pub fn brand_color(&self) -> Color {
        match self {
            PlatformType::Youtube => Color::rgb(0xff, 0x00, 0x00),
            PlatformType::Instagram => Color::rgb(0xe1, 0x30, 0x6c),
            PlatformType::Tiktok => Color::rgb(0x10, 0x10, 0x10),
            PlatformType::Twitter => Color::rgb(0x1d, 0xa1, 0xf2),
            PlatformType::Linkedin => Color::rgb(0x0a, 0x66, 0xc2),
            PlatformType::Podcast => Color::rgb(0x8e, 0x44, 0xad),
            PlatformType::Blog => Color::rgb(0xf3, 0x9c, 0x12),
        }
    }
}

impl fmt::Display for PlatformType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shape of a published content item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Video,
    Short,
    Clip,
    Post,
    Article,
    PodcastEpisode,
    Thread,
}

impl ContentType {
    /// Get the string representation of the content type
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Video => "video",
            ContentType::Short => "short",
            ContentType::Clip => "clip",
            ContentType::Post => "post",
            ContentType::Article => "article",
            ContentType::PodcastEpisode => "podcast_episode",
            ContentType::Thread => "thread",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classifier certainty for an AI-suggested relationship, always in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Confidence(f64);

impl Confidence {
    /// Certain (1.0)
    pub const FULL: Confidence = Confidence(1.0);
    /// No confidence at all (0.0)
    pub const ZERO: Confidence = Confidence(0.0);

    /// Create a confidence score, rejecting values outside [0, 1]
    pub fn new(value: f64) -> Result<Self, ValueError> {
        if !(0.0..=1.0).contains(&value) || value.is_nan() {
            return Err(ValueError::ConfidenceOutOfRange(value));
        }
        Ok(Self(value))
    }

    /// The raw score
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Confidence {
    type Error = ValueError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Confidence::new(value)
    }
}

impl From<Confidence> for f64 {
    fn from(confidence: Confidence) -> f64 {
        confidence.0
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
