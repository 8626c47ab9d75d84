//! Content relationship graph domain for the Engagerr platform
//!
//! Creators publish a piece of content once and watch it echo across
//! platforms as clips, reactions, and reposts. This crate models those
//! echoes as a rooted content family: building the family from relationship
//! edges, aggregating metrics across it, reviewing machine-suggested
//! relationships, and projecting the result into an interactive graph view.

pub mod aggregate;
pub mod bridge;
pub mod commands;
pub mod config;
pub mod domain_events;
pub mod events;
pub mod handlers;
pub mod identifiers;
pub mod infrastructure;
pub mod layout;
pub mod projections;
pub mod queries;
pub mod renderer;
pub mod value_objects;

// Re-export main types
pub use aggregate::*;
pub use events::*;
pub use domain_events::*;

// Re-export commands and their types
pub use commands::{CommandError, CommandResult, NewRelationship, RelationshipCommand};

// Re-export query types
pub use queries::{
    FamilyInfo, FamilyQueryError, FamilyQueryHandler, FamilyQueryHandlerImpl, FamilyQueryResult,
    NodeDetail,
};

// Re-export command handlers and the suggestion engine
pub use handlers::{RelationshipCommandHandler, RelationshipCommandHandlerImpl, SuggestionEngine};

// Re-export the service boundary
pub use infrastructure::{
    ContentRelationshipService, FamilySnapshot, FetchError, InMemoryRelationshipService,
    RestRelationshipService,
};

// Re-export value objects
pub use value_objects::{
    Confidence, ContentItem, ContentMetrics, ContentRelationship, ContentSuggestion, ContentType,
    CreationMethod, HierarchicalPath, PlatformType, RelationshipClass, RelationshipType,
};

// Re-export projections
pub use projections::{AggregateMetrics, ContentProjection, FamilySummaryProjection, GraphData};

// Re-export the interactive view and its loader
pub use bridge::{FamilyLoader, LoadOutcome};
pub use layout::{ForceSimulation, HierarchicalLayout, LayoutMode};
pub use renderer::{FamilyView, Interaction, ViewEvent, ViewPhase};

// Re-export identifiers and configuration
pub use config::ContentGraphConfig;
pub use identifiers::{ContentId, CreatorId, RelationshipId, SuggestionId};
