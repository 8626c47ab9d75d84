//! Tunable configuration for the content graph
//!
//! All defaults here are product decisions, not placeholders. Callers embed
//! these structs in their own configuration files via serde and override only
//! what they need.

use serde::{Deserialize, Serialize};

/// Controls which AI suggestions are surfaced to creators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionConfig {
    /// Suggestions with confidence strictly below this are hidden unless the
    /// caller supplies an explicit per-query threshold
    pub default_confidence_threshold: f64,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            default_confidence_threshold: 0.7,
        }
    }
}

/// Zoom and interaction bounds for the interactive view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Smallest allowed scale factor
    pub min_zoom: f64,
    /// Largest allowed scale factor
    pub max_zoom: f64,
    /// Multiplicative step applied per zoom-in (and divided per zoom-out)
    pub zoom_step: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.2,
            max_zoom: 3.0,
            zoom_step: 1.2,
        }
    }
}

/// Force-directed simulation tuning
///
/// The simulation runs spring attraction along edges, pairwise repulsion
/// between all nodes, and an annealing temperature that caps per-tick
/// displacement so layouts settle instead of oscillating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Rest length of edge springs, in pixels
    pub spring_length: f64,
    /// Hooke coefficient for edge springs
    pub spring_strength: f64,
    /// Coulomb-style pairwise repulsion coefficient
    pub repulsion_strength: f64,
    /// Velocity retained per tick
    pub damping: f64,
    /// Starting displacement cap for annealing
    pub initial_temperature: f64,
    /// Temperature multiplier per tick
    pub cooling_rate: f64,
    /// Total displacement below which the layout counts as settled
    pub settle_threshold: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            spring_length: 100.0,
            spring_strength: 0.1,
            repulsion_strength: 5000.0,
            damping: 0.9,
            initial_temperature: 100.0,
            cooling_rate: 0.95,
            settle_threshold: 0.5,
        }
    }
}

/// Top-level configuration for embedding the content graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentGraphConfig {
    pub suggestions: SuggestionConfig,
    pub view: ViewConfig,
    pub simulation: SimulationConfig,
}
