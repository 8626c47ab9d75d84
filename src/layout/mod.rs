//! Graph layout algorithms
//!
//! Two ways to place family members on the canvas: a deterministic
//! hierarchical layout driven by the depth structure, and an annealing
//! force simulation for organically shaped families. Both consume
//! [`GraphData`](crate::projections::GraphData) and produce positions keyed
//! by content id; neither mutates the family.

pub mod force_directed;
pub mod hierarchical;

pub use force_directed::ForceSimulation;
pub use hierarchical::HierarchicalLayout;

use serde::{Deserialize, Serialize};

/// Which placement strategy the view runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    /// Depth layers top-down, siblings centered under their parent row
    #[default]
    Hierarchical,
    /// Spring-and-repulsion simulation stepped until it settles
    ForceDirected,
}
