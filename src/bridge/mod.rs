//! Async-to-frame bridge
//!
//! The interactive view runs synchronously, one frame at a time, while
//! family fetches run on the async runtime. This module carries results
//! across that boundary: fetch tasks post outcomes into a bounded channel
//! and the frame loop drains it, with a generation counter guaranteeing
//! that a superseded request can never overwrite a newer one.

pub mod family_loader;

pub use family_loader::{FamilyLoader, LoadOutcome};

/// Capacity for the load outcome channel
pub(crate) const CHANNEL_CAPACITY: usize = 1000;
