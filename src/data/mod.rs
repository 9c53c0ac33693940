//! Caller-side collaborators
//!
//! Handles:
//! - Loading chain snapshots from JSON
//! - Memoizing built grids per symbol and configuration

pub mod snapshot;
pub mod cache;

pub use snapshot::*;
pub use cache::*;
