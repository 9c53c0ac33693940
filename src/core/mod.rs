//! Core data types for the open-interest heatmap
//!
//! Defines fundamental types:
//! - OptionContract: Strike, expiration, side, quote, open interest
//! - HeatmapError: Error taxonomy for parsing and loading

pub mod option;
pub mod error;

pub use option::*;
pub use error::*;
