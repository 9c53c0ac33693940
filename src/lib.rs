//! # OI Heatmap - Open-Interest Aggregation and Heatmap Mapping
//!
//! Turns a flat list of option contracts into a two-dimensional
//! (expiration x strike) grid with derived metrics, normalized intensities
//! and palette colors, ready for a heatmap rendering surface.
//!
//! ## Overview
//!
//! The pipeline is a pure function of (contracts, configuration):
//! - **Expiration classification**: near-term, weekly, monthly OPEX, LEAPS
//! - **Strike selection**: percentage band around the underlying, adaptive bucketing
//! - **Aggregation**: one pass over the chain into a flat accumulator arena
//! - **Cell metrics**: notional, net, put/call ratio, share of expiration
//! - **Normalization & color**: log compression, contrast curve, light/dark palettes
//!
//! ## Usage
//!
//! ```rust,no_run
//! use oi_heatmap::prelude::*;
//!
//! let snapshot = load_snapshot("spy.json").unwrap();
//! let config = HeatmapConfig::new(
//!     ViewType::Net,
//!     StrikeRange::Pct10,
//!     ExpirationGroup::Monthly,
//!     snapshot.underlying_price,
//! );
//!
//! let engine = HeatmapEngine::new();
//! let grid = engine.build_now(&snapshot.contracts, &config).unwrap();
//! let mapper = engine.color_mapper();
//!
//! for cell in grid.iter_cells() {
//!     let color = grid.cell_color(cell, false, &mapper);
//!     println!("{} {} {}", cell.expiration, cell.strike, color);
//! }
//! ```
//!
//! ## What This Crate Does NOT Do
//!
//! - Price options or compute Greeks
//! - Fetch market data (snapshots are read from local JSON files)
//! - Lay out or style the rendered heatmap

pub mod core;
pub mod data;
pub mod heatmap;

/// Prelude with commonly used types
pub mod prelude {
    // Core types
    pub use crate::core::{
        parse_expiration, HeatmapError, HeatmapResult, OptionContract, OptionType,
    };

    // Data
    pub use crate::data::{
        load_snapshot, parse_snapshot, save_snapshot, CacheConfig, ChainSnapshot, GridCache,
    };

    // Heatmap pipeline
    pub use crate::heatmap::{
        build_heatmap,
        build_heatmap_with_params,
        classify_expirations,
        filter_strikes,
        heatmap_color,
        normalize_signed,
        normalize_unsigned,
        summarize,
        // Config
        BucketConfig,
        ColorMapper,
        ContrastConfig,
        EngineParams,
        ExpirationConfig,
        ExpirationGroup,
        GridSummary,
        HeatmapCell,
        HeatmapConfig,
        // Engine
        HeatmapEngine,
        HeatmapGrid,
        RatioConfig,
        Rgb,
        StrikeRange,
        ValueMetric,
        ViewType,
        Viewport,
    };
}

// Re-export main types at crate root
pub use crate::core::{HeatmapError, HeatmapResult};
pub use crate::heatmap::{HeatmapConfig, HeatmapEngine, HeatmapGrid};
