//! HeatmapEngine - Main facade for the heatmap pipeline
//!
//! Runs classification, strike selection, aggregation and range tracking in
//! one call. The engine holds only its tuning parameters; every call builds a
//! fresh grid from the caller's snapshot.

use chrono::{NaiveDate, Utc};

use super::{
    aggregate, assemble_grid, classify_expirations, select_strikes, ColorMapper, EngineParams,
    HeatmapConfig, HeatmapGrid,
};
use crate::core::{HeatmapResult, OptionContract};

/// Main engine that turns an option chain into a heatmap grid
pub struct HeatmapEngine {
    params: EngineParams,
}

impl HeatmapEngine {
    /// Create an engine with default tuning
    pub fn new() -> Self {
        Self {
            params: EngineParams::default(),
        }
    }

    /// Create with custom tuning
    pub fn with_params(params: EngineParams) -> Self {
        Self { params }
    }

    /// Get current parameters
    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    /// Update parameters
    pub fn set_params(&mut self, params: EngineParams) {
        self.params = params;
    }

    /// Color mapper sharing this engine's contrast curve
    pub fn color_mapper(&self) -> ColorMapper {
        ColorMapper::with_contrast(self.params.contrast.clone())
    }

    /// Build the grid for a chain snapshot
    ///
    /// # Arguments
    /// * `contracts` - Full chain, any order
    /// * `config` - View, strike range, expiration group and underlying price
    /// * `today` - Reference date for expiration classification
    pub fn build(
        &self,
        contracts: &[OptionContract],
        config: &HeatmapConfig,
        today: NaiveDate,
    ) -> HeatmapResult<HeatmapGrid> {
        if contracts.is_empty() {
            return Ok(HeatmapGrid::empty(config.view_type, config.metric));
        }

        // Stage 1: expiration axis
        let all_expirations: Vec<NaiveDate> = contracts.iter().map(|c| c.expiration).collect();
        let expirations = classify_expirations(
            &all_expirations,
            config.expiration_group,
            today,
            &self.params.expirations,
        );

        // Stages 2-3: strike axis from contracts on included expirations
        let candidate_strikes: Vec<f64> = contracts
            .iter()
            .filter(|c| expirations.binary_search(&c.expiration).is_ok())
            .map(|c| c.strike)
            .collect();

        let range = config.effective_strike_range();
        if range != config.strike_range {
            tracing::warn!(
                "Underlying price {} is not usable for a {}% band, showing all strikes",
                config.underlying_price,
                config.strike_range.label()
            );
        }
        let selection = select_strikes(
            &candidate_strikes,
            config.underlying_price,
            range,
            &self.params.bucketing,
        )?;

        // Stages 4-5: single pass, then the rectangular grid
        let aggregation = aggregate(contracts, &expirations, &selection);
        let grid = assemble_grid(
            &aggregation,
            &expirations,
            &selection,
            config.view_type,
            config.metric,
            &self.params.ratio,
        );

        tracing::debug!(
            "Built {} from {}/{} contracts (bucket size {:?})",
            grid,
            aggregation.contracts_used,
            contracts.len(),
            grid.bucket_size
        );

        Ok(grid)
    }

    /// Build with today's UTC date as the reference
    pub fn build_now(
        &self,
        contracts: &[OptionContract],
        config: &HeatmapConfig,
    ) -> HeatmapResult<HeatmapGrid> {
        self.build(contracts, config, Utc::now().date_naive())
    }
}

impl Default for HeatmapEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function with default tuning
pub fn build_heatmap(
    contracts: &[OptionContract],
    config: &HeatmapConfig,
    today: NaiveDate,
) -> HeatmapResult<HeatmapGrid> {
    HeatmapEngine::new().build(contracts, config, today)
}

/// Convenience function with custom tuning
pub fn build_heatmap_with_params(
    contracts: &[OptionContract],
    config: &HeatmapConfig,
    today: NaiveDate,
    params: EngineParams,
) -> HeatmapResult<HeatmapGrid> {
    HeatmapEngine::with_params(params).build(contracts, config, today)
}
