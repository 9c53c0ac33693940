//! Configuration for the heatmap pipeline
//!
//! `HeatmapConfig` is the per-call selection coming from the user;
//! `EngineParams` holds the tuning constants the engine is built with.

use serde::{Deserialize, Serialize};

use super::{ExpirationGroup, StrikeRange, ValueMetric, ViewType};

/// Per-call heatmap selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapConfig {
    /// Which side(s) of open interest to display
    pub view_type: ViewType,
    /// Strike band around the underlying price
    pub strike_range: StrikeRange,
    /// Expiration subset
    pub expiration_group: ExpirationGroup,
    /// Underlying price used for the strike band and bucket size
    pub underlying_price: f64,
    /// Magnitude that drives the display value
    #[serde(default)]
    pub metric: ValueMetric,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            view_type: ViewType::Net,
            strike_range: StrikeRange::Pct20,
            expiration_group: ExpirationGroup::Short,
            underlying_price: 0.0,
            metric: ValueMetric::OpenInterest,
        }
    }
}

impl HeatmapConfig {
    pub fn new(
        view_type: ViewType,
        strike_range: StrikeRange,
        expiration_group: ExpirationGroup,
        underlying_price: f64,
    ) -> Self {
        Self {
            view_type,
            strike_range,
            expiration_group,
            underlying_price,
            metric: ValueMetric::OpenInterest,
        }
    }

    pub fn with_metric(mut self, metric: ValueMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Strike range to actually apply
    ///
    /// A percentage band needs a positive price; without one the whole
    /// chain is shown.
    pub fn effective_strike_range(&self) -> StrikeRange {
        if self.underlying_price > 0.0 && self.underlying_price.is_finite() {
            self.strike_range
        } else {
            StrikeRange::All
        }
    }
}

/// Tuning constants for the pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineParams {
    /// Expiration classification
    pub expirations: ExpirationConfig,
    /// Strike bucketing
    pub bucketing: BucketConfig,
    /// Contrast curve
    pub contrast: ContrastConfig,
    /// Put/call ratio clamp
    pub ratio: RatioConfig,
}

/// Expiration classification configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpirationConfig {
    /// Number of dates kept by the `short` group
    /// Default: 10
    pub short_term_count: usize,

    /// LEAPS horizon in calendar months (strictly beyond)
    /// Default: 12
    pub leaps_horizon_months: u32,
}

impl Default for ExpirationConfig {
    fn default() -> Self {
        Self {
            short_term_count: 10,
            leaps_horizon_months: 12,
        }
    }
}

/// Strike bucketing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketConfig {
    /// Bucket only when the filtered strike count exceeds this
    /// Default: 50
    pub density_threshold: usize,
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self {
            density_threshold: 50,
        }
    }
}

/// Contrast curve exponents, `g(t) = t^k`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContrastConfig {
    /// Exponent for the sequential calls/puts scales
    /// Default: 0.75
    pub one_sided_exponent: f64,

    /// Exponent for the diverging net scale
    /// Default: 0.6
    pub net_exponent: f64,
}

impl Default for ContrastConfig {
    fn default() -> Self {
        Self {
            one_sided_exponent: 0.75,
            net_exponent: 0.6,
        }
    }
}

impl ContrastConfig {
    /// Exponent for a view type
    pub fn exponent(&self, view: ViewType) -> f64 {
        match view {
            ViewType::Net => self.net_exponent,
            ViewType::Calls | ViewType::Puts => self.one_sided_exponent,
        }
    }
}

/// Put/call ratio configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioConfig {
    /// Ceiling for the ratio, also used for "puts but no calls"
    /// Default: 99.0
    pub ceiling: f64,
}

impl Default for RatioConfig {
    fn default() -> Self {
        Self { ceiling: 99.0 }
    }
}

impl RatioConfig {
    /// Put/call ratio with the ceiling applied; `None` when the cell is empty
    pub fn put_call_ratio(&self, call_oi: u64, put_oi: u64) -> Option<f64> {
        match (call_oi, put_oi) {
            (0, 0) => None,
            (0, _) => Some(self.ceiling),
            (c, p) => Some((p as f64 / c as f64).min(self.ceiling)),
        }
    }
}
