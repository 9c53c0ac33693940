//! Open-Interest Heatmap Pipeline
//!
//! Turns a flat option chain into an (expiration, strike) grid ready for a
//! heatmap surface.
//!
//! Stages:
//! 1. **Expiration classification**: near-term, Fridays, OPEX, LEAPS or everything
//! 2. **Strike filter**: percentage band around the underlying price
//! 3. **Adaptive bucketing**: coarser strike rows for dense chains
//! 4. **Single-pass aggregation**: per-cell call/put OI and OI-weighted mids
//! 5. **Cell metrics**: notional, net, put/call ratio, share of expiration
//! 6. **Normalization**: log compression plus contrast curve
//! 7. **Color mapping**: sequential or diverging palettes, light and dark

mod aggregation;
mod color;
mod config;
mod engine;
mod expiration;
mod normalize;
mod strikes;
mod summary;

pub use aggregation::*;
pub use color::*;
pub use config::*;
pub use engine::*;
pub use expiration::*;
pub use normalize::*;
pub use strikes::*;
pub use summary::*;

use chrono::NaiveDate;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::HeatmapError;

/// Which side(s) of open interest the heatmap shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewType {
    /// Call open interest, sequential green scale
    Calls,
    /// Put open interest, sequential red scale
    Puts,
    /// Calls minus puts, diverging scale
    Net,
}

impl ViewType {
    pub fn label(&self) -> &'static str {
        match self {
            ViewType::Calls => "calls",
            ViewType::Puts => "puts",
            ViewType::Net => "net",
        }
    }

    /// Diverging (signed) scale?
    pub fn is_signed(&self) -> bool {
        matches!(self, ViewType::Net)
    }
}

impl FromStr for ViewType {
    type Err = HeatmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "calls" => Ok(ViewType::Calls),
            "puts" => Ok(ViewType::Puts),
            "net" => Ok(ViewType::Net),
            other => Err(HeatmapError::invalid_input(format!("unknown view '{}'", other))),
        }
    }
}

/// Strike band around the underlying price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrikeRange {
    #[serde(rename = "10")]
    Pct10,
    #[serde(rename = "20")]
    Pct20,
    #[serde(rename = "30")]
    Pct30,
    #[serde(rename = "all")]
    All,
}

impl StrikeRange {
    /// Band width in percent, `None` for unrestricted
    pub fn percent(&self) -> Option<u32> {
        match self {
            StrikeRange::Pct10 => Some(10),
            StrikeRange::Pct20 => Some(20),
            StrikeRange::Pct30 => Some(30),
            StrikeRange::All => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StrikeRange::Pct10 => "10",
            StrikeRange::Pct20 => "20",
            StrikeRange::Pct30 => "30",
            StrikeRange::All => "all",
        }
    }
}

impl FromStr for StrikeRange {
    type Err = HeatmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_end_matches('%').to_ascii_lowercase().as_str() {
            "10" => Ok(StrikeRange::Pct10),
            "20" => Ok(StrikeRange::Pct20),
            "30" => Ok(StrikeRange::Pct30),
            "all" => Ok(StrikeRange::All),
            other => Err(HeatmapError::invalid_input(format!(
                "unknown strike range '{}'",
                other
            ))),
        }
    }
}

/// Expiration subset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpirationGroup {
    /// First N upcoming dates
    Short,
    /// Every Friday
    Weekly,
    /// Third Friday of the month (OPEX)
    Monthly,
    /// Beyond the LEAPS horizon
    Leaps,
    /// Everything not yet expired
    All,
}

impl ExpirationGroup {
    pub fn label(&self) -> &'static str {
        match self {
            ExpirationGroup::Short => "short",
            ExpirationGroup::Weekly => "weekly",
            ExpirationGroup::Monthly => "monthly",
            ExpirationGroup::Leaps => "leaps",
            ExpirationGroup::All => "all",
        }
    }
}

impl FromStr for ExpirationGroup {
    type Err = HeatmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "short" => Ok(ExpirationGroup::Short),
            "weekly" => Ok(ExpirationGroup::Weekly),
            "monthly" => Ok(ExpirationGroup::Monthly),
            "leaps" => Ok(ExpirationGroup::Leaps),
            "all" => Ok(ExpirationGroup::All),
            other => Err(HeatmapError::invalid_input(format!(
                "unknown expiration group '{}'",
                other
            ))),
        }
    }
}

/// Magnitude behind the display value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueMetric {
    /// Contract counts
    #[default]
    OpenInterest,
    /// Open interest times OI-weighted mid
    Notional,
}

/// One (expiration, strike) cell of the grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapCell {
    pub expiration: NaiveDate,
    pub strike: f64,
    #[serde(rename = "callOI")]
    pub call_oi: u64,
    #[serde(rename = "putOI")]
    pub put_oi: u64,
    #[serde(rename = "netOI")]
    pub net_oi: i64,
    pub call_mid: f64,
    pub put_mid: f64,
    pub call_value: f64,
    pub put_value: f64,
    pub net_value: f64,
    /// `None` only when the cell has no open interest at all
    pub put_call_ratio: Option<f64>,
    pub pct_of_exp_total: f64,
    pub has_data: bool,
}

impl HeatmapCell {
    /// Zero-valued cell for a pair with no contracts
    pub fn empty(expiration: NaiveDate, strike: f64) -> Self {
        Self {
            expiration,
            strike,
            call_oi: 0,
            put_oi: 0,
            net_oi: 0,
            call_mid: 0.0,
            put_mid: 0.0,
            call_value: 0.0,
            put_value: 0.0,
            net_value: 0.0,
            put_call_ratio: None,
            pct_of_exp_total: 0.0,
            has_data: false,
        }
    }

    /// Open interest on both sides
    pub fn total_oi(&self) -> u64 {
        self.call_oi + self.put_oi
    }
}

/// Output of the pipeline: a rectangular (expiration x strike) grid
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapGrid {
    /// Included expirations, ascending
    pub expirations: Vec<NaiveDate>,
    /// Included strikes (post-filter, post-bucket), ascending
    pub strikes: Vec<f64>,
    /// Cells indexed `[expiration, strike]`
    pub cells: Array2<HeatmapCell>,
    /// Open interest per expiration over the filtered contracts
    pub expiration_totals: Vec<u64>,
    /// Lowest display value among cells with data
    pub min_value: f64,
    /// Highest display value among cells with data
    pub max_value: f64,
    /// Open interest of every contract that passed the filters
    #[serde(rename = "totalOI")]
    pub total_oi: u64,
    /// Bucket size when strikes were bucketed
    pub bucket_size: Option<f64>,
    /// View the display range was computed for
    pub view_type: ViewType,
    /// Metric the display range was computed for
    pub metric: ValueMetric,
}

impl HeatmapGrid {
    /// Grid with no axes
    pub fn empty(view_type: ViewType, metric: ValueMetric) -> Self {
        Self {
            expirations: Vec::new(),
            strikes: Vec::new(),
            cells: Array2::from_shape_fn((0, 0), |_| HeatmapCell::empty(NaiveDate::MIN, 0.0)),
            expiration_totals: Vec::new(),
            min_value: 0.0,
            max_value: 0.0,
            total_oi: 0,
            bucket_size: None,
            view_type,
            metric,
        }
    }

    /// Number of cells (always expirations x strikes)
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// No axes at all?
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Index of an expiration on the axis
    pub fn expiration_index(&self, expiration: NaiveDate) -> Option<usize> {
        self.expirations.binary_search(&expiration).ok()
    }

    /// Index of a strike on the axis
    pub fn strike_index(&self, strike: f64) -> Option<usize> {
        self.strikes
            .binary_search_by(|probe| probe.total_cmp(&strike))
            .ok()
    }

    /// Cell by axis position
    pub fn cell_at(&self, expiration_idx: usize, strike_idx: usize) -> Option<&HeatmapCell> {
        self.cells.get((expiration_idx, strike_idx))
    }

    /// Cell by (expiration, strike) key
    pub fn cell(&self, expiration: NaiveDate, strike: f64) -> Option<&HeatmapCell> {
        let ei = self.expiration_index(expiration)?;
        let si = self.strike_index(strike)?;
        self.cell_at(ei, si)
    }

    /// All cells in row-major (expiration, strike) order
    pub fn iter_cells(&self) -> impl Iterator<Item = &HeatmapCell> {
        self.cells.iter()
    }

    /// Normalized value used for coloring a cell
    pub fn display_value(&self, cell: &HeatmapCell) -> f64 {
        display_value(cell, self.view_type, self.metric)
    }

    /// Color of a cell under the grid's own display range
    pub fn cell_color(&self, cell: &HeatmapCell, dark_mode: bool, mapper: &ColorMapper) -> Rgb {
        mapper.color(
            self.display_value(cell),
            self.min_value,
            self.max_value,
            self.view_type,
            dark_mode,
        )
    }
}

impl fmt::Display for HeatmapGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HeatmapGrid({} view, {} expirations x {} strikes, totalOI={}, range=[{:.3}, {:.3}])",
            self.view_type.label(),
            self.expirations.len(),
            self.strikes.len(),
            self.total_oi,
            self.min_value,
            self.max_value
        )
    }
}
