//! Viewport Summary
//!
//! Condenses the part of a grid the renderer reports as visible into a small
//! structured context object for downstream consumers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{HeatmapCell, HeatmapGrid, RatioConfig};

/// Visible region reported back by the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    /// Lowest visible strike (inclusive)
    pub strike_min: f64,
    /// Highest visible strike (inclusive)
    pub strike_max: f64,
    /// Visible expirations, `None` for all of them
    #[serde(default)]
    pub expirations: Option<Vec<NaiveDate>>,
}

impl Viewport {
    /// Viewport covering the entire grid
    pub fn full(grid: &HeatmapGrid) -> Self {
        Self {
            strike_min: grid.strikes.first().copied().unwrap_or(0.0),
            strike_max: grid.strikes.last().copied().unwrap_or(0.0),
            expirations: None,
        }
    }

    pub fn contains(&self, cell: &HeatmapCell) -> bool {
        let in_strikes = cell.strike >= self.strike_min && cell.strike <= self.strike_max;
        let in_expirations = self
            .expirations
            .as_ref()
            .map(|e| e.contains(&cell.expiration))
            .unwrap_or(true);
        in_strikes && in_expirations
    }
}

/// Open interest at a strike, summed over visible expirations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrikeConcentration {
    pub strike: f64,
    pub open_interest: u64,
}

/// Largest net imbalance in the viewport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetExtreme {
    pub expiration: NaiveDate,
    pub strike: f64,
    #[serde(rename = "netOI")]
    pub net_oi: i64,
}

/// Summary of a viewport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSummary {
    pub viewport: Viewport,
    /// Number of visible cells
    pub visible_cells: usize,
    /// Visible cells carrying open interest
    pub cells_with_data: usize,
    #[serde(rename = "callOI")]
    pub call_oi: u64,
    #[serde(rename = "putOI")]
    pub put_oi: u64,
    pub call_value: f64,
    pub put_value: f64,
    /// Same clamp rule as the cells
    pub put_call_ratio: Option<f64>,
    /// Strikes with the most call open interest, descending
    pub top_call_strikes: Vec<StrikeConcentration>,
    /// Strikes with the most put open interest, descending
    pub top_put_strikes: Vec<StrikeConcentration>,
    pub max_abs_net: Option<NetExtreme>,
}

/// Summarize the visible region of a grid
///
/// # Arguments
/// * `grid` - Grid as built by the engine
/// * `viewport` - Region reported by the renderer
/// * `top_n` - How many strikes to list per side
/// * `ratio` - Put/call clamp
pub fn summarize(
    grid: &HeatmapGrid,
    viewport: &Viewport,
    top_n: usize,
    ratio: &RatioConfig,
) -> GridSummary {
    let mut per_strike: Vec<(u64, u64)> = vec![(0, 0); grid.strikes.len()];
    let mut visible_cells = 0;
    let mut cells_with_data = 0;
    let (mut call_oi, mut put_oi) = (0u64, 0u64);
    let (mut call_value, mut put_value) = (0.0, 0.0);
    let mut max_abs_net: Option<NetExtreme> = None;

    for ((_, si), cell) in grid.cells.indexed_iter() {
        if !viewport.contains(cell) {
            continue;
        }
        visible_cells += 1;
        if !cell.has_data {
            continue;
        }
        cells_with_data += 1;

        call_oi += cell.call_oi;
        put_oi += cell.put_oi;
        call_value += cell.call_value;
        put_value += cell.put_value;
        per_strike[si].0 += cell.call_oi;
        per_strike[si].1 += cell.put_oi;

        let beats = max_abs_net
            .as_ref()
            .map(|m| cell.net_oi.unsigned_abs() > m.net_oi.unsigned_abs())
            .unwrap_or(true);
        if beats {
            max_abs_net = Some(NetExtreme {
                expiration: cell.expiration,
                strike: cell.strike,
                net_oi: cell.net_oi,
            });
        }
    }

    let top = |side: fn(&(u64, u64)) -> u64| -> Vec<StrikeConcentration> {
        let mut ranked: Vec<StrikeConcentration> = grid
            .strikes
            .iter()
            .zip(per_strike.iter())
            .filter(|(_, sums)| side(sums) > 0)
            .map(|(&strike, sums)| StrikeConcentration {
                strike,
                open_interest: side(sums),
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.open_interest
                .cmp(&a.open_interest)
                .then(a.strike.total_cmp(&b.strike))
        });
        ranked.truncate(top_n);
        ranked
    };

    GridSummary {
        viewport: viewport.clone(),
        visible_cells,
        cells_with_data,
        call_oi,
        put_oi,
        call_value,
        put_value,
        put_call_ratio: ratio.put_call_ratio(call_oi, put_oi),
        top_call_strikes: top(|s| s.0),
        top_put_strikes: top(|s| s.1),
        max_abs_net,
    }
}
