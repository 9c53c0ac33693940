//! Stages 4-5: Single-Pass Aggregation and Cell Metrics
//!
//! Contracts are streamed once into a flat arena of accumulators indexed by
//! (expiration index, strike index). Axis lookups are resolved through tables
//! built before the pass, so the loop itself never allocates.

use std::collections::HashMap;

use chrono::NaiveDate;
use ndarray::Array2;

use super::{
    display_value, HeatmapCell, HeatmapGrid, RatioConfig, StrikeSelection, ValueMetric, ViewType,
};
use crate::core::{OptionContract, OptionType};

/// Running sums for one (expiration, strike) cell
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CellAccumulator {
    pub call_oi: u64,
    pub put_oi: u64,
    /// sum(mid * oi) over calls with a valid mid
    pub call_mid_weighted: f64,
    /// sum(oi) over calls with a valid mid
    pub call_oi_for_mid: u64,
    pub put_mid_weighted: f64,
    pub put_oi_for_mid: u64,
}

impl CellAccumulator {
    /// Fold one contract into the running sums
    pub fn add(&mut self, contract: &OptionContract) {
        let oi = contract.open_interest;
        let mid = contract.mid().filter(|_| oi > 0);

        match contract.option_type {
            OptionType::Call => {
                self.call_oi += oi;
                if let Some(mid) = mid {
                    self.call_mid_weighted += mid * oi as f64;
                    self.call_oi_for_mid += oi;
                }
            }
            OptionType::Put => {
                self.put_oi += oi;
                if let Some(mid) = mid {
                    self.put_mid_weighted += mid * oi as f64;
                    self.put_oi_for_mid += oi;
                }
            }
        }
    }

    /// OI-weighted call mid, 0 without any valid quote
    pub fn call_mid(&self) -> f64 {
        weighted_mid(self.call_mid_weighted, self.call_oi_for_mid)
    }

    /// OI-weighted put mid, 0 without any valid quote
    pub fn put_mid(&self) -> f64 {
        weighted_mid(self.put_mid_weighted, self.put_oi_for_mid)
    }

    pub fn has_data(&self) -> bool {
        self.call_oi > 0 || self.put_oi > 0
    }
}

fn weighted_mid(weighted_sum: f64, oi: u64) -> f64 {
    if oi > 0 {
        weighted_sum / oi as f64
    } else {
        0.0
    }
}

/// Raw output of the aggregation pass
#[derive(Debug, Clone)]
pub struct Aggregation {
    n_expirations: usize,
    n_strikes: usize,
    /// Row-major accumulators, `expiration_idx * n_strikes + strike_idx`
    accumulators: Vec<CellAccumulator>,
    /// Open interest per expiration over contracts that passed the filters
    pub expiration_totals: Vec<u64>,
    /// Open interest over all contracts that passed the filters
    pub total_oi: u64,
    /// Number of contracts that passed the filters
    pub contracts_used: usize,
}

impl Aggregation {
    /// Accumulator at an axis position
    pub fn get(&self, expiration_idx: usize, strike_idx: usize) -> Option<&CellAccumulator> {
        if expiration_idx >= self.n_expirations || strike_idx >= self.n_strikes {
            return None;
        }
        self.accumulators
            .get(expiration_idx * self.n_strikes + strike_idx)
    }

    /// Axis sizes (expirations, strikes)
    pub fn shape(&self) -> (usize, usize) {
        (self.n_expirations, self.n_strikes)
    }
}

/// Hashable identity of a strike key; folds -0.0 into 0.0
fn strike_bits(strike: f64) -> u64 {
    (strike + 0.0).to_bits()
}

/// Stream the chain once into per-cell accumulators
///
/// # Arguments
/// * `contracts` - Full chain snapshot
/// * `expirations` - Included expirations (axis order)
/// * `selection` - Included strike keys and the bucket size, if any
pub fn aggregate(
    contracts: &[OptionContract],
    expirations: &[NaiveDate],
    selection: &StrikeSelection,
) -> Aggregation {
    let n_expirations = expirations.len();
    let n_strikes = selection.strikes.len();

    let expiration_index: HashMap<NaiveDate, usize> = expirations
        .iter()
        .enumerate()
        .map(|(i, &d)| (d, i))
        .collect();
    let strike_index: HashMap<u64, usize> = selection
        .strikes
        .iter()
        .enumerate()
        .map(|(i, &k)| (strike_bits(k), i))
        .collect();

    let mut accumulators = vec![CellAccumulator::default(); n_expirations * n_strikes];
    let mut expiration_totals = vec![0u64; n_expirations];
    let mut total_oi = 0u64;
    let mut contracts_used = 0usize;

    for contract in contracts {
        let Some(&ei) = expiration_index.get(&contract.expiration) else {
            continue;
        };
        let key = selection.key_for(contract.strike);
        let Some(&si) = strike_index.get(&strike_bits(key)) else {
            continue;
        };

        accumulators[ei * n_strikes + si].add(contract);
        expiration_totals[ei] += contract.open_interest;
        total_oi += contract.open_interest;
        contracts_used += 1;
    }

    Aggregation {
        n_expirations,
        n_strikes,
        accumulators,
        expiration_totals,
        total_oi,
        contracts_used,
    }
}

/// Derive the display metrics of one cell
pub fn derive_cell(
    expiration: NaiveDate,
    strike: f64,
    acc: &CellAccumulator,
    expiration_total: u64,
    ratio: &RatioConfig,
) -> HeatmapCell {
    if !acc.has_data() {
        return HeatmapCell::empty(expiration, strike);
    }

    let call_mid = acc.call_mid();
    let put_mid = acc.put_mid();
    let call_value = acc.call_oi as f64 * call_mid;
    let put_value = acc.put_oi as f64 * put_mid;
    let pct_of_exp_total = if expiration_total > 0 {
        (acc.call_oi + acc.put_oi) as f64 / expiration_total as f64 * 100.0
    } else {
        0.0
    };

    HeatmapCell {
        expiration,
        strike,
        call_oi: acc.call_oi,
        put_oi: acc.put_oi,
        net_oi: acc.call_oi as i64 - acc.put_oi as i64,
        call_mid,
        put_mid,
        call_value,
        put_value,
        net_value: call_value - put_value,
        put_call_ratio: ratio.put_call_ratio(acc.call_oi, acc.put_oi),
        pct_of_exp_total,
        has_data: true,
    }
}

/// Build the full rectangular grid from an aggregation
///
/// Every (expiration, strike) pair gets a cell, zero-valued when no contract
/// landed there. `min_value`/`max_value` span the display values of cells
/// with data and are both 0 when there are none.
pub fn assemble_grid(
    aggregation: &Aggregation,
    expirations: &[NaiveDate],
    selection: &StrikeSelection,
    view_type: ViewType,
    metric: ValueMetric,
    ratio: &RatioConfig,
) -> HeatmapGrid {
    let (n_exp, n_strikes) = (expirations.len(), selection.strikes.len());
    let empty = CellAccumulator::default();

    let mut range: Option<(f64, f64)> = None;
    let cells = Array2::from_shape_fn((n_exp, n_strikes), |(ei, si)| {
        let acc = aggregation.get(ei, si).unwrap_or(&empty);
        let total = aggregation.expiration_totals.get(ei).copied().unwrap_or(0);
        let cell = derive_cell(expirations[ei], selection.strikes[si], acc, total, ratio);

        if cell.has_data {
            let v = display_value(&cell, view_type, metric);
            range = Some(match range {
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
                None => (v, v),
            });
        }
        cell
    });
    let (min_value, max_value) = range.unwrap_or((0.0, 0.0));

    HeatmapGrid {
        expirations: expirations.to_vec(),
        strikes: selection.strikes.clone(),
        cells,
        expiration_totals: aggregation.expiration_totals.clone(),
        min_value,
        max_value,
        total_oi: aggregation.total_oi,
        bucket_size: selection.bucket_size,
        view_type,
        metric,
    }
}
