//! Stage 6: Normalization and Contrast
//!
//! Raw magnitudes span several orders of magnitude, so they are log-compressed
//! before being stretched onto a visual intensity.

use super::{HeatmapCell, ValueMetric, ViewType};

/// `log10(x + 1)` for one-sided views; 0 maps to 0
pub fn normalize_unsigned(x: f64) -> f64 {
    (x.max(0.0) + 1.0).log10()
}

/// `sign(x) * log10(|x| + 1)` for the net view; antisymmetric
pub fn normalize_signed(x: f64) -> f64 {
    if x == 0.0 {
        return 0.0;
    }
    x.signum() * (x.abs() + 1.0).log10()
}

/// Contrast curve `t^k` on a 0..1 intensity, clamped to 0..1
pub fn apply_contrast(t: f64, exponent: f64) -> f64 {
    if !t.is_finite() || t <= 0.0 {
        return 0.0;
    }
    t.min(1.0).powf(exponent)
}

/// Contrast curve on a -1..1 intensity, sign preserved
pub fn apply_signed_contrast(t: f64, exponent: f64) -> f64 {
    if !t.is_finite() || t == 0.0 {
        return 0.0;
    }
    t.signum() * apply_contrast(t.abs(), exponent)
}

/// Raw (un-normalized) magnitude of a cell for a view
pub fn raw_value(cell: &HeatmapCell, view: ViewType, metric: ValueMetric) -> f64 {
    match (view, metric) {
        (ViewType::Calls, ValueMetric::OpenInterest) => cell.call_oi as f64,
        (ViewType::Puts, ValueMetric::OpenInterest) => cell.put_oi as f64,
        (ViewType::Net, ValueMetric::OpenInterest) => cell.net_oi as f64,
        (ViewType::Calls, ValueMetric::Notional) => cell.call_value,
        (ViewType::Puts, ValueMetric::Notional) => cell.put_value,
        (ViewType::Net, ValueMetric::Notional) => cell.net_value,
    }
}

/// Normalized display value of a cell: signed for net, unsigned otherwise
pub fn display_value(cell: &HeatmapCell, view: ViewType, metric: ValueMetric) -> f64 {
    let raw = raw_value(cell, view, metric);
    if view.is_signed() {
        normalize_signed(raw)
    } else {
        normalize_unsigned(raw)
    }
}
