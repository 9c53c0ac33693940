//! Stages 2-3: Strike Filter and Adaptive Bucketing
//!
//! Bounds the number of strike rows regardless of how dense the chain is.

use super::{BucketConfig, StrikeRange};
use crate::core::{HeatmapError, HeatmapResult};

/// Strike axis after filtering and (maybe) bucketing
#[derive(Debug, Clone, PartialEq)]
pub struct StrikeSelection {
    /// Distinct strikes or bucket keys, ascending
    pub strikes: Vec<f64>,
    /// Bucket size when bucketing was applied
    pub bucket_size: Option<f64>,
}

impl StrikeSelection {
    /// Row key a contract strike lands on
    pub fn key_for(&self, strike: f64) -> f64 {
        match self.bucket_size {
            Some(size) => bucket_key(strike, size),
            None => strike,
        }
    }
}

/// Keep strikes inside `price ± range%`, boundaries included
///
/// `All` returns the input unchanged. A percentage band needs a positive
/// price; callers without one must use `All`.
pub fn filter_strikes(strikes: &[f64], price: f64, range: StrikeRange) -> HeatmapResult<Vec<f64>> {
    let Some(pct) = range.percent() else {
        return Ok(strikes.to_vec());
    };

    if !(price > 0.0 && price.is_finite()) {
        return Err(HeatmapError::invalid_input(format!(
            "strike range {}% needs a positive underlying price, got {}",
            pct, price
        )));
    }

    let band = price * f64::from(pct) / 100.0;
    let (lo, hi) = (price - band, price + band);

    Ok(strikes
        .iter()
        .copied()
        .filter(|&k| k >= lo && k <= hi)
        .collect())
}

/// Bucket width for an underlying price
///
/// Higher-priced names list wider native strike spacing.
pub fn bucket_size_for_price(price: f64) -> f64 {
    if price < 50.0 {
        1.0
    } else if price < 100.0 {
        2.5
    } else if price < 500.0 {
        5.0
    } else if price < 1000.0 {
        10.0
    } else {
        25.0
    }
}

/// Nearest bucket key for a strike
pub fn bucket_key(strike: f64, bucket_size: f64) -> f64 {
    (strike / bucket_size).round() * bucket_size
}

/// Collapse strikes onto bucket keys (distinct, ascending)
pub fn bucket_strikes(strikes: &[f64], bucket_size: f64) -> Vec<f64> {
    let keys: Vec<f64> = strikes.iter().map(|&k| bucket_key(k, bucket_size)).collect();
    sorted_unique(keys)
}

/// Sort ascending and drop duplicates
pub fn sorted_unique(mut strikes: Vec<f64>) -> Vec<f64> {
    strikes.retain(|k| k.is_finite());
    strikes.sort_by(|a, b| a.total_cmp(b));
    strikes.dedup();
    strikes
}

/// Filter to the configured band, then bucket when the result is too dense
///
/// # Arguments
/// * `strikes` - Candidate strikes, any order, duplicates allowed
/// * `price` - Underlying price (bucket size and band center)
/// * `range` - Band width; must be `All` when `price` is not positive
/// * `config` - Density threshold
pub fn select_strikes(
    strikes: &[f64],
    price: f64,
    range: StrikeRange,
    config: &BucketConfig,
) -> HeatmapResult<StrikeSelection> {
    let filtered = sorted_unique(filter_strikes(strikes, price, range)?);

    if filtered.len() <= config.density_threshold {
        return Ok(StrikeSelection {
            strikes: filtered,
            bucket_size: None,
        });
    }

    let size = bucket_size_for_price(price);
    let bucketed = bucket_strikes(&filtered, size);

    tracing::debug!(
        "Bucketed {} strikes into {} rows of width {}",
        filtered.len(),
        bucketed.len(),
        size
    );

    Ok(StrikeSelection {
        strikes: bucketed,
        bucket_size: Some(size),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ladder(from: i32, to: i32, step: f64) -> Vec<f64> {
        let n = ((to - from) as f64 / step).round() as i32;
        (0..=n).map(|i| from as f64 + i as f64 * step).collect()
    }

    #[test]
    fn test_ten_percent_band() {
        let strikes = ladder(100, 200, 10.0);
        let out = filter_strikes(&strikes, 150.0, StrikeRange::Pct10).unwrap();
        assert_eq!(out, vec![140.0, 150.0, 160.0]);
    }

    #[test]
    fn test_band_boundaries_inclusive() {
        let strikes = vec![79.0, 80.0, 100.0, 120.0, 121.0];
        let out = filter_strikes(&strikes, 100.0, StrikeRange::Pct20).unwrap();
        assert_eq!(out, vec![80.0, 100.0, 120.0]);
    }

    #[test]
    fn test_all_is_passthrough() {
        let strikes = vec![300.0, 100.0, 100.0, 200.0];
        let out = filter_strikes(&strikes, 0.0, StrikeRange::All).unwrap();
        assert_eq!(out, strikes);
    }

    #[test]
    fn test_non_positive_price_rejected() {
        let strikes = ladder(100, 200, 10.0);
        assert!(filter_strikes(&strikes, 0.0, StrikeRange::Pct10).is_err());
        assert!(filter_strikes(&strikes, -5.0, StrikeRange::Pct30).is_err());
    }

    #[test]
    fn test_bucket_size_steps() {
        assert_eq!(bucket_size_for_price(20.0), 1.0);
        assert_eq!(bucket_size_for_price(50.0), 2.5);
        assert_eq!(bucket_size_for_price(99.99), 2.5);
        assert_eq!(bucket_size_for_price(100.0), 5.0);
        assert_eq!(bucket_size_for_price(450.0), 5.0);
        assert_eq!(bucket_size_for_price(500.0), 10.0);
        assert_eq!(bucket_size_for_price(999.0), 10.0);
        assert_eq!(bucket_size_for_price(5000.0), 25.0);
    }

    #[test]
    fn test_bucket_strikes() {
        let strikes = vec![101.0, 99.0, 102.0, 103.0, 108.0, 112.4];
        assert_eq!(bucket_strikes(&strikes, 5.0), vec![100.0, 105.0, 110.0]);
    }

    #[test]
    fn test_bucketing_idempotent() {
        for size in [1.0, 2.5, 5.0, 10.0, 25.0] {
            let strikes = ladder(40, 1300, 0.5);
            let once = bucket_strikes(&strikes, size);
            let twice = bucket_strikes(&once, size);
            assert_eq!(once, twice, "bucket size {}", size);
        }
    }

    #[test]
    fn test_select_below_threshold_keeps_resolution() {
        let strikes = ladder(140, 160, 1.0); // 21 strikes
        let selection =
            select_strikes(&strikes, 150.0, StrikeRange::All, &BucketConfig::default()).unwrap();

        assert_eq!(selection.bucket_size, None);
        assert_eq!(selection.strikes.len(), 21);
        assert_eq!(selection.key_for(151.0), 151.0);
    }

    #[test]
    fn test_select_above_threshold_buckets() {
        let strikes = ladder(100, 200, 1.0); // 101 strikes
        let selection =
            select_strikes(&strikes, 150.0, StrikeRange::All, &BucketConfig::default()).unwrap();

        assert_eq!(selection.bucket_size, Some(5.0));
        assert_eq!(selection.strikes.len(), 21);
        assert_eq!(selection.key_for(151.0), 150.0);
        assert_eq!(selection.key_for(153.0), 155.0);
        assert!(selection.strikes.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_select_exactly_threshold_not_bucketed() {
        let strikes = ladder(1, 50, 1.0); // 50 strikes
        let selection =
            select_strikes(&strikes, 25.0, StrikeRange::All, &BucketConfig::default()).unwrap();
        assert_eq!(selection.bucket_size, None);
    }
}
