//! Chain snapshot loading
//!
//! Reads a symbol's option chain from JSON, the format a contract supplier
//! hands over.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{HeatmapResult, OptionContract};

/// Option chain for one symbol at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainSnapshot {
    /// Underlying symbol
    pub symbol: String,
    /// Underlying price at snapshot time
    #[serde(default)]
    pub underlying_price: f64,
    /// Every quoted contract
    pub contracts: Vec<OptionContract>,
}

impl ChainSnapshot {
    pub fn new(symbol: impl Into<String>, underlying_price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            underlying_price,
            contracts: Vec::new(),
        }
    }

    /// Total open interest across the chain
    pub fn total_open_interest(&self) -> u64 {
        self.contracts.iter().map(|c| c.open_interest).sum()
    }
}

/// Parse a snapshot from a JSON string
pub fn parse_snapshot(json: &str) -> HeatmapResult<ChainSnapshot> {
    Ok(serde_json::from_str(json)?)
}

/// Load a snapshot from a JSON file
pub fn load_snapshot(path: impl AsRef<Path>) -> HeatmapResult<ChainSnapshot> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)?;
    let snapshot = parse_snapshot(&json)?;

    tracing::info!(
        "Loaded {} contracts for {} from {:?}",
        snapshot.contracts.len(),
        snapshot.symbol,
        path
    );
    Ok(snapshot)
}

/// Write a snapshot as pretty JSON
pub fn save_snapshot(path: impl AsRef<Path>, snapshot: &ChainSnapshot) -> HeatmapResult<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::HeatmapError;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"{
        "symbol": "AAPL",
        "underlyingPrice": 150.0,
        "contracts": [
            {"strike": 150.0, "expiration": "2024-01-19", "optionType": "call",
             "bid": 5.0, "ask": 6.0, "openInterest": 2000, "volume": 120, "impliedVolatility": 0.28},
            {"strike": 150.0, "expiration": "2024-01-19", "optionType": "put",
             "bid": 3.0, "ask": 4.0, "openInterest": 1500}
        ]
    }"#;

    #[test]
    fn test_parse_snapshot() {
        let snapshot = parse_snapshot(SAMPLE).unwrap();

        assert_eq!(snapshot.symbol, "AAPL");
        assert_eq!(snapshot.contracts.len(), 2);
        assert_eq!(snapshot.total_open_interest(), 3500);
        assert_eq!(snapshot.contracts[1].volume, 0);
        assert_eq!(
            snapshot.contracts[0].expiration,
            NaiveDate::from_ymd_opt(2024, 1, 19).unwrap()
        );
    }

    #[test]
    fn test_malformed_date_is_an_error() {
        let bad = SAMPLE.replace("2024-01-19", "19/01/2024");
        match parse_snapshot(&bad) {
            Err(HeatmapError::Serialization(_)) => {}
            other => panic!("expected serialization error, got {:?}", other),
        }
    }

    #[test]
    fn test_file_operations() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("aapl.json");

        let snapshot = parse_snapshot(SAMPLE).unwrap();
        save_snapshot(&path, &snapshot).unwrap();

        let loaded = load_snapshot(&path).unwrap();
        assert_eq!(loaded, snapshot);

        let missing = load_snapshot(temp_dir.path().join("missing.json"));
        assert!(matches!(missing, Err(HeatmapError::IO(_))));
    }
}
