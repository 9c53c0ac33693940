//! Option contract definitions
//!
//! One quoted strike/expiration/side of an option chain, as handed over by the
//! contract supplier.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::error::{HeatmapError, HeatmapResult};

/// Date format used for expirations on the wire
pub const EXPIRATION_FORMAT: &str = "%Y-%m-%d";

/// Option type (Call or Put)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl FromStr for OptionType {
    type Err = HeatmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "call" | "c" => Ok(OptionType::Call),
            "put" | "p" => Ok(OptionType::Put),
            other => Err(HeatmapError::invalid_input(format!(
                "unknown option type '{}'",
                other
            ))),
        }
    }
}

/// Parse a `YYYY-MM-DD` expiration into a calendar date
///
/// The result carries no time-of-day, so comparisons never depend on the
/// caller's timezone.
pub fn parse_expiration(s: &str) -> HeatmapResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), EXPIRATION_FORMAT)
        .map_err(|e| HeatmapError::invalid_input(format!("bad expiration '{}': {}", s, e)))
}

/// Option contract with its market snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionContract {
    /// Strike price
    pub strike: f64,
    /// Expiration date (serialized as "YYYY-MM-DD")
    pub expiration: NaiveDate,
    /// Option type (Call/Put)
    pub option_type: OptionType,
    /// Bid price, 0 when there is no bid
    #[serde(default)]
    pub bid: f64,
    /// Ask price, 0 when there is no offer
    #[serde(default)]
    pub ask: f64,
    /// Open interest
    #[serde(default)]
    pub open_interest: u64,
    /// Trading volume
    #[serde(default)]
    pub volume: u64,
    /// Implied volatility, carried through untouched
    #[serde(default)]
    pub implied_volatility: f64,
}

impl OptionContract {
    /// Create a contract with an empty quote and no open interest
    pub fn new(strike: f64, expiration: NaiveDate, option_type: OptionType) -> Self {
        Self {
            strike,
            expiration,
            option_type,
            bid: 0.0,
            ask: 0.0,
            open_interest: 0,
            volume: 0,
            implied_volatility: 0.0,
        }
    }

    /// Shorthand for a call
    pub fn call(strike: f64, expiration: NaiveDate) -> Self {
        Self::new(strike, expiration, OptionType::Call)
    }

    /// Shorthand for a put
    pub fn put(strike: f64, expiration: NaiveDate) -> Self {
        Self::new(strike, expiration, OptionType::Put)
    }

    pub fn with_quote(mut self, bid: f64, ask: f64) -> Self {
        self.bid = bid;
        self.ask = ask;
        self
    }

    pub fn with_open_interest(mut self, open_interest: u64) -> Self {
        self.open_interest = open_interest;
        self
    }

    pub fn with_volume(mut self, volume: u64) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_implied_volatility(mut self, iv: f64) -> Self {
        self.implied_volatility = iv;
        self
    }

    /// Quote midpoint, or `None` when the quote is unusable
    ///
    /// - no bid and no ask: invalid
    /// - crossed market (ask < bid, both positive): invalid
    /// - one side missing: the other side is the mid
    /// - otherwise the arithmetic mean
    pub fn mid(&self) -> Option<f64> {
        let (bid, ask) = (self.bid, self.ask);
        if bid <= 0.0 && ask <= 0.0 {
            return None;
        }
        if bid <= 0.0 {
            return Some(ask);
        }
        if ask <= 0.0 {
            return Some(bid);
        }
        if ask < bid {
            return None;
        }
        Some((bid + ask) / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exp() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 19).unwrap()
    }

    #[test]
    fn test_mid_rule() {
        let c = OptionContract::call(150.0, exp());

        assert_eq!(c.clone().with_quote(0.0, 0.0).mid(), None);
        assert_eq!(c.clone().with_quote(6.0, 5.0).mid(), None); // crossed
        assert_eq!(c.clone().with_quote(0.0, 2.5).mid(), Some(2.5));
        assert_eq!(c.clone().with_quote(1.5, 0.0).mid(), Some(1.5));
        assert_eq!(c.clone().with_quote(5.0, 6.0).mid(), Some(5.5));
        assert_eq!(c.with_quote(3.0, 3.0).mid(), Some(3.0));
    }

    #[test]
    fn test_mid_rule_is_side_independent() {
        let call = OptionContract::call(100.0, exp()).with_quote(2.0, 1.0);
        let put = OptionContract::put(100.0, exp()).with_quote(2.0, 1.0);
        assert_eq!(call.mid(), put.mid());

        let call = OptionContract::call(100.0, exp()).with_quote(1.0, 2.0);
        let put = OptionContract::put(100.0, exp()).with_quote(1.0, 2.0);
        assert_eq!(call.mid(), put.mid());
    }

    #[test]
    fn test_parse_expiration() {
        assert_eq!(parse_expiration("2024-01-19").unwrap(), exp());
        assert!(parse_expiration("2024-13-01").is_err());
        assert!(parse_expiration("01/19/2024").is_err());
    }

    #[test]
    fn test_contract_json() {
        let json = r#"{"strike":150.0,"expiration":"2024-01-19","optionType":"put",
            "bid":3.0,"ask":4.0,"openInterest":1500,"volume":20,"impliedVolatility":0.31}"#;
        let c: OptionContract = serde_json::from_str(json).unwrap();

        assert_eq!(c.expiration, exp());
        assert_eq!(c.option_type, OptionType::Put);
        assert_eq!(c.open_interest, 1500);
        assert_eq!(c.mid(), Some(3.5));

        let bad = r#"{"strike":150.0,"expiration":"2024-02-30","optionType":"put"}"#;
        assert!(serde_json::from_str::<OptionContract>(bad).is_err());
    }

    #[test]
    fn test_option_type_from_str() {
        assert_eq!("Call".parse::<OptionType>().unwrap(), OptionType::Call);
        assert_eq!("p".parse::<OptionType>().unwrap(), OptionType::Put);
        assert!("straddle".parse::<OptionType>().is_err());
    }
}
