//! Shared types for the rate engine

use chrono::{DateTime, SecondsFormat, Utc};
use common::RawRate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Two-way price: the engine's only output shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BidAsk {
    pub bid: f64,
    pub ask: f64,
}

impl BidAsk {
    pub fn new(bid: f64, ask: f64) -> Self {
        Self { bid, ask }
    }

    /// Midpoint of bid and ask
    pub fn mid(&self) -> f64 {
        (self.bid + self.ask) / 2.0
    }

    pub fn spread(&self) -> f64 {
        self.ask - self.bid
    }
}

/// Raw per-feed rates: feed id -> pair code -> rate
pub type FeedSnapshot = BTreeMap<String, BTreeMap<String, RawRate>>;

/// A computed rate ready to be published
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatedRate {
    /// Name the rate is published under (e.g. EURTRY)
    pub name: String,
    /// Pair that was requested from the engine (e.g. EURUSD)
    pub calc_name: String,
    pub bid: f64,
    pub ask: f64,
    pub timestamp: DateTime<Utc>,
}

impl CalculatedRate {
    pub fn quote(&self) -> BidAsk {
        BidAsk::new(self.bid, self.ask)
    }
}

/// Pipe-delimited line: `NAME|bid|ask|timestamp`
impl std::fmt::Display for CalculatedRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}",
            self.name,
            self.bid,
            self.ask,
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_mid_and_spread() {
        let quote = BidAsk::new(30.0, 30.2);
        assert!((quote.mid() - 30.1).abs() < 1e-9);
        assert!((quote.spread() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_calculated_rate_line() {
        let rate = CalculatedRate {
            name: "EURTRY".to_string(),
            calc_name: "EURUSD".to_string(),
            bid: 32.4,
            ask: 32.918,
            timestamp: Utc.with_ymd_and_hms(2025, 6, 7, 12, 30, 0).unwrap(),
        };

        assert_eq!(rate.to_string(), "EURTRY|32.4|32.918|2025-06-07T12:30:00.000Z");
        assert_eq!(rate.quote(), BidAsk::new(32.4, 32.918));
    }
}
