//! Common types used across FxRate
//!
//! This module provides the fundamental domain types shared by the
//! configuration layer, the rate engine and the binary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Length of an ISO 4217 currency code
pub const CURRENCY_CODE_LEN: usize = 3;

/// Longest pair code accepted (e.g. "DOGEUSD" plus some headroom)
pub const MAX_PAIR_CODE_LEN: usize = 10;

/// Quote side (bid or ask)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Price a market maker pays
    Bid,
    /// Price a market maker asks
    Ask,
}

impl Side {
    /// Both sides, bid first
    pub const ALL: [Side; 2] = [Side::Bid, Side::Ask];

    /// Suffix used for this side in context keys
    pub fn key_suffix(&self) -> &'static str {
        match self {
            Side::Bid => "Bid",
            Side::Ask => "Ask",
        }
    }

    /// Parse the trailing side suffix of a context key.
    ///
    /// Returns the side together with the remainder of the key.
    pub fn strip_from_key(key: &str) -> Option<(&str, Side)> {
        Side::ALL.iter().find_map(|side| {
            key.strip_suffix(side.key_suffix())
                .map(|rest| (rest, *side))
        })
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Bid => write!(f, "bid"),
            Side::Ask => write!(f, "ask"),
        }
    }
}

/// Currency symbol (e.g., "USD", "TRY")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol(pub String);

impl Symbol {
    /// Create a new Symbol
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().to_uppercase())
    }

    /// Get the symbol as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Currency pair (e.g., "USDTRY", "EURUSD")
///
/// The quote currency is always the last three letters of the code, so
/// "DOGEUSD" splits into DOGE / USD.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CurrencyPair {
    /// Base currency (e.g., EUR in EURUSD)
    pub base: Symbol,
    /// Quote currency (e.g., USD in EURUSD)
    pub quote: Symbol,
}

impl CurrencyPair {
    /// Create a new currency pair
    pub fn new(base: impl Into<Symbol>, quote: impl Into<Symbol>) -> Self {
        Self {
            base: base.into(),
            quote: quote.into(),
        }
    }

    /// Parse a pair code in any casing ("EURUSD", "eurusd", "EurUsd")
    pub fn parse(code: &str) -> Result<Self> {
        let code = code.trim();
        let len = code.chars().count();

        if !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(Error::invalid_input(format!(
                "currency pair '{}' must contain letters only",
                code
            )));
        }

        if len <= CURRENCY_CODE_LEN || len > MAX_PAIR_CODE_LEN {
            return Err(Error::invalid_input(format!(
                "currency pair '{}' must be {} to {} letters long",
                code,
                CURRENCY_CODE_LEN + 1,
                MAX_PAIR_CODE_LEN
            )));
        }

        // ASCII only past this point, byte indexing is safe
        let (base, quote) = code.split_at(len - CURRENCY_CODE_LEN);
        Ok(Self::new(base, quote))
    }

    /// Upper-case pair code (e.g., "EURUSD")
    pub fn code(&self) -> String {
        format!("{}{}", self.base, self.quote)
    }

    /// Capitalized form used in context keys ("EURUSD" -> "Eurusd")
    pub fn canonical(&self) -> String {
        canonical_pair_name(&self.code())
    }

    /// Returns true if this pair is quoted in the given currency
    pub fn is_quoted_in(&self, currency: &Symbol) -> bool {
        &self.quote == currency
    }
}

impl std::fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.base, self.quote)
    }
}

impl std::str::FromStr for CurrencyPair {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Fold a pair name into the capitalized key form: first letter upper
/// case, the rest lower case.
pub fn canonical_pair_name(name: &str) -> String {
    let mut chars = name.trim().chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// One feed's raw two-way quote for a single pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawRate {
    pub bid: f64,
    pub ask: f64,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl RawRate {
    /// Create a raw rate stamped with the current time
    pub fn new(bid: f64, ask: f64) -> Self {
        Self {
            bid,
            ask,
            timestamp: Utc::now(),
        }
    }

    /// Price on the given side
    pub fn side(&self, side: Side) -> f64 {
        match side {
            Side::Bid => self.bid,
            Side::Ask => self.ask,
        }
    }
}
