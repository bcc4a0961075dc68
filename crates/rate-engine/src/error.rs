//! Rate engine error types

use thiserror::Error;

/// Errors that can occur while computing a rate
#[derive(Error, Debug)]
pub enum RateEngineError {
    /// Fewer usable quotes than the minimum source count
    #[error("Insufficient data: at least {required} sources required for '{pattern}' (available: {found})")]
    InsufficientData {
        pattern: String,
        required: usize,
        found: usize,
    },

    /// Calculation identifier names no configured pair
    #[error("Unknown calculation name: {0}")]
    UnknownCalcName(String),

    /// Pair code could not be parsed
    #[error("Invalid currency pair: {0}")]
    InvalidPair(String),

    /// Engine settings rejected at construction
    #[error("Configuration error: {0}")]
    Config(String),

    /// A batch calculation failed for one pair
    #[error("Error calculating '{calc_name}': {source}")]
    Calculation {
        calc_name: String,
        #[source]
        source: Box<RateEngineError>,
    },

    /// Context could not be decoded
    #[error("Invalid quote context: {0}")]
    InvalidContext(String),
}

impl From<common::Error> for RateEngineError {
    fn from(err: common::Error) -> Self {
        match err {
            common::Error::InvalidInput(msg) => Self::InvalidPair(msg),
            other => Self::Config(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for RateEngineError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidContext(err.to_string())
    }
}
