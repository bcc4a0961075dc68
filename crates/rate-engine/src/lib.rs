//! Rate aggregation and cross-rate engine for FxRate
//!
//! Computes published bid/ask rates from quotes supplied by several
//! independent feeds:
//!
//! - [`matcher`] selects the context keys quoting a pair and side
//! - [`aggregator`] averages them under a minimum-source policy
//! - [`cross_rate`] composes a pair with the base pair
//! - [`formula`] dispatches a calculation name to base or cross
//! - [`calculator`] runs the formula for every pair of a feed snapshot
//!
//! # Example
//!
//! ```
//! use rate_engine::{FormulaEngine, QuoteContext};
//!
//! let engine = FormulaEngine::new("USDTRY")
//!     .unwrap()
//!     .with_cross_pair("EURUSD")
//!     .unwrap();
//!
//! let context = QuoteContext::new("EURUSD")
//!     .with_quote("pf1UsdtryBid", 30.0)
//!     .with_quote("pf2UsdtryBid", 30.0)
//!     .with_quote("pf1UsdtryAsk", 30.2)
//!     .with_quote("pf2UsdtryAsk", 30.2)
//!     .with_quote("pf1EurusdBid", 1.08)
//!     .with_quote("pf2EurusdBid", 1.08)
//!     .with_quote("pf1EurusdAsk", 1.09)
//!     .with_quote("pf2EurusdAsk", 1.09);
//!
//! let rate = engine.compute(&context).unwrap();
//! assert!((rate.bid - 32.4).abs() < 1e-9);
//! ```

pub mod aggregator;
pub mod calculator;
pub mod context;
pub mod cross_rate;
pub mod error;
pub mod formula;
pub mod matcher;
pub mod types;

pub use aggregator::{aggregate, aggregate_matched, effective_minimum};
pub use calculator::RateCalculator;
pub use context::{QuoteContext, QuoteIndex, QuoteKey};
pub use cross_rate::cross_rate;
pub use error::RateEngineError;
pub use formula::{CalcTarget, FormulaEngine};
pub use matcher::{KeyMatcher, MatchedQuotes};
pub use types::{BidAsk, CalculatedRate, FeedSnapshot};

/// Result type for rate engine operations
pub type Result<T> = std::result::Result<T, RateEngineError>;
