use serde::{Deserialize, Serialize};
use std::fmt;

pub mod defaults;
pub mod parser;
pub mod substitution;
pub mod validator;

pub use defaults::*;
pub use parser::*;
pub use substitution::*;
pub use validator::*;

/// Root of the YAML configuration file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MasterConfig {
    pub formula: FormulaConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Rate formula settings
///
/// Example YAML:
/// ```yaml
/// formula:
///   base_pair: USDTRY
///   minimum_source_count: 2
///   match_mode: suffix
///   cross_mode: side_preserving
///   supported_pairs: [USDTRY, EURUSD, GBPUSD]
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FormulaConfig {
    /// Pair every other pair is cross-rated against
    #[serde(default = "default_base_pair")]
    pub base_pair: String,
    /// Minimum number of feeds that must quote a pair/side (0 means one)
    #[serde(default = "default_minimum_source_count")]
    pub minimum_source_count: usize,
    #[serde(default)]
    pub match_mode: MatchMode,
    /// Feed ids used when `match_mode` is `fixed_keys`
    #[serde(default = "default_fixed_feeds")]
    pub fixed_feeds: Vec<String>,
    #[serde(default)]
    pub cross_mode: CrossMode,
    /// Pairs that may be requested; the base pair is always computable
    #[serde(default = "default_supported_pairs")]
    pub supported_pairs: Vec<String>,
}

impl Default for FormulaConfig {
    fn default() -> Self {
        Self {
            base_pair: default_base_pair(),
            minimum_source_count: default_minimum_source_count(),
            match_mode: MatchMode::default(),
            fixed_feeds: default_fixed_feeds(),
            cross_mode: CrossMode::default(),
            supported_pairs: default_supported_pairs(),
        }
    }
}

/// How context keys are matched to a pair and side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Any key ending in `<Pair><Side>`, whatever the feed prefix
    #[default]
    Suffix,
    /// Only `<feed><Pair><Side>` for the configured feeds
    FixedKeys,
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMode::Suffix => write!(f, "suffix"),
            MatchMode::FixedKeys => write!(f, "fixed_keys"),
        }
    }
}

/// How a cross-rate combines the base pair with the requested pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossMode {
    /// base.bid * pair.bid and base.ask * pair.ask
    #[default]
    SidePreserving,
    /// Base mid price multiplied into both sides of the pair
    MidRate,
}

impl fmt::Display for CrossMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrossMode::SidePreserving => write!(f, "side_preserving"),
            CrossMode::MidRate => write!(f, "mid_rate"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub level: String,
    /// pretty, json or compact
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}
