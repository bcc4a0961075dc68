use crate::*;
use common::CurrencyPair;
use regex::Regex;
use std::collections::HashSet;
use thiserror::Error;

const PAIR_CODE_PATTERN: &str = r"^[A-Za-z]{4,10}$";
const LOG_FORMATS: [&str; 3] = ["pretty", "json", "compact"];

#[derive(Error, Debug, Clone)]
pub enum ValidationError {
    #[error("Base pair is required")]
    MissingBasePair,

    #[error("{field}: '{code}' is not a currency pair code (expected 4 to 10 letters, e.g. EURUSD)")]
    InvalidPairCode { field: String, code: String },

    #[error("At least one supported pair must be configured")]
    NoSupportedPairs,

    #[error("Cross pair '{pair}' must be quoted in {currency} to be cross-rated against the base pair")]
    CrossPairNotQuotedInBase { pair: String, currency: String },

    #[error("fixed_keys match mode requires at least one entry in fixed_feeds")]
    NoFixedFeeds,

    #[error("fixed_feeds[{index}]: feed id must not be empty")]
    EmptyFeedId { index: usize },

    #[error("Duplicate feed id '{0}' in fixed_feeds")]
    DuplicateFeedId(String),

    #[error("Environment variable placeholder left unresolved in {field}: '{value}'")]
    UnresolvedEnvVar { field: String, value: String },
}

#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct DefaultApplied {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub defaults_applied: Vec<DefaultApplied>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            defaults_applied: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationWarning {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn add_default(&mut self, field: &str, value: &str) {
        self.defaults_applied.push(DefaultApplied {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

pub fn validate_config(config: &MasterConfig) -> ValidationReport {
    let mut report = ValidationReport::new();

    validate_formula(&config.formula, &mut report);
    validate_logging(&config.logging, &mut report);

    report
}

fn validate_formula(formula: &FormulaConfig, report: &mut ValidationReport) {
    let pair_regex = match Regex::new(PAIR_CODE_PATTERN) {
        Ok(re) => re,
        Err(e) => {
            report.add_warning("formula", &format!("pair code check skipped: {}", e));
            return;
        }
    };

    check_placeholder("formula.base_pair", &formula.base_pair, report);

    let base = if formula.base_pair.trim().is_empty() {
        report.add_error(ValidationError::MissingBasePair);
        None
    } else if !pair_regex.is_match(formula.base_pair.trim()) {
        report.add_error(ValidationError::InvalidPairCode {
            field: "formula.base_pair".to_string(),
            code: formula.base_pair.clone(),
        });
        None
    } else {
        CurrencyPair::parse(&formula.base_pair).ok()
    };

    validate_supported_pairs(formula, base.as_ref(), &pair_regex, report);

    if formula.minimum_source_count == 0 {
        report.add_default("formula.minimum_source_count", "1");
    }

    validate_feeds(formula, report);
}

fn validate_supported_pairs(
    formula: &FormulaConfig,
    base: Option<&CurrencyPair>,
    pair_regex: &Regex,
    report: &mut ValidationReport,
) {
    if formula.supported_pairs.is_empty() {
        report.add_error(ValidationError::NoSupportedPairs);
        return;
    }

    let mut seen = HashSet::new();
    let mut base_listed = false;

    for (index, code) in formula.supported_pairs.iter().enumerate() {
        let field = format!("formula.supported_pairs[{}]", index);
        check_placeholder(&field, code, report);

        if !pair_regex.is_match(code.trim()) {
            report.add_error(ValidationError::InvalidPairCode {
                field,
                code: code.clone(),
            });
            continue;
        }

        let Ok(pair) = CurrencyPair::parse(code) else {
            continue;
        };

        if !seen.insert(pair.clone()) {
            report.add_warning(&field, &format!("Pair '{}' is listed more than once", pair));
            continue;
        }

        let Some(base) = base else {
            continue;
        };

        if &pair == base {
            base_listed = true;
        } else if !pair.is_quoted_in(&base.base) {
            report.add_error(ValidationError::CrossPairNotQuotedInBase {
                pair: pair.code(),
                currency: base.base.to_string(),
            });
        }
    }

    if let Some(base) = base {
        if !base_listed {
            report.add_default("formula.supported_pairs", &format!("+{}", base));
        }
    }
}

fn validate_feeds(formula: &FormulaConfig, report: &mut ValidationReport) {
    match formula.match_mode {
        MatchMode::FixedKeys => {
            if formula.fixed_feeds.is_empty() {
                report.add_error(ValidationError::NoFixedFeeds);
                return;
            }

            let mut seen = HashSet::new();
            for (index, feed) in formula.fixed_feeds.iter().enumerate() {
                check_placeholder(&format!("formula.fixed_feeds[{}]", index), feed, report);

                if feed.trim().is_empty() {
                    report.add_error(ValidationError::EmptyFeedId { index });
                } else if !seen.insert(feed.as_str()) {
                    report.add_error(ValidationError::DuplicateFeedId(feed.clone()));
                }
            }

            if formula.fixed_feeds.len() < formula.minimum_source_count {
                report.add_warning(
                    "formula.fixed_feeds",
                    &format!(
                        "Only {} fixed feeds configured but minimum_source_count is {}; every computation will fail",
                        formula.fixed_feeds.len(),
                        formula.minimum_source_count
                    ),
                );
            }
        }
        MatchMode::Suffix => {
            if formula.fixed_feeds != default_fixed_feeds() {
                report.add_warning(
                    "formula.fixed_feeds",
                    "fixed_feeds is ignored when match_mode is suffix",
                );
            }
        }
    }
}

fn validate_logging(logging: &LoggingConfig, report: &mut ValidationReport) {
    if !LOG_FORMATS.contains(&logging.format.to_lowercase().as_str()) {
        report.add_warning(
            "logging.format",
            &format!(
                "Unknown log format '{}'. Using 'pretty'. Must be one of: pretty, json, compact",
                logging.format
            ),
        );
    }
}

fn check_placeholder(field: &str, value: &str, report: &mut ValidationReport) {
    if let Ok(true) = has_unresolved_env_vars(value) {
        report.add_error(ValidationError::UnresolvedEnvVar {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
}
