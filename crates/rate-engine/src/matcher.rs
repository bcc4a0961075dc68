//! Key matching: which context entries quote a given pair and side

use common::{canonical_pair_name, Side};
use config::MatchMode;
use std::collections::HashSet;
use tracing::trace;

use crate::context::{QuoteIndex, QuoteKey};

/// Quotes selected for one pair/side
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedQuotes {
    /// Human-readable key pattern, used in error reports
    pub pattern: String,
    /// Context keys that held a usable value, sorted
    pub keys: Vec<String>,
    pub values: Vec<f64>,
}

impl MatchedQuotes {
    pub fn count(&self) -> usize {
        self.values.len()
    }
}

/// Resolves context keys for a pair and side
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum KeyMatcher {
    /// Any `<feed><Pair><Side>` key, whatever the feed
    #[default]
    Suffix,
    /// Only the listed feeds. A feed listed twice still counts once.
    FixedKeys(Vec<String>),
}

impl KeyMatcher {
    pub fn from_mode(mode: MatchMode, fixed_feeds: &[String]) -> Self {
        match mode {
            MatchMode::Suffix => Self::Suffix,
            MatchMode::FixedKeys => Self::FixedKeys(
                unique_feeds(fixed_feeds).into_iter().map(str::to_string).collect(),
            ),
        }
    }

    pub fn mode(&self) -> MatchMode {
        match self {
            Self::Suffix => MatchMode::Suffix,
            Self::FixedKeys(_) => MatchMode::FixedKeys,
        }
    }

    /// Pattern describing the keys this matcher reads, e.g. `UsdtryBid`
    /// or `{pf1,pf2}UsdtryBid`
    pub fn pattern(&self, canonical_pair: &str, side: Side) -> String {
        match self {
            Self::Suffix => format!("{}{}", canonical_pair, side.key_suffix()),
            Self::FixedKeys(feeds) => format!(
                "{{{}}}{}{}",
                unique_feeds(feeds).join(","),
                canonical_pair,
                side.key_suffix()
            ),
        }
    }

    /// Collect the usable values quoting `pair_name` on `side`.
    ///
    /// `pair_name` is canonicalized first, so `EURUSD`, `eurusd` and
    /// `EurUsd` select the same keys. Null values are skipped silently.
    pub fn match_quotes(&self, index: &QuoteIndex<'_>, pair_name: &str, side: Side) -> MatchedQuotes {
        let canonical = canonical_pair_name(pair_name);

        let candidates: Vec<(&str, Option<f64>)> = match self {
            Self::Suffix => index.quotes_for(&canonical, side),
            Self::FixedKeys(feeds) => unique_feeds(feeds)
                .into_iter()
                .filter_map(|feed| index.get(feed, &canonical, side).map(|value| (feed, value)))
                .collect(),
        };

        let mut keys = Vec::with_capacity(candidates.len());
        let mut values = Vec::with_capacity(candidates.len());

        for (feed, value) in candidates {
            let key = QuoteKey::new(feed, &canonical, side).to_string();
            match value {
                Some(v) => {
                    trace!(%key, value = v, "Matched quote");
                    keys.push(key);
                    values.push(v);
                }
                None => trace!(%key, "Null quote skipped"),
            }
        }

        MatchedQuotes {
            pattern: self.pattern(&canonical, side),
            keys,
            values,
        }
    }
}

/// Feed ids in first-seen order, duplicates dropped
fn unique_feeds(feeds: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    feeds
        .iter()
        .map(String::as_str)
        .filter(|feed| seen.insert(*feed))
        .collect()
}
