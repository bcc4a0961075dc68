//! Quote context and its per-snapshot index
//!
//! A context is the read-only input of one computation: string keys of the
//! form `<feedId><CanonicalPair><Side>` (e.g. `pf1UsdtryBid`) mapped to an
//! optional value, plus the name of the pair to compute.

use common::Side;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{trace, warn};

use crate::Result;

/// Immutable input snapshot for one computation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteContext {
    calc_name: String,
    #[serde(default)]
    quotes: HashMap<String, Option<f64>>,
}

impl QuoteContext {
    pub fn new(calc_name: impl Into<String>) -> Self {
        Self {
            calc_name: calc_name.into(),
            quotes: HashMap::new(),
        }
    }

    /// Decode `{"calc_name": "...", "quotes": {"pf1UsdtryBid": 30.0, ...}}`
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Same quotes, different pair to compute
    pub fn with_calc_name(mut self, calc_name: impl Into<String>) -> Self {
        self.calc_name = calc_name.into();
        self
    }

    pub fn with_quote(mut self, key: impl Into<String>, value: f64) -> Self {
        self.insert(key, Some(value));
        self
    }

    /// Add a key whose value is null
    pub fn with_missing(mut self, key: impl Into<String>) -> Self {
        self.insert(key, None);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Option<f64>) {
        self.quotes.insert(key.into(), value);
    }

    pub fn calc_name(&self) -> &str {
        &self.calc_name
    }

    /// Value stored under `key`, if present and not null
    pub fn get(&self, key: &str) -> Option<f64> {
        self.quotes.get(key).copied().flatten()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.quotes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Build the lookup index for this snapshot
    pub fn index(&self) -> QuoteIndex<'_> {
        QuoteIndex::build(self)
    }
}

/// A context key split into its parts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuoteKey<'a> {
    pub feed: &'a str,
    pub pair: &'a str,
    pub side: Side,
}

impl<'a> QuoteKey<'a> {
    pub fn new(feed: &'a str, pair: &'a str, side: Side) -> Self {
        Self { feed, pair, side }
    }

    /// Split `<feedId><CanonicalPair><Side>`.
    ///
    /// The canonical pair starts at the last upper-case letter before the
    /// side suffix, so `TCP_PLATFORMUsdtryBid` gives feed `TCP_PLATFORM`,
    /// pair `Usdtry`. The feed id may be empty.
    pub fn parse(key: &'a str) -> Option<Self> {
        let (rest, side) = Side::strip_from_key(key)?;
        let (start, _) = rest.char_indices().rev().find(|(_, c)| c.is_uppercase())?;
        let (feed, pair) = rest.split_at(start);
        Some(Self { feed, pair, side })
    }
}

impl std::fmt::Display for QuoteKey<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.feed, self.pair, self.side.key_suffix())
    }
}

/// Feed quotes for one pair, split by side and ordered by feed id
#[derive(Debug, Default)]
struct PairQuotes<'a> {
    bid: BTreeMap<&'a str, Option<f64>>,
    ask: BTreeMap<&'a str, Option<f64>>,
}

impl<'a> PairQuotes<'a> {
    fn side(&self, side: Side) -> &BTreeMap<&'a str, Option<f64>> {
        match side {
            Side::Bid => &self.bid,
            Side::Ask => &self.ask,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut BTreeMap<&'a str, Option<f64>> {
        match side {
            Side::Bid => &mut self.bid,
            Side::Ask => &mut self.ask,
        }
    }
}

/// Structured view of a context, built once per snapshot: pair, then
/// side, then feed.
///
/// Null and non-finite values are kept as `None` so lookups can tell a
/// present-but-unusable key from an absent one.
#[derive(Debug, Default)]
pub struct QuoteIndex<'a> {
    pairs: HashMap<&'a str, PairQuotes<'a>>,
    len: usize,
}

impl<'a> QuoteIndex<'a> {
    pub fn build(context: &'a QuoteContext) -> Self {
        let mut index = Self::default();

        for (raw_key, value) in &context.quotes {
            let Some(key) = QuoteKey::parse(raw_key) else {
                trace!(key = %raw_key, "Key does not follow <feed><Pair><Side>, ignored");
                continue;
            };

            let value = match value {
                Some(v) if !v.is_finite() => {
                    warn!(key = %raw_key, value = %v, "Non-finite quote treated as missing");
                    None
                }
                other => *other,
            };

            index
                .pairs
                .entry(key.pair)
                .or_default()
                .side_mut(key.side)
                .insert(key.feed, value);
            index.len += 1;
        }

        index
    }

    /// Exact lookup. `None` if the key is absent, `Some(None)` if null.
    pub fn get(&self, feed: &str, pair: &str, side: Side) -> Option<Option<f64>> {
        self.pairs.get(pair)?.side(side).get(feed).copied()
    }

    /// Every feed quoting `pair` on `side`, sorted by feed id
    pub fn quotes_for(&self, pair: &str, side: Side) -> Vec<(&'a str, Option<f64>)> {
        self.pairs
            .get(pair)
            .map(|quotes| {
                quotes
                    .side(side)
                    .iter()
                    .map(|(feed, value)| (*feed, *value))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of parsed keys
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
