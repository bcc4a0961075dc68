//! Batch calculation over raw per-feed rates

use chrono::Utc;
use common::{canonical_pair_name, CurrencyPair, RawRate, Side};
use tracing::{debug, info, instrument};

use crate::context::{QuoteContext, QuoteKey};
use crate::error::RateEngineError;
use crate::formula::FormulaEngine;
use crate::types::{CalculatedRate, FeedSnapshot};
use crate::Result;

/// Runs the formula engine for every supported pair of a snapshot
#[derive(Debug, Clone)]
pub struct RateCalculator {
    engine: FormulaEngine,
}

impl RateCalculator {
    pub fn new(engine: FormulaEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &FormulaEngine {
        &self.engine
    }

    /// Compute every supported pair the snapshot has data for.
    ///
    /// Returns nothing when the snapshot is empty or no feed quotes the
    /// base pair. Cross pairs no feed quotes are skipped. The first
    /// engine failure aborts the whole batch.
    #[instrument(skip(self, snapshot), fields(feeds = snapshot.len()))]
    pub fn calculate(&self, snapshot: &FeedSnapshot) -> Result<Vec<CalculatedRate>> {
        if snapshot.is_empty() {
            debug!("Snapshot is empty, nothing to calculate");
            return Ok(Vec::new());
        }

        let base = self.engine.base_pair();
        if feed_rates(snapshot, base).next().is_none() {
            debug!(base = %base, "No feed quotes the base pair, calculation skipped");
            return Ok(Vec::new());
        }

        let mut rates = Vec::with_capacity(self.engine.supported_pairs().len());

        for pair in self.engine.supported_pairs() {
            let is_base = pair == base;

            if !is_base && feed_rates(snapshot, pair).next().is_none() {
                debug!(pair = %pair, "No data for pair, skipped");
                continue;
            }

            let mut context = QuoteContext::new(pair.code());
            add_quotes(&mut context, snapshot, base);
            if !is_base {
                add_quotes(&mut context, snapshot, pair);
            }

            let quote = self
                .engine
                .compute(&context)
                .map_err(|source| RateEngineError::Calculation {
                    calc_name: pair.code(),
                    source: Box::new(source),
                })?;

            let rate = CalculatedRate {
                name: self.engine.published_name(pair),
                calc_name: pair.code(),
                bid: quote.bid,
                ask: quote.ask,
                timestamp: Utc::now(),
            };

            info!(
                rate = %rate.name,
                bid = rate.bid,
                ask = rate.ask,
                timestamp = %rate.timestamp,
                "Rate calculated"
            );
            rates.push(rate);
        }

        Ok(rates)
    }
}

/// Every feed's rate for `pair`, whatever casing the snapshot uses
fn feed_rates<'a>(
    snapshot: &'a FeedSnapshot,
    pair: &CurrencyPair,
) -> impl Iterator<Item = (&'a str, &'a RawRate)> {
    let canonical = pair.canonical();

    snapshot.iter().filter_map(move |(feed, rates)| {
        rates
            .iter()
            .find(|(code, _)| canonical_pair_name(code) == canonical)
            .map(|(_, rate)| (feed.as_str(), rate))
    })
}

fn add_quotes(context: &mut QuoteContext, snapshot: &FeedSnapshot, pair: &CurrencyPair) {
    let canonical = pair.canonical();

    for (feed, rate) in feed_rates(snapshot, pair) {
        for side in Side::ALL {
            let key = QuoteKey::new(feed, &canonical, side).to_string();
            context.insert(key, Some(rate.side(side)));
        }
    }
}
