//! Formula dispatcher: maps a calculation name to the base aggregation or
//! a cross-rate against it.

use common::{canonical_pair_name, CurrencyPair, Side};
use config::{CrossMode, FormulaConfig};
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::aggregator::aggregate_matched;
use crate::context::{QuoteContext, QuoteIndex};
use crate::cross_rate::cross_rate;
use crate::error::RateEngineError;
use crate::matcher::KeyMatcher;
use crate::types::BidAsk;
use crate::Result;

/// What a calculation name resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalcTarget {
    /// The base pair itself
    Base,
    /// A pair quoted in the base pair's base currency
    Cross(CurrencyPair),
}

/// Stateless rate formula.
///
/// Holds only immutable settings, so one engine can serve any number of
/// concurrent `compute` calls.
#[derive(Debug, Clone)]
pub struct FormulaEngine {
    base: CurrencyPair,
    minimum_source_count: usize,
    matcher: KeyMatcher,
    cross_mode: CrossMode,
    /// Canonical name -> target
    targets: HashMap<String, CalcTarget>,
    /// Supported pairs in configuration order
    pairs: Vec<CurrencyPair>,
}

impl FormulaEngine {
    /// Engine supporting only `base_pair`, with default settings
    pub fn new(base_pair: &str) -> Result<Self> {
        let base = CurrencyPair::parse(base_pair)?;
        let mut targets = HashMap::new();
        targets.insert(base.canonical(), CalcTarget::Base);

        Ok(Self {
            minimum_source_count: config::default_minimum_source_count(),
            matcher: KeyMatcher::default(),
            cross_mode: CrossMode::default(),
            targets,
            pairs: vec![base.clone()],
            base,
        })
    }

    /// Build from the `formula` configuration section
    pub fn from_config(config: &FormulaConfig) -> Result<Self> {
        let base = CurrencyPair::parse(&config.base_pair)?;

        let mut engine = Self::new(&config.base_pair)?
            .with_minimum_source_count(config.minimum_source_count)
            .with_matcher(KeyMatcher::from_mode(config.match_mode, &config.fixed_feeds))
            .with_cross_mode(config.cross_mode);

        // keep configuration order, base included where it is listed
        engine.pairs.clear();
        for code in &config.supported_pairs {
            let pair = CurrencyPair::parse(code)?;
            if pair == base {
                if !engine.pairs.contains(&base) {
                    engine.pairs.push(base.clone());
                }
            } else {
                engine = engine.with_cross_pair(code)?;
            }
        }
        if !engine.pairs.contains(&base) {
            engine.pairs.insert(0, base);
        }

        debug!(
            base = %engine.base,
            pairs = engine.pairs.len(),
            match_mode = %engine.matcher.mode(),
            cross_mode = %engine.cross_mode,
            "Formula engine built"
        );

        Ok(engine)
    }

    /// Add a pair computed as a cross-rate.
    ///
    /// The pair must be quoted in the base pair's base currency
    /// (`EURUSD` against `USDTRY`). Adding a pair twice is a no-op.
    pub fn with_cross_pair(mut self, code: &str) -> Result<Self> {
        let pair = CurrencyPair::parse(code)?;

        if pair == self.base {
            return Ok(self);
        }
        if !pair.is_quoted_in(&self.base.base) {
            return Err(RateEngineError::Config(format!(
                "cross pair {} must be quoted in {}",
                pair, self.base.base
            )));
        }

        if !self.targets.contains_key(&pair.canonical()) {
            self.targets.insert(pair.canonical(), CalcTarget::Cross(pair.clone()));
            self.pairs.push(pair);
        }

        Ok(self)
    }

    pub fn with_minimum_source_count(mut self, count: usize) -> Self {
        self.minimum_source_count = count;
        self
    }

    pub fn with_matcher(mut self, matcher: KeyMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn with_cross_mode(mut self, mode: CrossMode) -> Self {
        self.cross_mode = mode;
        self
    }

    pub fn base_pair(&self) -> &CurrencyPair {
        &self.base
    }

    pub fn minimum_source_count(&self) -> usize {
        self.minimum_source_count
    }

    pub fn matcher(&self) -> &KeyMatcher {
        &self.matcher
    }

    pub fn cross_mode(&self) -> CrossMode {
        self.cross_mode
    }

    /// Every computable pair, in configuration order
    pub fn supported_pairs(&self) -> &[CurrencyPair] {
        &self.pairs
    }

    /// Look up a calculation name in any casing
    pub fn resolve(&self, calc_name: &str) -> Result<&CalcTarget> {
        self.targets
            .get(&canonical_pair_name(calc_name))
            .ok_or_else(|| RateEngineError::UnknownCalcName(calc_name.to_string()))
    }

    /// Name a computed pair is published under: the cross pair's base
    /// currency against the base pair's quote currency (`EURUSD` ->
    /// `EURTRY`). The base pair keeps its own code.
    pub fn published_name(&self, pair: &CurrencyPair) -> String {
        if pair == &self.base {
            self.base.code()
        } else {
            format!("{}{}", pair.base, self.base.quote)
        }
    }

    /// Compute the rate named by the context's calculation name.
    ///
    /// The name is checked first, then the base pair is aggregated, then
    /// (for a cross pair) the pair itself. Any failure aborts with no
    /// partial result.
    #[instrument(skip(self, context), fields(calc_name = %context.calc_name()))]
    pub fn compute(&self, context: &QuoteContext) -> Result<BidAsk> {
        let target = self.resolve(context.calc_name())?;
        let index = context.index();

        let base = self.aggregate_pair(&index, &self.base)?;
        debug!(bid = base.bid, ask = base.ask, "Base pair aggregated");

        match target {
            CalcTarget::Base => Ok(base),
            CalcTarget::Cross(pair) => {
                let own = self.aggregate_pair(&index, pair)?;
                let rate = cross_rate(base, own, self.cross_mode);
                debug!(pair = %pair, bid = rate.bid, ask = rate.ask, "Cross rate computed");
                Ok(rate)
            }
        }
    }

    /// Average both sides of `pair` over the matched feeds
    pub fn aggregate_pair(&self, index: &QuoteIndex<'_>, pair: &CurrencyPair) -> Result<BidAsk> {
        let canonical = pair.canonical();

        let bid = self.matcher.match_quotes(index, &canonical, Side::Bid);
        let bid = aggregate_matched(&bid, self.minimum_source_count)?;

        let ask = self.matcher.match_quotes(index, &canonical, Side::Ask);
        let ask = aggregate_matched(&ask, self.minimum_source_count)?;

        Ok(BidAsk::new(bid, ask))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use config::MatchMode;

    const EPS: f64 = 1e-9;

    fn engine() -> FormulaEngine {
        FormulaEngine::from_config(&FormulaConfig::default()).unwrap()
    }

    fn context(calc_name: &str) -> QuoteContext {
        QuoteContext::new(calc_name)
            .with_quote("pf1UsdtryBid", 29.9)
            .with_quote("pf2UsdtryBid", 30.1)
            .with_quote("pf1UsdtryAsk", 30.1)
            .with_quote("pf2UsdtryAsk", 30.3)
            .with_quote("pf1EurusdBid", 1.07)
            .with_quote("pf2EurusdBid", 1.09)
            .with_quote("pf1EurusdAsk", 1.08)
            .with_quote("pf2EurusdAsk", 1.10)
    }

    fn assert_close(actual: BidAsk, bid: f64, ask: f64) {
        assert!((actual.bid - bid).abs() < EPS, "bid {} != {}", actual.bid, bid);
        assert!((actual.ask - ask).abs() < EPS, "ask {} != {}", actual.ask, ask);
    }

    #[test]
    fn test_base_pair_returned_unchanged() {
        let result = engine().compute(&context("USDTRY")).unwrap();
        assert_close(result, 30.0, 30.2);
    }

    #[test]
    fn test_cross_pair() {
        let result = engine().compute(&context("EURUSD")).unwrap();
        assert_close(result, 32.4, 32.918);
    }

    #[test]
    fn test_calc_name_is_case_insensitive() {
        let engine = engine();
        let upper = engine.compute(&context("EURUSD")).unwrap();

        for name in ["eurusd", "EurUsd", "Eurusd"] {
            assert_eq!(engine.compute(&context(name)).unwrap(), upper);
        }
    }

    #[test]
    fn test_unknown_calc_name() {
        assert_matches!(
            engine().compute(&context("AUDUSD")),
            Err(RateEngineError::UnknownCalcName(name)) if name == "AUDUSD"
        );
        assert_matches!(
            engine().compute(&context("")),
            Err(RateEngineError::UnknownCalcName(_))
        );
    }

    #[test]
    fn test_missing_base_fails_cross_request() {
        let context = QuoteContext::new("EURUSD")
            .with_quote("pf1UsdtryBid", 30.0)
            .with_quote("pf1EurusdBid", 1.08)
            .with_quote("pf2EurusdBid", 1.08)
            .with_quote("pf1EurusdAsk", 1.09)
            .with_quote("pf2EurusdAsk", 1.09);

        assert_matches!(
            engine().compute(&context),
            Err(RateEngineError::InsufficientData { pattern, required: 2, found: 1 }) if pattern == "UsdtryBid"
        );
    }

    #[test]
    fn test_missing_target_fails() {
        let context = context("GBPUSD").with_quote("pf1GbpusdBid", 1.27);

        assert_matches!(
            engine().compute(&context),
            Err(RateEngineError::InsufficientData { pattern, found: 1, .. }) if pattern == "GbpusdBid"
        );
    }

    #[test]
    fn test_null_values_excluded() {
        let context = context("USDTRY")
            .with_missing("pf3UsdtryBid")
            .with_missing("pf3UsdtryAsk");

        assert_close(engine().compute(&context).unwrap(), 30.0, 30.2);
    }

    #[test]
    fn test_fixed_keys_ignores_other_feeds() {
        let mut config = FormulaConfig::default();
        config.match_mode = MatchMode::FixedKeys;
        let engine = FormulaEngine::from_config(&config).unwrap();

        let context = context("USDTRY")
            .with_quote("pf3UsdtryBid", 100.0)
            .with_quote("pf3UsdtryAsk", 100.0);

        assert_close(engine.compute(&context).unwrap(), 30.0, 30.2);

        let suffix = FormulaEngine::from_config(&FormulaConfig::default()).unwrap();
        assert_close(
            suffix.compute(&context).unwrap(),
            (29.9 + 30.1 + 100.0) / 3.0,
            (30.1 + 30.3 + 100.0) / 3.0,
        );
    }

    #[test]
    fn test_repeated_fixed_feed_does_not_meet_minimum() {
        let mut config = FormulaConfig::default();
        config.match_mode = MatchMode::FixedKeys;
        config.fixed_feeds = vec!["pf1".to_string(), "pf1".to_string()];
        let engine = FormulaEngine::from_config(&config).unwrap();

        let context = QuoteContext::new("USDTRY")
            .with_quote("pf1UsdtryBid", 30.0)
            .with_quote("pf1UsdtryAsk", 30.2);

        assert_matches!(
            engine.compute(&context),
            Err(RateEngineError::InsufficientData { required: 2, found: 1, .. })
        );

        let direct = engine.with_matcher(KeyMatcher::FixedKeys(config.fixed_feeds.clone()));
        assert_matches!(
            direct.compute(&context),
            Err(RateEngineError::InsufficientData { required: 2, found: 1, .. })
        );
    }

    #[test]
    fn test_mid_rate_mode() {
        let engine = engine().with_cross_mode(CrossMode::MidRate);
        let result = engine.compute(&context("EURUSD")).unwrap();
        assert_close(result, 30.1 * 1.08, 30.1 * 1.09);
    }

    #[test]
    fn test_minimum_of_one() {
        let engine = engine().with_minimum_source_count(1);
        let context = QuoteContext::new("USDTRY")
            .with_quote("pf1UsdtryBid", 30.0)
            .with_quote("pf1UsdtryAsk", 30.2);

        assert_close(engine.compute(&context).unwrap(), 30.0, 30.2);
    }

    #[test]
    fn test_cross_pair_must_be_quoted_in_base_currency() {
        let engine = FormulaEngine::new("USDTRY").unwrap();

        assert!(engine.clone().with_cross_pair("DOGEUSD").is_ok());
        assert_matches!(engine.clone().with_cross_pair("EURGBP"), Err(RateEngineError::Config(_)));
        assert_matches!(engine.with_cross_pair("EUR/USD"), Err(RateEngineError::InvalidPair(_)));
    }

    #[test]
    fn test_from_config_keeps_order_and_adds_base() {
        let mut config = FormulaConfig::default();
        config.supported_pairs = vec!["GBPUSD".to_string(), "eurusd".to_string(), "EURUSD".to_string()];

        let engine = FormulaEngine::from_config(&config).unwrap();
        let codes: Vec<String> = engine.supported_pairs().iter().map(|p| p.code()).collect();

        assert_eq!(codes, vec!["USDTRY", "GBPUSD", "EURUSD"]);
        assert_eq!(engine.resolve("usdtry").unwrap(), &CalcTarget::Base);
        assert_matches!(engine.resolve("GbpUsd").unwrap(), CalcTarget::Cross(p) if p.code() == "GBPUSD");
    }

    #[test]
    fn test_from_config_rejects_bad_base() {
        let mut config = FormulaConfig::default();
        config.base_pair = "US".to_string();
        assert_matches!(FormulaEngine::from_config(&config), Err(RateEngineError::InvalidPair(_)));
    }

    #[test]
    fn test_published_name() {
        let engine = engine();
        assert_eq!(engine.published_name(&CurrencyPair::new("EUR", "USD")), "EURTRY");
        assert_eq!(engine.published_name(&CurrencyPair::new("USD", "TRY")), "USDTRY");
    }

    #[test]
    fn test_engine_shared_across_threads() {
        let engine = engine();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let engine = &engine;
                    scope.spawn(move || {
                        let name = if i % 2 == 0 { "USDTRY" } else { "EURUSD" };
                        engine.compute(&context(name))
                    })
                })
                .collect();

            for (i, handle) in handles.into_iter().enumerate() {
                let result = handle.join().unwrap().unwrap();
                if i % 2 == 0 {
                    assert_close(result, 30.0, 30.2);
                } else {
                    assert_close(result, 32.4, 32.918);
                }
            }
        });
    }
}
