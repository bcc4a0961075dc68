//! Cross-rate composition against the base pair

use config::CrossMode;

use crate::types::BidAsk;

/// Combine the base aggregation with the target pair's own aggregation.
///
/// No rounding or bounds checking is applied.
pub fn cross_rate(base: BidAsk, target: BidAsk, mode: CrossMode) -> BidAsk {
    match mode {
        CrossMode::SidePreserving => BidAsk::new(base.bid * target.bid, base.ask * target.ask),
        CrossMode::MidRate => {
            let mid = base.mid();
            BidAsk::new(mid * target.bid, mid * target.ask)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_side_preserving() {
        let result = cross_rate(
            BidAsk::new(30.0, 30.2),
            BidAsk::new(1.08, 1.09),
            CrossMode::SidePreserving,
        );

        assert!((result.bid - 32.4).abs() < EPS);
        assert!((result.ask - 32.918).abs() < EPS);
    }

    #[test]
    fn test_mid_rate_uses_base_mid_for_both_legs() {
        let result = cross_rate(BidAsk::new(30.0, 30.2), BidAsk::new(1.08, 1.09), CrossMode::MidRate);

        assert!((result.bid - 30.1 * 1.08).abs() < EPS);
        assert!((result.ask - 30.1 * 1.09).abs() < EPS);
    }

    #[test]
    fn test_modes_agree_on_zero_spread_base() {
        let base = BidAsk::new(30.0, 30.0);
        let target = BidAsk::new(1.25, 1.26);

        assert_eq!(
            cross_rate(base, target, CrossMode::SidePreserving),
            cross_rate(base, target, CrossMode::MidRate)
        );
    }
}
