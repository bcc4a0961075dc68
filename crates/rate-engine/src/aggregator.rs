//! Averaging of matched quotes under the minimum-source policy

use tracing::debug;

use crate::error::RateEngineError;
use crate::matcher::MatchedQuotes;
use crate::Result;

/// Smallest usable minimum: zero values never average
const FLOOR_MINIMUM: usize = 1;

/// Minimum actually enforced for a configured value (0 means one)
pub fn effective_minimum(minimum_count: usize) -> usize {
    minimum_count.max(FLOOR_MINIMUM)
}

/// Arithmetic mean of `values`.
///
/// Fails with [`RateEngineError::InsufficientData`] when fewer than
/// `minimum_count` values are present, or when there are none at all.
pub fn aggregate(pattern: &str, values: &[f64], minimum_count: usize) -> Result<f64> {
    let required = effective_minimum(minimum_count);

    if values.len() < required {
        debug!(
            pattern,
            required,
            found = values.len(),
            "Not enough sources to average"
        );
        return Err(RateEngineError::InsufficientData {
            pattern: pattern.to_string(),
            required,
            found: values.len(),
        });
    }

    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Average a matcher result
pub fn aggregate_matched(matched: &MatchedQuotes, minimum_count: usize) -> Result<f64> {
    aggregate(&matched.pattern, &matched.values, minimum_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_mean_of_values() {
        let avg = aggregate("UsdtryBid", &[30.0, 30.1, 30.2], 2).unwrap();
        assert!((avg - 30.1).abs() < EPS);
    }

    #[test]
    fn test_mean_matches_definition_for_many_sizes() {
        for n in 1..=12usize {
            let values: Vec<f64> = (0..n).map(|i| 1.0 + i as f64 * 0.25).collect();
            let expected = values.iter().sum::<f64>() / n as f64;

            for minimum in 0..=n {
                let avg = aggregate("EurusdAsk", &values, minimum).unwrap();
                assert!((avg - expected).abs() < EPS, "n={} minimum={}", n, minimum);
            }
        }
    }

    #[test]
    fn test_too_few_values() {
        let err = aggregate("EurusdBid", &[1.08], 2).unwrap_err();

        assert_matches!(
            err,
            RateEngineError::InsufficientData { ref pattern, required: 2, found: 1 } if pattern == "EurusdBid"
        );
        assert_eq!(
            err.to_string(),
            "Insufficient data: at least 2 sources required for 'EurusdBid' (available: 1)"
        );
    }

    #[test]
    fn test_reports_correct_count() {
        for found in 0..5usize {
            let values = vec![2.0; found];
            let err = aggregate("GbpusdBid", &values, 5).unwrap_err();
            assert_matches!(err, RateEngineError::InsufficientData { required: 5, found: f, .. } if f == found);
        }
    }

    #[test]
    fn test_zero_or_one_minimum_accepts_single_value() {
        assert!((aggregate("UsdtryBid", &[30.0], 0).unwrap() - 30.0).abs() < EPS);
        assert!((aggregate("UsdtryBid", &[30.0], 1).unwrap() - 30.0).abs() < EPS);
    }

    #[test]
    fn test_no_values_always_fails() {
        assert_matches!(
            aggregate("UsdtryBid", &[], 0),
            Err(RateEngineError::InsufficientData { required: 1, found: 0, .. })
        );
        assert_matches!(
            aggregate("UsdtryBid", &[], 1),
            Err(RateEngineError::InsufficientData { required: 1, found: 0, .. })
        );
    }

    #[test]
    fn test_aggregate_matched() {
        let matched = MatchedQuotes {
            pattern: "{pf1,pf2}UsdtryAsk".to_string(),
            keys: vec!["pf1UsdtryAsk".to_string()],
            values: vec![30.2],
        };

        assert_matches!(
            aggregate_matched(&matched, 2),
            Err(RateEngineError::InsufficientData { ref pattern, .. }) if pattern == "{pf1,pf2}UsdtryAsk"
        );
        assert!((aggregate_matched(&matched, 1).unwrap() - 30.2).abs() < EPS);
    }
}
