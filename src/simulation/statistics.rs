//! Statistical reduction of trial outcomes
//!
//! Reduces the raw per-trial NPV differences to summary statistics.
//! Non-finite outcomes are dropped before any computation. An input with
//! no finite outcomes yields a neutral result rather than an error.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregated result of one Monte Carlo run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResult {
    /// Number of finite outcomes aggregated
    pub iterations_completed: usize,
    pub mean_npv: f64,
    /// Bessel-corrected sample standard deviation
    pub std_dev: f64,
    /// Percentile level -> estimated value
    pub percentiles: BTreeMap<u8, f64>,
    /// Fraction of outcomes with a positive NPV difference
    pub probability_positive: f64,
    /// Confidence level -> (lower, upper) bounds
    pub confidence_intervals: BTreeMap<u8, (f64, f64)>,
}

impl MonteCarloResult {
    /// Neutral result for a run that produced no finite outcomes.
    pub fn neutral(percentile_levels: &[u8], confidence_levels: &[u8]) -> Self {
        Self {
            iterations_completed: 0,
            mean_npv: 0.0,
            std_dev: 0.0,
            percentiles: percentile_levels.iter().map(|&p| (p, 0.0)).collect(),
            probability_positive: 0.5,
            confidence_intervals: confidence_levels.iter().map(|&l| (l, (0.0, 0.0))).collect(),
        }
    }
}

/// Percentile of a sorted slice using linear interpolation between ranks.
///
/// `q` is the percentile level in [0, 100]. The slice must be sorted
/// ascending and non-empty.
fn percentile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }

    let rank = q.clamp(0.0, 100.0) / 100.0 * (n - 1) as f64;
    let lower_idx = rank.floor() as usize;
    let upper_idx = rank.ceil() as usize;
    if lower_idx == upper_idx {
        return sorted[lower_idx];
    }

    let weight = rank - lower_idx as f64;
    sorted[lower_idx] * (1.0 - weight) + sorted[upper_idx] * weight
}

/// Reduce trial outcomes to a [`MonteCarloResult`].
///
/// Confidence bounds for level L are the (100-L)/2 and 100-(100-L)/2
/// percentiles of the outcome distribution.
pub fn summarize(
    outcomes: &[f64],
    percentile_levels: &[u8],
    confidence_levels: &[u8],
) -> MonteCarloResult {
    let mut finite: Vec<f64> = outcomes.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return MonteCarloResult::neutral(percentile_levels, confidence_levels);
    }

    let n = finite.len();
    let mean_npv = finite.iter().sum::<f64>() / n as f64;

    let std_dev = if n > 1 {
        let sum_sq: f64 = finite.iter().map(|v| (v - mean_npv).powi(2)).sum();
        (sum_sq / (n - 1) as f64).sqrt()
    } else {
        0.0
    };

    finite.sort_by(|a, b| a.total_cmp(b));

    let percentiles = percentile_levels
        .iter()
        .map(|&p| (p, percentile_sorted(&finite, p as f64)))
        .collect();

    let positive_count = finite.iter().filter(|&&v| v > 0.0).count();
    let probability_positive = positive_count as f64 / n as f64;

    let confidence_intervals = confidence_levels
        .iter()
        .map(|&level| {
            let alpha = 100.0 - level as f64;
            let lower = percentile_sorted(&finite, alpha / 2.0);
            let upper = percentile_sorted(&finite, 100.0 - alpha / 2.0);
            (level, (lower, upper))
        })
        .collect();

    MonteCarloResult {
        iterations_completed: n,
        mean_npv,
        std_dev,
        percentiles,
        probability_positive,
        confidence_intervals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const PERCENTILES: [u8; 7] = [5, 10, 25, 50, 75, 90, 95];
    const CONFIDENCE_LEVELS: [u8; 3] = [90, 95, 99];

    #[test]
    fn test_basic_statistics() {
        let outcomes = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = summarize(&outcomes, &PERCENTILES, &CONFIDENCE_LEVELS);

        assert_eq!(result.iterations_completed, 5);
        assert_abs_diff_eq!(result.mean_npv, 3.0, epsilon = 1e-12);
        // Bessel-corrected: sqrt(10 / 4)
        assert_abs_diff_eq!(result.std_dev, (10.0f64 / 4.0).sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(result.probability_positive, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_median_interpolation() {
        let outcomes = vec![1.0, 2.0, 3.0, 4.0];
        let result = summarize(&outcomes, &PERCENTILES, &CONFIDENCE_LEVELS);
        // Even count: median interpolates between the middle pair
        assert_abs_diff_eq!(result.percentiles[&50], 2.5, epsilon = 1e-12);
    }

    #[test]
    fn test_percentiles_ordered() {
        // A deliberately skewed sample
        let outcomes: Vec<f64> = (0..1_000).map(|i| ((i * 37) % 997) as f64 - 300.0).collect();
        let result = summarize(&outcomes, &PERCENTILES, &CONFIDENCE_LEVELS);

        let p = &result.percentiles;
        assert!(p[&5] <= p[&25]);
        assert!(p[&25] <= p[&50]);
        assert!(p[&50] <= p[&75]);
        assert!(p[&75] <= p[&95]);
    }

    #[test]
    fn test_probability_positive() {
        let outcomes = vec![-2.0, -1.0, 0.0, 1.0, 2.0];
        let result = summarize(&outcomes, &PERCENTILES, &CONFIDENCE_LEVELS);
        // Zero does not count as positive
        assert_abs_diff_eq!(result.probability_positive, 0.4, epsilon = 1e-12);
    }

    #[test]
    fn test_confidence_interval_bounds() {
        let outcomes: Vec<f64> = (0..=100).map(|i| i as f64).collect();
        let result = summarize(&outcomes, &PERCENTILES, &CONFIDENCE_LEVELS);

        // 90% CI spans the 5th to 95th percentile
        let (lower, upper) = result.confidence_intervals[&90];
        assert_abs_diff_eq!(lower, 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(upper, 95.0, epsilon = 1e-9);

        // Wider level, wider interval
        let (lower_99, upper_99) = result.confidence_intervals[&99];
        assert!(lower_99 <= lower && upper <= upper_99);
    }

    #[test]
    fn test_non_finite_outcomes_dropped() {
        let outcomes = vec![1.0, f64::NAN, 2.0, f64::INFINITY, 3.0, f64::NEG_INFINITY];
        let result = summarize(&outcomes, &PERCENTILES, &CONFIDENCE_LEVELS);
        assert_eq!(result.iterations_completed, 3);
        assert_abs_diff_eq!(result.mean_npv, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_neutral_result_for_empty_input() {
        let result = summarize(&[], &PERCENTILES, &CONFIDENCE_LEVELS);
        assert_eq!(result.iterations_completed, 0);
        assert_eq!(result.mean_npv, 0.0);
        assert_eq!(result.std_dev, 0.0);
        assert_abs_diff_eq!(result.probability_positive, 0.5, epsilon = 1e-12);
        assert!(result.percentiles.values().all(|&v| v == 0.0));

        // All-NaN input degrades the same way
        let result = summarize(&[f64::NAN, f64::NAN], &PERCENTILES, &CONFIDENCE_LEVELS);
        assert_eq!(result.iterations_completed, 0);
        assert_abs_diff_eq!(result.probability_positive, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_single_outcome() {
        let result = summarize(&[42.0], &PERCENTILES, &CONFIDENCE_LEVELS);
        assert_eq!(result.iterations_completed, 1);
        assert_eq!(result.std_dev, 0.0);
        assert_eq!(result.percentiles[&50], 42.0);
        assert_eq!(result.confidence_intervals[&95], (42.0, 42.0));
    }
}
