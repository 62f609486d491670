//! Parametric distributions for sampled model variables
//!
//! Specs arrive loosely typed (family name + parameter list) and are
//! repaired before sampling: non-positive spreads get a small positive
//! default, inverted bounds are fixed, disordered triangular points are
//! sorted, and unknown families fall back to uniform with a diagnostic.

use crate::error::{AnalysisError, Result};
use crate::params::ModelParameters;
use log::warn;
use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::{Beta, Distribution, LogNormal, Normal, Triangular};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A variable's probability distribution, as supplied by the caller.
///
/// Family is one of `normal(mean, std)`, `uniform(low, high)`,
/// `triangular(low, mode, high)`, `lognormal(log-mean, log-std)`,
/// `beta(alpha, beta, low, high)`; the parameter list must meet the
/// family's arity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionSpec {
    pub family: String,
    pub params: Vec<f64>,
}

impl DistributionSpec {
    pub fn normal(mean: f64, std: f64) -> Self {
        Self { family: "normal".into(), params: vec![mean, std] }
    }

    pub fn uniform(low: f64, high: f64) -> Self {
        Self { family: "uniform".into(), params: vec![low, high] }
    }

    pub fn triangular(low: f64, mode: f64, high: f64) -> Self {
        Self { family: "triangular".into(), params: vec![low, mode, high] }
    }

    pub fn lognormal(log_mean: f64, log_std: f64) -> Self {
        Self { family: "lognormal".into(), params: vec![log_mean, log_std] }
    }

    pub fn beta(alpha: f64, beta: f64, low: f64, high: f64) -> Self {
        Self { family: "beta".into(), params: vec![alpha, beta, low, high] }
    }

    /// Repair the spec into a sampleable distribution.
    ///
    /// Fails only on an empty or under-length parameter list; every domain
    /// problem (inverted bounds, non-positive spreads, disordered points)
    /// is repaired in place.
    pub fn repair(&self) -> Result<RepairedDistribution> {
        if self.params.is_empty() {
            return Err(AnalysisError::structural(format!(
                "distribution '{}' has no parameters",
                self.family
            )));
        }

        let family = self.family.to_lowercase();
        match family.as_str() {
            "normal" => {
                let [mean, std] = self.take_params::<2>()?;
                let mut std = std.abs();
                if std <= 0.0 {
                    // Degenerate spread: default to 10% of the mean
                    std = if mean != 0.0 { mean.abs() * 0.1 } else { 1.0 };
                }
                Ok(RepairedDistribution::Normal { mean, std })
            }
            "uniform" => {
                let [low, high] = self.take_params::<2>()?;
                let (low, high) = repair_bounds(low, high);
                Ok(RepairedDistribution::Uniform { low, high })
            }
            "triangular" => {
                let [a, b, c] = self.take_params::<3>()?;
                let mut points = [a, b, c];
                points.sort_by(|x, y| x.total_cmp(y));
                let [low, mode, high] = points;
                if high <= low {
                    // All three points coincide; widen to a samplable interval
                    let (low, high) = repair_bounds(low, high);
                    return Ok(RepairedDistribution::Triangular { low, mode: low, high });
                }
                Ok(RepairedDistribution::Triangular { low, mode, high })
            }
            "lognormal" => {
                let [log_mean, log_std] = self.take_params::<2>()?;
                let mut log_std = log_std.abs();
                if log_std <= 0.0 {
                    log_std = 0.1;
                }
                Ok(RepairedDistribution::LogNormal { log_mean, log_std })
            }
            "beta" => {
                let [alpha, beta, low, high] = self.take_params::<4>()?;
                let alpha = alpha.max(0.1);
                let beta = beta.max(0.1);
                let (low, high) = if low >= high { (low, low + 1.0) } else { (low, high) };
                Ok(RepairedDistribution::Beta { alpha, beta, low, high })
            }
            other => {
                warn!("unknown distribution family '{}', falling back to uniform", other);
                let low = self.params[0];
                let high = self.params.get(1).copied().unwrap_or(low * 1.1);
                let (low, high) = repair_bounds(low, high);
                Ok(RepairedDistribution::Uniform { low, high })
            }
        }
    }

    fn take_params<const N: usize>(&self) -> Result<[f64; N]> {
        if self.params.len() < N {
            return Err(AnalysisError::structural(format!(
                "distribution '{}' needs {} parameters, got {}",
                self.family,
                N,
                self.params.len()
            )));
        }
        let mut out = [0.0; N];
        out.copy_from_slice(&self.params[..N]);
        Ok(out)
    }
}

/// Fix an inverted or empty interval so `low < high`.
fn repair_bounds(low: f64, high: f64) -> (f64, f64) {
    if low < high {
        (low, high)
    } else {
        let span = if low != 0.0 { low.abs() * 0.1 } else { 1.0 };
        (low, low + span)
    }
}

/// A repaired, directly sampleable distribution
#[derive(Debug, Clone, PartialEq)]
pub enum RepairedDistribution {
    Normal { mean: f64, std: f64 },
    Uniform { low: f64, high: f64 },
    Triangular { low: f64, mode: f64, high: f64 },
    LogNormal { log_mean: f64, log_std: f64 },
    Beta { alpha: f64, beta: f64, low: f64, high: f64 },
}

impl RepairedDistribution {
    /// Draw `n` variates.
    pub fn sample(&self, n: usize, rng: &mut StdRng) -> Result<Vec<f64>> {
        let mut samples = Vec::with_capacity(n);
        match *self {
            RepairedDistribution::Normal { mean, std } => {
                let dist = Normal::new(mean, std)
                    .map_err(|e| AnalysisError::domain(format!("normal({mean}, {std}): {e}")))?;
                samples.extend((0..n).map(|_| dist.sample(rng)));
            }
            RepairedDistribution::Uniform { low, high } => {
                samples.extend((0..n).map(|_| rng.gen_range(low..high)));
            }
            RepairedDistribution::Triangular { low, mode, high } => {
                let dist = Triangular::new(low, high, mode).map_err(|e| {
                    AnalysisError::domain(format!("triangular({low}, {mode}, {high}): {e}"))
                })?;
                samples.extend((0..n).map(|_| dist.sample(rng)));
            }
            RepairedDistribution::LogNormal { log_mean, log_std } => {
                let dist = LogNormal::new(log_mean, log_std).map_err(|e| {
                    AnalysisError::domain(format!("lognormal({log_mean}, {log_std}): {e}"))
                })?;
                samples.extend((0..n).map(|_| dist.sample(rng)));
            }
            RepairedDistribution::Beta { alpha, beta, low, high } => {
                let dist = Beta::new(alpha, beta)
                    .map_err(|e| AnalysisError::domain(format!("beta({alpha}, {beta}): {e}")))?;
                // Beta draws land in [0, 1]; rescale to the caller's range
                samples.extend((0..n).map(|_| low + dist.sample(rng) * (high - low)));
            }
        }
        Ok(samples)
    }
}

/// Sample `n` variates from a caller-supplied spec.
pub fn sample(spec: &DistributionSpec, n: usize, rng: &mut StdRng) -> Result<Vec<f64>> {
    spec.repair()?.sample(n, rng)
}

/// Standard distribution set for a buy-vs-rent simulation.
///
/// Centers each distribution on the base-case value: interest rate and cost
/// of capital as normals with proportional spreads, appreciation as a
/// conservative/likely/optimistic triangle, rent growth as a normal with a
/// one-point spread, and purchase price as a normal with a 10% spread.
pub fn standard_distributions(params: &ModelParameters) -> HashMap<String, DistributionSpec> {
    let mut distributions = HashMap::new();

    distributions.insert(
        "interest_rate".to_string(),
        DistributionSpec::normal(params.interest_rate, params.interest_rate * 0.15),
    );

    let appreciation = params.market_appreciation_rate;
    distributions.insert(
        "market_appreciation_rate".to_string(),
        DistributionSpec::triangular((appreciation - 2.0).max(0.0), appreciation, appreciation + 3.0),
    );

    distributions.insert(
        "rent_increase_rate".to_string(),
        DistributionSpec::normal(params.rent_increase_rate, 1.0),
    );

    distributions.insert(
        "cost_of_capital".to_string(),
        DistributionSpec::normal(params.cost_of_capital, params.cost_of_capital * 0.125),
    );

    distributions.insert(
        "purchase_price".to_string(),
        DistributionSpec::normal(params.purchase_price, params.purchase_price * 0.1),
    );

    distributions
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_normal_samples_track_mean() {
        let spec = DistributionSpec::normal(5.0, 0.5);
        let samples = sample(&spec, 20_000, &mut rng()).unwrap();
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        assert_abs_diff_eq!(mean, 5.0, epsilon = 0.02);
    }

    #[test]
    fn test_uniform_samples_within_bounds() {
        let spec = DistributionSpec::uniform(2.0, 4.0);
        let samples = sample(&spec, 5_000, &mut rng()).unwrap();
        assert!(samples.iter().all(|&s| (2.0..4.0).contains(&s)));
    }

    #[test]
    fn test_triangular_samples_within_bounds() {
        let spec = DistributionSpec::triangular(1.0, 3.0, 6.0);
        let samples = sample(&spec, 5_000, &mut rng()).unwrap();
        assert!(samples.iter().all(|&s| (1.0..=6.0).contains(&s)));
    }

    #[test]
    fn test_lognormal_samples_positive() {
        let spec = DistributionSpec::lognormal(0.0, 0.25);
        let samples = sample(&spec, 5_000, &mut rng()).unwrap();
        assert!(samples.iter().all(|&s| s > 0.0));
    }

    #[test]
    fn test_beta_rescaled_to_range() {
        let spec = DistributionSpec::beta(2.0, 5.0, 10.0, 20.0);
        let samples = sample(&spec, 5_000, &mut rng()).unwrap();
        assert!(samples.iter().all(|&s| (10.0..=20.0).contains(&s)));
    }

    #[test]
    fn test_repair_non_positive_std() {
        let spec = DistributionSpec::normal(5.0, 0.0);
        match spec.repair().unwrap() {
            RepairedDistribution::Normal { std, .. } => {
                assert_abs_diff_eq!(std, 0.5, epsilon = 1e-9) // 10% of the mean
            }
            other => panic!("unexpected repair: {:?}", other),
        }

        let zero_mean = DistributionSpec::normal(0.0, -1.0);
        match zero_mean.repair().unwrap() {
            // Negative spread is taken as magnitude
            RepairedDistribution::Normal { std, .. } => assert_abs_diff_eq!(std, 1.0),
            other => panic!("unexpected repair: {:?}", other),
        }
    }

    #[test]
    fn test_repair_inverted_uniform_bounds() {
        let spec = DistributionSpec::uniform(10.0, 5.0);
        match spec.repair().unwrap() {
            RepairedDistribution::Uniform { low, high } => {
                assert_eq!(low, 10.0);
                assert!(high > low);
            }
            other => panic!("unexpected repair: {:?}", other),
        }
    }

    #[test]
    fn test_repair_sorts_triangular_points() {
        let spec = DistributionSpec::triangular(6.0, 1.0, 3.0);
        match spec.repair().unwrap() {
            RepairedDistribution::Triangular { low, mode, high } => {
                assert_eq!((low, mode, high), (1.0, 3.0, 6.0));
            }
            other => panic!("unexpected repair: {:?}", other),
        }
    }

    #[test]
    fn test_repair_clamps_beta_shape() {
        let spec = DistributionSpec::beta(-2.0, 0.0, 0.0, 1.0);
        match spec.repair().unwrap() {
            RepairedDistribution::Beta { alpha, beta, .. } => {
                assert_eq!(alpha, 0.1);
                assert_eq!(beta, 0.1);
            }
            other => panic!("unexpected repair: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_family_falls_back_to_uniform() {
        let spec = DistributionSpec { family: "cauchy".into(), params: vec![1.0, 2.0] };
        match spec.repair().unwrap() {
            RepairedDistribution::Uniform { low, high } => {
                assert_eq!((low, high), (1.0, 2.0));
            }
            other => panic!("unexpected repair: {:?}", other),
        }
    }

    #[test]
    fn test_empty_params_rejected() {
        let spec = DistributionSpec { family: "normal".into(), params: vec![] };
        assert!(spec.repair().is_err());

        let short = DistributionSpec { family: "triangular".into(), params: vec![1.0, 2.0] };
        assert!(short.repair().is_err());
    }

    #[test]
    fn test_seeded_sampling_reproducible() {
        let spec = DistributionSpec::normal(5.0, 1.0);
        let a = sample(&spec, 100, &mut rng()).unwrap();
        let b = sample(&spec, 100, &mut rng()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_standard_distributions_cover_key_variables() {
        let distributions = standard_distributions(&ModelParameters::default());
        for name in [
            "interest_rate",
            "market_appreciation_rate",
            "rent_increase_rate",
            "cost_of_capital",
            "purchase_price",
        ] {
            assert!(distributions.contains_key(name), "missing {}", name);
        }
        // Every generated spec must survive its own repair pass
        for spec in distributions.values() {
            assert!(spec.repair().is_ok());
        }
    }
}
