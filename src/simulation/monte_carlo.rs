//! Monte Carlo simulation orchestrator
//!
//! Repeatedly re-evaluates the NPV comparison under sampled parameter
//! distributions. Runs proceed through validation, a memory footprint
//! estimate that picks batch or streaming execution, a chunked parallel
//! fan-out over a bounded worker pool, statistical aggregation, and result
//! caching. A failed trial contributes a zero outcome and is counted; it
//! never fails the run.

use crate::engine::npv::compare;
use crate::error::{AnalysisError, Result};
use crate::params::ModelParameters;
use crate::simulation::cache::{cache_key, ResultCache};
use crate::simulation::distributions::{DistributionSpec, RepairedDistribution};
use crate::simulation::memory::{estimate_sample_footprint, MemoryBudget, MemoryTracker};
use crate::simulation::statistics::{summarize, MonteCarloResult};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Tuning knobs for the simulation engine
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Iterations when the caller does not specify a count
    pub default_iterations: u32,
    /// Requested iteration counts are clamped into this range, silently
    pub min_iterations: u32,
    pub max_iterations: u32,
    /// Trials per parallel work unit
    pub chunk_size: usize,
    /// Trials sampled per batch in streaming mode
    pub streaming_chunk_size: usize,
    /// Advisory aggregate time budget; late chunks are abandoned, in-flight
    /// chunks are never aborted
    pub soft_time_budget: Duration,
    /// Wall-clock target; exceeding it is logged, not prevented
    pub wall_clock_target: Duration,
    /// Budget for holding all samples in memory at once
    pub memory_budget: MemoryBudget,
    /// Overhead multiplier on the raw sample bytes
    pub sample_overhead_factor: f64,
    /// Conservative streaming threshold for estimates this large
    pub streaming_fallback_bytes: usize,
    /// Check tracked memory every this many streaming batches
    pub memory_check_frequency: usize,
    /// Below this success rate the run is flagged as degraded
    pub min_success_rate: f64,
    /// Worker pool size
    pub max_workers: usize,
    /// Percentile levels reported in results
    pub percentile_levels: Vec<u8>,
    /// Confidence interval levels reported in results
    pub confidence_levels: Vec<u8>,
    /// Result cache capacity in entries
    pub cache_capacity: usize,
    /// Fixed RNG seed for reproducible runs; entropy-seeded when absent
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            default_iterations: 15_000,
            min_iterations: 10_000,
            max_iterations: 50_000,
            chunk_size: 1_000,
            streaming_chunk_size: 2_000,
            soft_time_budget: Duration::from_millis(4_500),
            wall_clock_target: Duration::from_secs(5),
            memory_budget: MemoryBudget::from_gb(1),
            sample_overhead_factor: 2.5,
            streaming_fallback_bytes: 500 * 1024 * 1024,
            memory_check_frequency: 5,
            min_success_rate: 0.8,
            max_workers: usize::min(8, num_cpus::get()),
            percentile_levels: vec![5, 10, 25, 50, 75, 90, 95],
            confidence_levels: vec![90, 95, 99],
            cache_capacity: 50,
            seed: None,
        }
    }
}

/// Outcome of a single trial
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrialOutcome {
    /// NPV difference from one successful evaluation
    Success(f64),
    /// The trial errored; it contributes a zero outcome
    Failed,
}

impl TrialOutcome {
    /// Value this trial contributes to the aggregate.
    pub fn value(&self) -> f64 {
        match self {
            TrialOutcome::Success(npv_difference) => *npv_difference,
            TrialOutcome::Failed => 0.0,
        }
    }
}

/// How a run holds its samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// All samples drawn up front
    Batch,
    /// Successive small batches, samples discarded between them
    Streaming,
}

/// Monte Carlo simulation engine.
///
/// The worker pool is built once when the engine is created, not per call;
/// the engine itself is the only component shared across concurrent
/// callers, and its cache is the only mutable state.
pub struct SimulationEngine {
    config: SimulationConfig,
    pool: rayon::ThreadPool,
    cache: ResultCache,
    tracker: MemoryTracker,
}

impl SimulationEngine {
    /// Build an engine and its worker pool from the given configuration.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.max_workers.max(1))
            .build()
            .map_err(|e| {
                AnalysisError::structural(format!("failed to initialize worker pool: {}", e))
            })?;
        let cache = ResultCache::new(config.cache_capacity);
        let tracker = MemoryTracker::new(config.memory_budget);

        Ok(Self { config, pool, cache, tracker })
    }

    /// Engine with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(SimulationConfig::default())
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The result cache. Clearing it at any point is safe and only costs
    /// recomputation.
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Pick batch or streaming execution from the footprint estimate.
    ///
    /// Streams when the estimate exceeds what remains of the memory budget,
    /// or when it is large enough that the conservative fallback applies.
    pub fn execution_strategy(&self, variables: usize, iterations: usize) -> ExecutionStrategy {
        let estimate =
            estimate_sample_footprint(variables, iterations, self.config.sample_overhead_factor);
        if estimate > self.tracker.available_bytes()
            || estimate > self.config.streaming_fallback_bytes
        {
            ExecutionStrategy::Streaming
        } else {
            ExecutionStrategy::Batch
        }
    }

    /// Run a Monte Carlo simulation over the given base parameters.
    ///
    /// `iterations` defaults to the configured count and is clamped into
    /// the configured range. Identical inputs are answered from the result
    /// cache. The call blocks until the run completes; the soft time
    /// budget only sheds late work, it never aborts the call.
    pub fn run_monte_carlo(
        &self,
        base_params: &ModelParameters,
        distributions: &HashMap<String, DistributionSpec>,
        iterations: Option<u32>,
    ) -> Result<MonteCarloResult> {
        let start = Instant::now();

        if distributions.is_empty() {
            return Err(AnalysisError::structural(
                "at least one variable distribution is required",
            ));
        }
        base_params.validate()?;
        let params = base_params.clone().resolve_defaults();

        let iterations = iterations
            .unwrap_or(self.config.default_iterations)
            .clamp(self.config.min_iterations, self.config.max_iterations)
            as usize;

        let key = cache_key(&params, distributions, iterations as u32);
        if let Some(cached) = self.cache.get(&key) {
            info!("Monte Carlo result served from cache in {:?}", start.elapsed());
            return Ok(cached);
        }

        info!("starting Monte Carlo simulation with {} iterations", iterations);

        // Repair every spec up front; sort by name so the sampling order is
        // independent of map iteration order
        let mut repaired: Vec<(String, RepairedDistribution)> = distributions
            .iter()
            .map(|(name, spec)| spec.repair().map(|r| (name.clone(), r)))
            .collect::<Result<_>>()?;
        repaired.sort_by(|a, b| a.0.cmp(&b.0));

        let strategy = self.execution_strategy(repaired.len(), iterations);
        let seed = self.config.seed.unwrap_or_else(rand::random);

        let outcomes = match strategy {
            ExecutionStrategy::Batch => self.run_batch(&params, &repaired, iterations, seed, start)?,
            ExecutionStrategy::Streaming => {
                self.run_streaming(&params, &repaired, iterations, seed, start)?
            }
        };

        let successes = outcomes
            .iter()
            .filter(|o| matches!(o, TrialOutcome::Success(_)))
            .count();
        let success_rate = successes as f64 / outcomes.len().max(1) as f64;
        if success_rate < self.config.min_success_rate {
            warn!(
                "degraded simulation: only {} of {} trials succeeded",
                successes,
                outcomes.len()
            );
        }

        let values: Vec<f64> = outcomes.iter().map(TrialOutcome::value).collect();
        let result = summarize(
            &values,
            &self.config.percentile_levels,
            &self.config.confidence_levels,
        );
        self.cache.put(key, result.clone());

        let elapsed = start.elapsed();
        info!(
            "Monte Carlo simulation completed in {:?} for {} iterations",
            elapsed, iterations
        );
        if elapsed > self.config.wall_clock_target {
            warn!(
                "simulation exceeded {:?} wall-clock target: {:?}",
                self.config.wall_clock_target, elapsed
            );
        }

        Ok(result)
    }

    /// Batch execution: draw every sample up front, then fan out.
    fn run_batch(
        &self,
        params: &ModelParameters,
        repaired: &[(String, RepairedDistribution)],
        iterations: usize,
        seed: u64,
        start: Instant,
    ) -> Result<Vec<TrialOutcome>> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut samples: Vec<(String, Vec<f64>)> = Vec::with_capacity(repaired.len());
        for (name, dist) in repaired {
            let series = dist.sample(iterations, &mut rng)?;
            self.tracker
                .record_allocation(series.len() * std::mem::size_of::<f64>());
            samples.push((name.clone(), series));
        }

        let outcomes = self.run_chunked(params, &samples, iterations, start);

        for (_, series) in &samples {
            self.tracker
                .record_deallocation(series.len() * std::mem::size_of::<f64>());
        }
        Ok(outcomes)
    }

    /// Streaming execution: sample and evaluate in successive batches,
    /// discarding each batch's samples before drawing the next.
    fn run_streaming(
        &self,
        params: &ModelParameters,
        repaired: &[(String, RepairedDistribution)],
        iterations: usize,
        seed: u64,
        start: Instant,
    ) -> Result<Vec<TrialOutcome>> {
        let batch_size = self.config.streaming_chunk_size.max(1);
        let num_batches = iterations.div_ceil(batch_size);
        info!(
            "running streaming simulation: {} batches of up to {} trials",
            num_batches, batch_size
        );

        let mut outcomes = Vec::with_capacity(iterations);
        for batch_idx in 0..num_batches {
            let batch_start = batch_idx * batch_size;
            let batch_len = batch_size.min(iterations - batch_start);

            // Each batch draws from its own derived seed so results do not
            // depend on how many batches preceded it
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(batch_idx as u64 + 1));
            let mut samples: Vec<(String, Vec<f64>)> = Vec::with_capacity(repaired.len());
            for (name, dist) in repaired {
                let series = dist.sample(batch_len, &mut rng)?;
                self.tracker
                    .record_allocation(series.len() * std::mem::size_of::<f64>());
                samples.push((name.clone(), series));
            }

            outcomes.extend(self.run_chunked(params, &samples, batch_len, start));

            for (_, series) in &samples {
                self.tracker
                    .record_deallocation(series.len() * std::mem::size_of::<f64>());
            }
            drop(samples);

            if batch_idx % self.config.memory_check_frequency.max(1) == 0
                && self.tracker.over_budget()
            {
                warn!(
                    "tracked memory ({} bytes) over budget during streaming",
                    self.tracker.current_bytes()
                );
            }
        }

        Ok(outcomes)
    }

    /// Scatter trial chunks across the worker pool and gather outcomes.
    ///
    /// A chunk whose turn comes after the soft time budget has elapsed is
    /// abandoned: its trials are recorded as failures and never retried.
    fn run_chunked(
        &self,
        params: &ModelParameters,
        samples: &[(String, Vec<f64>)],
        count: usize,
        start: Instant,
    ) -> Vec<TrialOutcome> {
        let chunk_size = self.config.chunk_size.max(1);
        let ranges: Vec<(usize, usize)> = (0..count)
            .step_by(chunk_size)
            .map(|chunk_start| (chunk_start, (chunk_start + chunk_size).min(count)))
            .collect();
        let soft_budget = self.config.soft_time_budget;

        self.pool
            .install(|| {
                ranges
                    .par_iter()
                    .map(|&(chunk_start, chunk_end)| {
                        if start.elapsed() > soft_budget {
                            debug!(
                                "abandoning chunk {}..{}: soft time budget exhausted",
                                chunk_start, chunk_end
                            );
                            return vec![TrialOutcome::Failed; chunk_end - chunk_start];
                        }
                        (chunk_start..chunk_end)
                            .map(|index| evaluate_trial(params, samples, index))
                            .collect()
                    })
                    .collect::<Vec<Vec<TrialOutcome>>>()
            })
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Evaluate one trial: substitute this index's draws and run the comparison.
fn evaluate_trial(
    base: &ModelParameters,
    samples: &[(String, Vec<f64>)],
    index: usize,
) -> TrialOutcome {
    let mut params = base.clone();
    for (name, series) in samples {
        let Some(&value) = series.get(index) else {
            return TrialOutcome::Failed;
        };
        if params.apply_override(name, value).is_err() {
            return TrialOutcome::Failed;
        }
    }

    match compare(&params) {
        Ok(result) if result.npv_difference.is_finite() => {
            TrialOutcome::Success(result.npv_difference)
        }
        _ => TrialOutcome::Failed,
    }
}
