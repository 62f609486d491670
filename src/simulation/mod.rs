//! Stochastic simulation layer over the deterministic engine

pub mod cache;
pub mod distributions;
pub mod memory;
pub mod monte_carlo;
pub mod statistics;

pub use cache::{cache_key, ResultCache};
pub use distributions::{
    sample, standard_distributions, DistributionSpec, RepairedDistribution,
};
pub use memory::{estimate_sample_footprint, MemoryBudget, MemoryTracker};
pub use monte_carlo::{
    ExecutionStrategy, SimulationConfig, SimulationEngine, TrialOutcome,
};
pub use statistics::{summarize, MonteCarloResult};
