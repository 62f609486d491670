//! Property Analytics - High-performance buy-vs-rent NPV engine with Monte Carlo simulation
//!
//! This library provides:
//! - Deterministic discounted cash-flow comparison of owning vs renting
//! - Mortgage amortization with zero-rate, full-cash, and early-payoff handling
//! - Terminal value modeling for the hold-forever ownership strategy
//! - Monte Carlo simulation over sampled parameter distributions with
//!   memory-aware batch/streaming execution and result caching

pub mod engine;
pub mod error;
pub mod params;
pub mod simulation;

// Re-export commonly used types
pub use engine::{
    amortization_schedule, compare, AmortizationYear, NpvResult, Recommendation,
};
pub use error::{AnalysisError, Result};
pub use params::ModelParameters;
pub use simulation::{
    DistributionSpec, MonteCarloResult, SimulationConfig, SimulationEngine,
};
