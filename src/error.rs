//! Error types for the analysis engines

use thiserror::Error;

/// Errors surfaced by the deterministic and stochastic engines.
///
/// Structural errors indicate missing or malformed inputs; domain errors
/// indicate structurally valid values outside their allowed range. Both
/// abort the requested operation immediately. Everything recoverable
/// (failed trials, budget overruns) is handled internally and never
/// surfaces as an error.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Missing or malformed required input
    #[error("invalid input structure: {0}")]
    Structural(String),

    /// Structurally valid input with an out-of-range value
    #[error("input out of domain: {0}")]
    Domain(String),
}

impl AnalysisError {
    /// Shorthand for a structural error with a formatted message
    pub fn structural(msg: impl Into<String>) -> Self {
        AnalysisError::Structural(msg.into())
    }

    /// Shorthand for a domain error with a formatted message
    pub fn domain(msg: impl Into<String>) -> Self {
        AnalysisError::Domain(msg.into())
    }
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, AnalysisError>;
