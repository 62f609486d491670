//! Cost escalation with Year-1 indexing
//!
//! Year-1 indexing means the first analysis year uses the unescalated base
//! amount; compounding starts in year 2. Property taxes escalate at their
//! own assessment rate, other ownership costs at general inflation, and
//! rent/subletting at a combined inflation-and-growth rate.

use crate::error::{AnalysisError, Result};

/// Escalate a base amount to a given analysis year.
///
/// With `year_1_indexing` the escalation factor for year `n` is
/// `(1 + rate/100)^(n-1)`, so year 1 returns the base unchanged. Without
/// it the factor is `(1 + rate/100)^n`.
///
/// Fails for `year < 1`; the model has no year zero.
pub fn escalate(base: f64, rate_pct: f64, year: u32, year_1_indexing: bool) -> Result<f64> {
    if year < 1 {
        return Err(AnalysisError::domain(format!(
            "escalation year must be 1 or greater, got {}",
            year
        )));
    }

    let exponent = if year_1_indexing { year - 1 } else { year };
    let factor = (1.0 + rate_pct / 100.0).powi(exponent as i32);
    Ok(base * factor)
}

/// Combined growth rate for rent and subletting, as a percentage.
///
/// Rent rises with both inflation and the contractual increase rate. The
/// rates compound rather than add:
/// `(1 + inflation/100) * (1 + increase/100) - 1`, returned as a percent
/// suitable for [`escalate`].
pub fn combined_growth_rate_pct(inflation_rate: f64, increase_rate: f64) -> f64 {
    let combined = (1.0 + inflation_rate / 100.0) * (1.0 + increase_rate / 100.0) - 1.0;
    combined * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_year_1_uses_base() {
        // Year 1 is always the unescalated base, whatever the rate
        assert_eq!(escalate(1000.0, 3.0, 1, true).unwrap(), 1000.0);
        assert_eq!(escalate(1000.0, 25.0, 1, true).unwrap(), 1000.0);
        assert_eq!(escalate(1000.0, -5.0, 1, true).unwrap(), 1000.0);
    }

    #[test]
    fn test_zero_rate_never_escalates() {
        for year in 1..=30 {
            assert_eq!(escalate(1000.0, 0.0, year, true).unwrap(), 1000.0);
            assert_eq!(escalate(1000.0, 0.0, year, false).unwrap(), 1000.0);
        }
    }

    #[test]
    fn test_year_1_indexed_escalation() {
        assert_relative_eq!(escalate(1000.0, 3.0, 2, true).unwrap(), 1030.0);
        assert_relative_eq!(escalate(1000.0, 3.0, 3, true).unwrap(), 1060.9);
    }

    #[test]
    fn test_non_indexed_escalation() {
        // Without Year-1 indexing, year 1 already compounds once
        assert_relative_eq!(escalate(1000.0, 3.0, 1, false).unwrap(), 1030.0);
        assert_relative_eq!(escalate(1000.0, 3.0, 2, false).unwrap(), 1060.9);
    }

    #[test]
    fn test_year_zero_rejected() {
        assert!(escalate(1000.0, 3.0, 0, true).is_err());
        assert!(escalate(1000.0, 3.0, 0, false).is_err());
    }

    #[test]
    fn test_combined_growth_rate_compounds() {
        // 2.5% inflation with 3% rent growth: 1.025 * 1.03 - 1 = 5.575%
        let rate = combined_growth_rate_pct(2.5, 3.0);
        assert_relative_eq!(rate, 5.575, epsilon = 1e-10);

        // Not the 5.5% a simple sum would give
        assert!((rate - 5.5).abs() > 1e-3);
    }

    #[test]
    fn test_combined_rate_with_zero_inflation() {
        assert_relative_eq!(combined_growth_rate_pct(0.0, 3.0), 3.0, epsilon = 1e-10);
        assert_relative_eq!(combined_growth_rate_pct(3.0, 0.0), 3.0, epsilon = 1e-10);
    }
}
