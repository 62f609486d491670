//! Deterministic buy-vs-rent financial engine

pub mod amortization;
pub mod costs;
pub mod escalation;
pub mod npv;
pub mod terminal;

pub use amortization::{
    amortization_schedule, balance_at, breakdown_at, loan_summary, AmortizationYear, LoanSummary,
    PaymentBreakdown,
};
pub use costs::{
    annual_ownership_costs, annual_rental_costs, subletting_income, OwnershipCosts, RentalCosts,
    SublettingIncome, SublettingTerms,
};
pub use escalation::{combined_growth_rate_pct, escalate};
pub use npv::{
    break_even_analysis, classify_npv_difference, compare, mortgage_terms, ownership_cash_flows,
    present_value, rental_cash_flows, BreakEvenSummary, Confidence, MortgageTerms, NpvResult,
    OwnershipYear, Recommendation, RentalYear,
};
pub use terminal::{rental_terminal_value, terminal_value, TerminalValue};

// ============================================================================
// Recommendation Thresholds
// ============================================================================
// Absolute NPV-difference thresholds separating the recommendation tiers.
// Differences beyond the strong threshold get a high-confidence call;
// anything inside the moderate band is marginal.

/// NPV difference beyond which the recommendation is strong (either way)
pub const STRONG_NPV_THRESHOLD: f64 = 1_000_000.0;

/// NPV difference beyond which a clear buy/rent call is made
pub const MODERATE_NPV_THRESHOLD: f64 = 500_000.0;
