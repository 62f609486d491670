//! Amortization engine for annual-payment loans
//!
//! Generates the year-by-year balance recurrence for a level annual payment:
//! interest accrues on the beginning balance, the remainder of the payment
//! retires principal, and the schedule zero-fills once the loan is paid off.
//! Point queries re-derive the same recurrence without materializing the
//! full schedule.

use log::warn;
use serde::{Deserialize, Serialize};

/// Balance is considered paid off within this tolerance (one cent).
const PAYOFF_TOLERANCE: f64 = 0.01;

/// One year of an amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationYear {
    /// Year number (1-indexed)
    pub year: u32,
    /// Loan balance at start of year
    pub beginning_balance: f64,
    /// Interest paid during the year
    pub interest_portion: f64,
    /// Principal retired during the year
    pub principal_portion: f64,
    /// Loan balance at end of year
    pub ending_balance: f64,
    /// Total interest paid through this year
    pub cumulative_interest: f64,
    /// Total principal paid through this year
    pub cumulative_principal: f64,
}

impl AmortizationYear {
    fn zero_filled(year: u32, cumulative_interest: f64, cumulative_principal: f64) -> Self {
        Self {
            year,
            beginning_balance: 0.0,
            interest_portion: 0.0,
            principal_portion: 0.0,
            ending_balance: 0.0,
            cumulative_interest,
            cumulative_principal,
        }
    }
}

/// Generate the complete amortization schedule, one entry per loan year.
///
/// The recurrence per year:
/// - interest = beginning balance × rate / 100 (zero at a 0% rate)
/// - principal = min(payment − interest, beginning balance), clamped to 0
///   when the payment does not cover interest (non-fatal, logged)
/// - ending balance = max(0, beginning − principal)
///
/// Once the balance is within one cent of zero the remaining years are
/// zero-filled, so the result always has exactly `loan_term` entries.
/// A non-positive loan or payment yields an empty schedule.
pub fn amortization_schedule(
    loan_amount: f64,
    annual_payment: f64,
    interest_rate: f64,
    loan_term: u32,
) -> Vec<AmortizationYear> {
    if loan_amount <= 0.0 || annual_payment <= 0.0 {
        return Vec::new();
    }

    let mut schedule = Vec::with_capacity(loan_term as usize);
    let mut remaining = loan_amount;
    let mut cumulative_interest = 0.0;
    let mut cumulative_principal = 0.0;

    for year in 1..=loan_term {
        if remaining <= 0.0 {
            schedule.push(AmortizationYear::zero_filled(
                year,
                cumulative_interest,
                cumulative_principal,
            ));
            continue;
        }

        let beginning_balance = remaining;
        let interest_portion = if interest_rate == 0.0 {
            0.0
        } else {
            beginning_balance * interest_rate / 100.0
        };

        let mut principal_portion = (annual_payment - interest_portion).min(beginning_balance);
        if principal_portion < 0.0 {
            // Payment does not cover interest; the balance holds steady
            warn!(
                "year {}: payment ({:.2}) less than interest due ({:.2})",
                year, annual_payment, interest_portion
            );
            principal_portion = 0.0;
        }

        let ending_balance = (beginning_balance - principal_portion).max(0.0);
        cumulative_interest += interest_portion;
        cumulative_principal += principal_portion;

        schedule.push(AmortizationYear {
            year,
            beginning_balance,
            interest_portion,
            principal_portion,
            ending_balance,
            cumulative_interest,
            cumulative_principal,
        });

        remaining = ending_balance;

        if ending_balance <= PAYOFF_TOLERANCE {
            for future_year in (year + 1)..=loan_term {
                schedule.push(AmortizationYear::zero_filled(
                    future_year,
                    cumulative_interest,
                    cumulative_principal,
                ));
            }
            break;
        }
    }

    schedule
}

/// Remaining loan balance at the end of a given year.
///
/// Year 0 returns the original loan amount. Re-derives the recurrence in
/// O(year) without building the full schedule.
pub fn balance_at(loan_amount: f64, annual_payment: f64, interest_rate: f64, year: u32) -> f64 {
    if loan_amount <= 0.0 {
        return 0.0;
    }
    if year == 0 {
        return loan_amount;
    }

    let mut remaining = loan_amount;
    for _ in 1..=year {
        if remaining <= 0.0 {
            break;
        }
        let interest = if interest_rate == 0.0 {
            0.0
        } else {
            remaining * interest_rate / 100.0
        };
        let principal = (annual_payment - interest).min(remaining).max(0.0);
        remaining = (remaining - principal).max(0.0);
    }

    remaining
}

/// Interest/principal breakdown for a single year
#[derive(Debug, Clone, Default)]
pub struct PaymentBreakdown {
    pub beginning_balance: f64,
    pub interest_portion: f64,
    pub principal_portion: f64,
    pub ending_balance: f64,
}

/// Payment breakdown for a specific year, re-derived from the recurrence.
///
/// Returns all zeros for year 0 or once the loan is paid off.
pub fn breakdown_at(
    loan_amount: f64,
    annual_payment: f64,
    interest_rate: f64,
    year: u32,
) -> PaymentBreakdown {
    if year == 0 {
        return PaymentBreakdown::default();
    }

    let beginning_balance = balance_at(loan_amount, annual_payment, interest_rate, year - 1);
    if beginning_balance <= 0.0 {
        return PaymentBreakdown::default();
    }

    let interest_portion = if interest_rate == 0.0 {
        0.0
    } else {
        beginning_balance * interest_rate / 100.0
    };
    let principal_portion = (annual_payment - interest_portion)
        .min(beginning_balance)
        .max(0.0);
    let ending_balance = (beginning_balance - principal_portion).max(0.0);

    PaymentBreakdown {
        beginning_balance,
        interest_portion,
        principal_portion,
        ending_balance,
    }
}

/// Lifetime totals for a loan
#[derive(Debug, Clone, Default)]
pub struct LoanSummary {
    pub total_payments: f64,
    pub total_interest: f64,
    pub total_principal: f64,
    /// Average annual interest cost as a fraction of the loan, in percent
    pub effective_rate: f64,
}

/// Summarize total payments and interest over the life of the loan.
pub fn loan_summary(
    loan_amount: f64,
    annual_payment: f64,
    interest_rate: f64,
    loan_term: u32,
) -> LoanSummary {
    let schedule = amortization_schedule(loan_amount, annual_payment, interest_rate, loan_term);
    let Some(final_year) = schedule.last() else {
        return LoanSummary::default();
    };

    let total_interest = final_year.cumulative_interest;
    let total_principal = final_year.cumulative_principal;
    let effective_rate = if loan_amount > 0.0 && loan_term > 0 {
        (total_interest / loan_amount) / loan_term as f64 * 100.0
    } else {
        0.0
    };

    LoanSummary {
        total_payments: total_interest + total_principal,
        total_interest,
        total_principal,
        effective_rate,
    }
}
