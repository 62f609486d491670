//! Terminal value for the hold-forever ownership strategy
//!
//! The property is split into land and a depreciable building. Land
//! compounds at the market appreciation rate for the full horizon. The
//! building is first depreciated straight-line, and the residual
//! post-depreciation value is then compounded at the appreciation rate for
//! the same horizon. Appreciation applies to the depreciated basis, not
//! the original building value; this ordering is part of the model.

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};

/// Terminal value components at the end of the analysis horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalValue {
    /// Land value at purchase
    pub initial_land_value: f64,
    /// Building value at purchase
    pub initial_building_value: f64,
    /// Land value at end of horizon
    pub land_value_end: f64,
    /// Building value at end of horizon, after depreciation then appreciation
    pub building_value_end: f64,
    /// Land plus building at end of horizon
    pub terminal_property_value: f64,
    /// Total straight-line depreciation taken over the horizon
    pub accumulated_depreciation: f64,
    /// Terminal property value net of the remaining loan; may be negative
    pub net_property_equity: f64,
}

/// Compound a value at an annual percentage rate over `years`.
fn appreciate(value: f64, rate_pct: f64, years: u32) -> f64 {
    if years == 0 || rate_pct == 0.0 {
        return value;
    }
    value * (1.0 + rate_pct / 100.0).powi(years as i32)
}

/// Terminal value of the property at the end of the analysis horizon.
///
/// Accumulated depreciation is
/// `min(building_value, building_value * horizon / depreciation_period)`;
/// a non-positive depreciation period means no depreciation. Equity nets
/// the terminal value against the remaining loan balance and may go
/// negative.
pub fn terminal_value(
    purchase_price: f64,
    land_value_pct: f64,
    appreciation_rate: f64,
    depreciation_period: u32,
    analysis_period: u32,
    remaining_loan_balance: f64,
) -> Result<TerminalValue> {
    if purchase_price <= 0.0 {
        return Err(AnalysisError::domain("purchase price must be positive"));
    }
    if !(0.0..=100.0).contains(&land_value_pct) {
        return Err(AnalysisError::domain(
            "land value percentage must be between 0 and 100",
        ));
    }
    if analysis_period == 0 {
        return Err(AnalysisError::domain("analysis period must be positive"));
    }

    let initial_land_value = purchase_price * land_value_pct / 100.0;
    let initial_building_value = purchase_price - initial_land_value;

    let land_value_end = appreciate(initial_land_value, appreciation_rate, analysis_period);

    let accumulated_depreciation = if depreciation_period == 0 {
        0.0
    } else {
        let straight_line =
            initial_building_value * analysis_period as f64 / depreciation_period as f64;
        straight_line.min(initial_building_value)
    };
    let depreciated_building_value = initial_building_value - accumulated_depreciation;

    // Appreciation applies to the depreciated residual, not the original
    let building_value_end =
        appreciate(depreciated_building_value, appreciation_rate, analysis_period);

    let terminal_property_value = land_value_end + building_value_end;
    let net_property_equity = terminal_property_value - remaining_loan_balance;

    Ok(TerminalValue {
        initial_land_value,
        initial_building_value,
        land_value_end,
        building_value_end,
        terminal_property_value,
        accumulated_depreciation,
        net_property_equity,
    })
}

/// Terminal value of the rental scenario.
///
/// Renting accrues no property equity; the only horizon-end asset is the
/// security deposit, recovered with inflation.
pub fn rental_terminal_value(
    security_deposit: f64,
    inflation_rate: f64,
    analysis_period: u32,
) -> f64 {
    appreciate(security_deposit, inflation_rate, analysis_period)
}
