//! Annual operating cost aggregation
//!
//! Pure functions of (parameters, year). Property taxes escalate at their
//! own assessment rate; every other ownership cost escalates with general
//! inflation; rent and subletting escalate at the combined
//! inflation-and-growth rate. All escalation is Year-1 indexed.

use crate::engine::escalation::{combined_growth_rate_pct, escalate};
use crate::error::Result;
use crate::params::ModelParameters;
use serde::{Deserialize, Serialize};

/// Ownership cost components for one analysis year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnershipCosts {
    pub year: u32,
    pub property_taxes: f64,
    pub insurance: f64,
    pub maintenance: f64,
    pub property_management: f64,
    pub capex_reserve: f64,
    pub obsolescence_cost: f64,
    /// Sum of all components above
    pub total_annual_cost: f64,
}

/// Rental cost for one analysis year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalCosts {
    pub year: u32,
    pub annual_rent: f64,
}

/// All ownership operating costs for a given year.
///
/// Tax, CapEx reserve, and obsolescence bases are percentages of the
/// purchase price; insurance, maintenance, and management are absolute
/// base-year amounts.
pub fn annual_ownership_costs(params: &ModelParameters, year: u32) -> Result<OwnershipCosts> {
    let price = params.purchase_price;

    let property_tax_base = price * params.property_tax_rate / 100.0;
    let property_taxes = escalate(property_tax_base, params.property_tax_escalation, year, true)?;

    let insurance = escalate(params.insurance_cost, params.inflation_rate, year, true)?;
    let maintenance = escalate(params.annual_maintenance, params.inflation_rate, year, true)?;
    let property_management =
        escalate(params.property_management, params.inflation_rate, year, true)?;

    let capex_base = price * params.capex_reserve_rate / 100.0;
    let capex_reserve = escalate(capex_base, params.inflation_rate, year, true)?;

    let obsolescence_base = price * params.obsolescence_risk_rate / 100.0;
    let obsolescence_cost = escalate(obsolescence_base, params.inflation_rate, year, true)?;

    let total_annual_cost = property_taxes
        + insurance
        + maintenance
        + property_management
        + capex_reserve
        + obsolescence_cost;

    Ok(OwnershipCosts {
        year,
        property_taxes,
        insurance,
        maintenance,
        property_management,
        capex_reserve,
        obsolescence_cost,
        total_annual_cost,
    })
}

/// Escalated rent for a given year.
///
/// Rent grows at the combined rate of inflation and the contractual
/// increase, compounded.
pub fn annual_rental_costs(params: &ModelParameters, year: u32) -> Result<RentalCosts> {
    let combined_rate = combined_growth_rate_pct(params.inflation_rate, params.rent_increase_rate);
    let annual_rent = escalate(params.current_annual_rent, combined_rate, year, true)?;

    Ok(RentalCosts { year, annual_rent })
}

/// Inputs for a subletting income estimate
#[derive(Debug, Clone)]
pub struct SublettingTerms {
    /// Whether subletting is allowed and feasible
    pub enabled: bool,
    /// Total property size in square meters
    pub property_size_sqm: f64,
    /// Space needed for own operations
    pub space_needed_sqm: f64,
    /// Square meters the owner plans to sublet
    pub subletting_space_sqm: f64,
    /// Base-year subletting rate per square meter
    pub rate_per_sqm: f64,
}

/// Subletting result for one year
#[derive(Debug, Clone, Default)]
pub struct SublettingIncome {
    pub available_space: f64,
    pub subletting_space: f64,
    pub income: f64,
}

/// Income from subletting surplus space in the ownership scenario.
///
/// The sublet space is capped by what is actually available, and the rate
/// escalates at the same combined rate as rent. Disabled terms yield zeros.
pub fn subletting_income(
    terms: &SublettingTerms,
    params: &ModelParameters,
    year: u32,
) -> Result<SublettingIncome> {
    if !terms.enabled {
        return Ok(SublettingIncome::default());
    }

    let available_space = (terms.property_size_sqm - terms.space_needed_sqm).max(0.0);
    let subletting_space = terms.subletting_space_sqm.min(available_space);

    let combined_rate = combined_growth_rate_pct(params.inflation_rate, params.rent_increase_rate);
    let escalated_rate = escalate(terms.rate_per_sqm, combined_rate, year, true)?;

    Ok(SublettingIncome {
        available_space,
        subletting_space,
        income: subletting_space * escalated_rate,
    })
}
