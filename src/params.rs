//! Model parameters for the buy-vs-rent analysis
//!
//! A single immutable configuration struct with typed named fields replaces
//! the loose key/value inputs of upstream callers. Secondary fields carry
//! documented defaults applied once at the deserialization boundary; the
//! engine itself never substitutes defaults for caller-supplied values.

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};

/// Complete set of financial inputs for one analysis.
///
/// Callers are expected to hand over values already range-checked by the
/// upstream validation layer; [`ModelParameters::validate`] re-checks only
/// the structural invariants the engines rely on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    /// Total property acquisition cost
    pub purchase_price: f64,
    /// Down payment as a percentage of purchase price (0-100)
    pub down_payment_pct: f64,
    /// Annual mortgage interest rate (percentage)
    pub interest_rate: f64,
    /// Loan term in years
    #[serde(default = "default_loan_term")]
    pub loan_term: u32,
    /// Analysis horizon in years
    #[serde(default = "default_analysis_period")]
    pub analysis_period: u32,
    /// One-time closing costs and fees; absent means 5% of purchase price
    #[serde(default)]
    pub transaction_costs: Option<f64>,

    /// Current annual rent for the equivalent space
    pub current_annual_rent: f64,
    /// Contractual annual rent increase rate (percentage)
    pub rent_increase_rate: f64,
    /// Discount rate for present-value calculations (percentage)
    pub cost_of_capital: f64,

    /// Property tax rate as a percentage of purchase price
    #[serde(default = "default_property_tax_rate")]
    pub property_tax_rate: f64,
    /// Annual property tax assessment increase rate (percentage)
    #[serde(default = "default_property_tax_escalation")]
    pub property_tax_escalation: f64,
    /// Annual property insurance cost (base year)
    #[serde(default = "default_insurance_cost")]
    pub insurance_cost: f64,
    /// Annual maintenance cost (base year)
    #[serde(default = "default_annual_maintenance")]
    pub annual_maintenance: f64,
    /// Annual property management fees (base year)
    #[serde(default)]
    pub property_management: f64,
    /// Capital expenditure reserve as a percentage of purchase price
    #[serde(default = "default_capex_reserve_rate")]
    pub capex_reserve_rate: f64,
    /// Obsolescence risk cost as a percentage of purchase price
    #[serde(default = "default_obsolescence_risk_rate")]
    pub obsolescence_risk_rate: f64,
    /// General inflation rate (percentage)
    #[serde(default = "default_inflation_rate")]
    pub inflation_rate: f64,

    /// Annual market appreciation rate for the property (percentage)
    #[serde(default = "default_market_appreciation_rate")]
    pub market_appreciation_rate: f64,
    /// Land value as a percentage of purchase price (0-100)
    #[serde(default = "default_land_value_pct")]
    pub land_value_pct: f64,
    /// Straight-line depreciation period for the building, in years
    #[serde(default = "default_depreciation_period")]
    pub depreciation_period: u32,

    /// Corporate tax rate for deduction benefits (percentage)
    #[serde(default = "default_corporate_tax_rate")]
    pub corporate_tax_rate: f64,
    /// Whether mortgage interest is tax deductible
    #[serde(default = "default_true")]
    pub interest_deductible: bool,
    /// Whether property taxes are tax deductible
    #[serde(default = "default_true")]
    pub property_tax_deductible: bool,
    /// Whether rent expense is tax deductible
    #[serde(default = "default_true")]
    pub rent_deductible: bool,

    /// Security deposit paid when renting
    #[serde(default)]
    pub security_deposit: f64,
    /// One-time rental agent commission
    #[serde(default)]
    pub rental_commission: f64,
    /// One-time moving costs
    #[serde(default)]
    pub moving_costs: f64,
    /// One-time space improvement cost on purchase
    #[serde(default)]
    pub space_improvement_cost: f64,
}

fn default_loan_term() -> u32 { 20 }
fn default_analysis_period() -> u32 { 25 }
fn default_property_tax_rate() -> f64 { 1.2 }
fn default_property_tax_escalation() -> f64 { 2.0 }
fn default_insurance_cost() -> f64 { 5_000.0 }
fn default_annual_maintenance() -> f64 { 10_000.0 }
fn default_capex_reserve_rate() -> f64 { 1.5 }
fn default_obsolescence_risk_rate() -> f64 { 0.5 }
fn default_inflation_rate() -> f64 { 3.0 }
fn default_market_appreciation_rate() -> f64 { 3.0 }
fn default_land_value_pct() -> f64 { 25.0 }
fn default_depreciation_period() -> u32 { 39 }
fn default_corporate_tax_rate() -> f64 { 25.0 }
fn default_true() -> bool { true }

impl Default for ModelParameters {
    /// Reference scenario: 500k purchase at 30% down, 5% over 20 years,
    /// against 24k annual rent growing 3%, analyzed over 25 years at an
    /// 8% cost of capital.
    fn default() -> Self {
        Self {
            purchase_price: 500_000.0,
            down_payment_pct: 30.0,
            interest_rate: 5.0,
            loan_term: default_loan_term(),
            analysis_period: default_analysis_period(),
            transaction_costs: None,
            current_annual_rent: 24_000.0,
            rent_increase_rate: 3.0,
            cost_of_capital: 8.0,
            property_tax_rate: default_property_tax_rate(),
            property_tax_escalation: default_property_tax_escalation(),
            insurance_cost: default_insurance_cost(),
            annual_maintenance: default_annual_maintenance(),
            property_management: 0.0,
            capex_reserve_rate: default_capex_reserve_rate(),
            obsolescence_risk_rate: default_obsolescence_risk_rate(),
            inflation_rate: default_inflation_rate(),
            market_appreciation_rate: default_market_appreciation_rate(),
            land_value_pct: default_land_value_pct(),
            depreciation_period: default_depreciation_period(),
            corporate_tax_rate: default_corporate_tax_rate(),
            interest_deductible: true,
            property_tax_deductible: true,
            rent_deductible: true,
            security_deposit: 0.0,
            rental_commission: 0.0,
            moving_costs: 0.0,
            space_improvement_cost: 0.0,
        }
    }
}

impl ModelParameters {
    /// Resolve the remaining optional defaults, once, at the boundary.
    ///
    /// Transaction costs default to 5% of the purchase price when absent.
    /// Calling this on already-resolved parameters is a no-op, so two inputs
    /// that differ only in whether the default was spelled out canonicalize
    /// to the same value.
    pub fn resolve_defaults(mut self) -> Self {
        if self.transaction_costs.is_none() {
            self.transaction_costs = Some(self.purchase_price * 0.05);
        }
        self
    }

    /// Transaction costs with the documented default applied
    pub fn transaction_costs_value(&self) -> f64 {
        self.transaction_costs
            .unwrap_or(self.purchase_price * 0.05)
    }

    /// Re-check structural invariants.
    ///
    /// Range validation proper happens upstream; this only rejects inputs
    /// the engines cannot evaluate at all.
    pub fn validate(&self) -> Result<()> {
        let finite_fields = [
            ("purchase_price", self.purchase_price),
            ("down_payment_pct", self.down_payment_pct),
            ("interest_rate", self.interest_rate),
            ("current_annual_rent", self.current_annual_rent),
            ("rent_increase_rate", self.rent_increase_rate),
            ("cost_of_capital", self.cost_of_capital),
            ("property_tax_rate", self.property_tax_rate),
            ("property_tax_escalation", self.property_tax_escalation),
            ("insurance_cost", self.insurance_cost),
            ("annual_maintenance", self.annual_maintenance),
            ("property_management", self.property_management),
            ("capex_reserve_rate", self.capex_reserve_rate),
            ("obsolescence_risk_rate", self.obsolescence_risk_rate),
            ("inflation_rate", self.inflation_rate),
            ("market_appreciation_rate", self.market_appreciation_rate),
            ("land_value_pct", self.land_value_pct),
            ("corporate_tax_rate", self.corporate_tax_rate),
            ("transaction_costs", self.transaction_costs_value()),
            ("security_deposit", self.security_deposit),
            ("rental_commission", self.rental_commission),
            ("moving_costs", self.moving_costs),
            ("space_improvement_cost", self.space_improvement_cost),
        ];
        for (name, value) in finite_fields {
            if !value.is_finite() {
                return Err(AnalysisError::structural(format!(
                    "{} is not a finite number",
                    name
                )));
            }
        }

        if self.purchase_price <= 0.0 {
            return Err(AnalysisError::domain("purchase price must be positive"));
        }
        if !(0.0..=100.0).contains(&self.down_payment_pct) {
            return Err(AnalysisError::domain(
                "down payment percentage must be between 0 and 100",
            ));
        }
        if self.loan_term == 0 {
            return Err(AnalysisError::domain("loan term must be positive"));
        }
        if self.analysis_period == 0 {
            return Err(AnalysisError::domain("analysis period must be positive"));
        }
        if !(0.0..=100.0).contains(&self.land_value_pct) {
            return Err(AnalysisError::domain(
                "land value percentage must be between 0 and 100",
            ));
        }

        Ok(())
    }

    /// Substitute a sampled value into a named parameter.
    ///
    /// Used by the simulation layer to apply per-trial draws. Unknown names
    /// are a structural error; the orchestrator treats that as a failed
    /// trial, never a fatal one.
    pub fn apply_override(&mut self, name: &str, value: f64) -> Result<()> {
        match name {
            "purchase_price" => self.purchase_price = value,
            "down_payment_pct" => self.down_payment_pct = value,
            "interest_rate" => self.interest_rate = value,
            "current_annual_rent" => self.current_annual_rent = value,
            "rent_increase_rate" => self.rent_increase_rate = value,
            "cost_of_capital" => self.cost_of_capital = value,
            "property_tax_rate" => self.property_tax_rate = value,
            "property_tax_escalation" => self.property_tax_escalation = value,
            "insurance_cost" => self.insurance_cost = value,
            "annual_maintenance" => self.annual_maintenance = value,
            "property_management" => self.property_management = value,
            "capex_reserve_rate" => self.capex_reserve_rate = value,
            "obsolescence_risk_rate" => self.obsolescence_risk_rate = value,
            "inflation_rate" => self.inflation_rate = value,
            "market_appreciation_rate" => self.market_appreciation_rate = value,
            "land_value_pct" => self.land_value_pct = value,
            "corporate_tax_rate" => self.corporate_tax_rate = value,
            "transaction_costs" => self.transaction_costs = Some(value),
            "security_deposit" => self.security_deposit = value,
            "rental_commission" => self.rental_commission = value,
            "moving_costs" => self.moving_costs = value,
            "space_improvement_cost" => self.space_improvement_cost = value,
            other => {
                return Err(AnalysisError::structural(format!(
                    "unknown model variable: {}",
                    other
                )))
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_defaults_fill_secondary_fields() {
        let json = r#"{
            "purchase_price": 500000,
            "down_payment_pct": 30,
            "interest_rate": 5.0,
            "current_annual_rent": 24000,
            "rent_increase_rate": 3.0,
            "cost_of_capital": 8.0
        }"#;
        let params: ModelParameters = serde_json::from_str(json).unwrap();

        assert_eq!(params.loan_term, 20);
        assert_eq!(params.analysis_period, 25);
        assert_eq!(params.property_tax_rate, 1.2);
        assert_eq!(params.insurance_cost, 5_000.0);
        assert_eq!(params.depreciation_period, 39);
        assert!(params.interest_deductible);
        assert!(params.rent_deductible);
        assert_eq!(params.transaction_costs, None);
    }

    #[test]
    fn test_caller_values_never_overridden() {
        let json = r#"{
            "purchase_price": 500000,
            "down_payment_pct": 30,
            "interest_rate": 5.0,
            "current_annual_rent": 24000,
            "rent_increase_rate": 3.0,
            "cost_of_capital": 8.0,
            "loan_term": 15,
            "transaction_costs": 12000,
            "interest_deductible": false
        }"#;
        let params: ModelParameters = serde_json::from_str::<ModelParameters>(json).unwrap().resolve_defaults();

        assert_eq!(params.loan_term, 15);
        assert_eq!(params.transaction_costs, Some(12_000.0));
        assert!(!params.interest_deductible);
    }

    #[test]
    fn test_transaction_cost_default_is_proportional() {
        let params = ModelParameters::default().resolve_defaults();
        assert_eq!(params.transaction_costs, Some(25_000.0)); // 5% of 500k

        // Resolving twice changes nothing
        let again = params.clone().resolve_defaults();
        assert_eq!(again, params);
    }

    #[test]
    fn test_validate_accepts_reference_scenario() {
        assert!(ModelParameters::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_domain_violations() {
        let mut params = ModelParameters::default();
        params.purchase_price = 0.0;
        assert!(matches!(
            params.validate(),
            Err(crate::error::AnalysisError::Domain(_))
        ));

        let mut params = ModelParameters::default();
        params.down_payment_pct = 120.0;
        assert!(params.validate().is_err());

        let mut params = ModelParameters::default();
        params.analysis_period = 0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        let mut params = ModelParameters::default();
        params.interest_rate = f64::NAN;
        assert!(matches!(
            params.validate(),
            Err(crate::error::AnalysisError::Structural(_))
        ));
    }

    #[test]
    fn test_apply_override() {
        let mut params = ModelParameters::default();
        params.apply_override("interest_rate", 6.5).unwrap();
        assert_eq!(params.interest_rate, 6.5);

        params.apply_override("transaction_costs", 30_000.0).unwrap();
        assert_eq!(params.transaction_costs, Some(30_000.0));

        assert!(params.apply_override("no_such_field", 1.0).is_err());
    }
}
