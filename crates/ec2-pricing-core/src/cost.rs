//! Monthly cost estimation for a selected instance.
//!
//! Inputs are not range-checked here. Callers bound the instance count
//! (>= 1) and hours per month (1..=744); anything else is computed through.

use crate::catalog::InstanceRecord;
use crate::parsing::first_decimal;
use crate::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hours in an average month, used for normalized monthly prices.
pub const HOURS_PER_MONTH: f64 = 730.0;
/// Hours in a three year savings-plan term (365 x 24 x 3).
pub const COMMITMENT_HOURS: f64 = 26_280.0;
/// Discount applied to the on-demand rate when no savings rate is listed.
pub const SAVINGS_FALLBACK_FACTOR: f64 = 0.7;
pub const DEFAULT_USD_TO_INR: f64 = 83.5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PricingPlan {
    #[default]
    OnDemand,
    SavingsPlan,
}

impl PricingPlan {
    pub fn as_str(self) -> &'static str {
        match self {
            PricingPlan::OnDemand => "on-demand",
            PricingPlan::SavingsPlan => "savings-plan",
        }
    }

    pub fn hourly_rate(self, instance: &InstanceRecord) -> f64 {
        match self {
            PricingPlan::OnDemand => instance.on_demand_hourly_cost,
            PricingPlan::SavingsPlan => savings_plan_rate(instance),
        }
    }
}

impl fmt::Display for PricingPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PricingPlan {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "on-demand" => Ok(PricingPlan::OnDemand),
            "savings-plan" => Ok(PricingPlan::SavingsPlan),
            other => Err(CoreError::UnknownPricingPlan(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "INR")]
    Inr,
}

impl Currency {
    /// Converts a USD amount into this currency.
    pub fn convert(self, amount_usd: f64, usd_to_inr: f64) -> f64 {
        match self {
            Currency::Usd => amount_usd,
            Currency::Inr => amount_usd * usd_to_inr,
        }
    }
}

impl FromStr for Currency {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "INR" => Ok(Currency::Inr),
            _ => Err(CoreError::UnknownCurrency(s.to_string())),
        }
    }
}

/// Savings-plan hourly rate listed in the "potential effective hourly cost"
/// column, or 70% of the on-demand rate when the column has no number.
pub fn savings_plan_rate(instance: &InstanceRecord) -> f64 {
    first_decimal(&instance.potential_effective_hourly_cost)
        .unwrap_or(instance.on_demand_hourly_cost * SAVINGS_FALLBACK_FACTOR)
}

pub fn estimate(
    instance: &InstanceRecord,
    plan: PricingPlan,
    instance_count: f64,
    hours_per_month: f64,
) -> f64 {
    plan.hourly_rate(instance) * instance_count * hours_per_month
}

/// On-demand vs. savings-plan comparison for one instance type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub on_demand_hourly_rate: f64,
    pub savings_plan_hourly_rate: f64,
    pub savings_percent: f64,
    pub total_instance_hours: f64,
    pub on_demand_monthly_cost: f64,
    pub savings_plan_monthly_cost: f64,
    pub normalized_on_demand_monthly: f64,
    pub normalized_savings_plan_monthly: f64,
    pub three_year_commitment: f64,
    pub breakeven_hours_per_month: f64,
}

impl CostBreakdown {
    pub fn for_instance(instance: &InstanceRecord, instance_count: f64, hours_per_month: f64) -> Self {
        let on_demand = instance.on_demand_hourly_cost;
        let savings = savings_plan_rate(instance);
        let ratio = if on_demand > 0.0 { savings / on_demand } else { 0.0 };

        Self {
            on_demand_hourly_rate: on_demand,
            savings_plan_hourly_rate: savings,
            savings_percent: if on_demand > 0.0 { (1.0 - ratio) * 100.0 } else { 0.0 },
            total_instance_hours: instance_count * hours_per_month,
            on_demand_monthly_cost: estimate(
                instance,
                PricingPlan::OnDemand,
                instance_count,
                hours_per_month,
            ),
            savings_plan_monthly_cost: estimate(
                instance,
                PricingPlan::SavingsPlan,
                instance_count,
                hours_per_month,
            ),
            normalized_on_demand_monthly: on_demand * HOURS_PER_MONTH * instance_count,
            normalized_savings_plan_monthly: savings * HOURS_PER_MONTH * instance_count,
            three_year_commitment: savings * COMMITMENT_HOURS * instance_count,
            breakeven_hours_per_month: ratio * HOURS_PER_MONTH,
        }
    }
}
