pub use ec2_pricing_core::{
    Catalog, CatalogMetadata, CostBreakdown, Currency, FilterOptions, InstancePage,
    InstanceRecord, PricingPlan, QueryParameters, RawQueryParameters,
};
use serde::{Deserialize, Serialize};

/// Response to a catalog refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub message: String,
    pub total_instances: usize,
}

impl RefreshResponse {
    pub fn new(total_instances: usize) -> Self {
        Self {
            message: "Data refreshed successfully".to_string(),
            total_instances,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

/// Body of `GET /api`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiIndexResponse {
    pub status: String,
    pub message: String,
    pub endpoints: Vec<String>,
}

/// Estimate query string as received
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RawEstimateQuery {
    pub instance: Option<String>,
    pub plan: Option<String>,
    pub count: Option<String>,
    pub hours: Option<String>,
    pub currency: Option<String>,
}

/// Estimate request after defaults have been applied
#[derive(Debug, Clone, PartialEq)]
pub struct EstimateRequest {
    pub instance_name: String,
    pub plan: PricingPlan,
    pub instance_count: u32,
    pub hours_per_month: f64,
    pub currency: Currency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateResponse {
    pub instance_name: String,
    pub plan: PricingPlan,
    pub instance_count: u32,
    pub hours_per_month: f64,
    pub hourly_rate: f64,
    pub monthly_cost: f64,
    pub currency: Currency,
    pub exchange_rate: f64,
    pub converted_hourly_rate: f64,
    pub converted_monthly_cost: f64,
    pub breakdown: CostBreakdown,
}
