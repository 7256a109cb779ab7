pub mod catalog;
pub mod cost;
pub mod parsing;
pub mod query;

pub use catalog::{
    sample_catalog, Catalog, CatalogMetadata, CatalogOrigin, InstanceRecord, PricingProfile,
};
pub use cost::{estimate, savings_plan_rate, CostBreakdown, Currency, PricingPlan};
pub use query::{
    filter_options, query, FilterOptions, InstancePage, Pagination, QueryParameters,
    RawQueryParameters,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
    #[error("Unknown pricing plan: {0}")]
    UnknownPricingPlan(String),
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;

/// JSON error body returned by every failing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
