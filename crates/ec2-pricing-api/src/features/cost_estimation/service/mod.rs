use crate::features::catalog::service::CatalogService;
use crate::shared::error::{PricingError, PricingResult};
use crate::shared::types::{
    CostBreakdown, Currency, EstimateRequest, EstimateResponse, PricingPlan, RawEstimateQuery,
};
use ec2_pricing_core::cost::HOURS_PER_MONTH;
use ec2_pricing_core::parsing::{parse_decimal, parse_integer};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Longest calendar month
pub const MAX_HOURS_PER_MONTH: f64 = 744.0;

/// Monthly cost estimates for a single instance type
pub struct CostEstimationService {
    catalog: Arc<CatalogService>,
    usd_to_inr: f64,
}

impl CostEstimationService {
    pub fn new(catalog: Arc<CatalogService>, usd_to_inr: f64) -> Self {
        Self {
            catalog,
            usd_to_inr,
        }
    }

    /// Applies defaults to the raw query. Unrecognised values fall back to
    /// the default rather than failing the request. The count is the leading
    /// whole number, at least 1; hours are clamped to a single month.
    pub fn parse_request(raw: RawEstimateQuery) -> EstimateRequest {
        fn parsed<T: FromStr>(value: Option<&str>, default: T) -> T {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }

        fn number(value: Option<&str>, default: f64) -> f64 {
            value
                .and_then(|v| parse_decimal(v).ok())
                .unwrap_or(default)
        }

        fn count(value: Option<&str>) -> u32 {
            value
                .and_then(|v| parse_integer(v).ok())
                .map(|n| n.clamp(1, i64::from(u32::MAX)) as u32)
                .unwrap_or(1)
        }

        EstimateRequest {
            instance_name: raw.instance.unwrap_or_default().trim().to_string(),
            plan: parsed(raw.plan.as_deref(), PricingPlan::default()),
            instance_count: count(raw.count.as_deref()),
            hours_per_month: number(raw.hours.as_deref(), HOURS_PER_MONTH)
                .clamp(1.0, MAX_HOURS_PER_MONTH),
            currency: parsed(raw.currency.as_deref(), Currency::default()),
        }
    }

    pub async fn estimate(&self, request: EstimateRequest) -> PricingResult<EstimateResponse> {
        let catalog = self.catalog.get_cached().await;
        let instance = catalog
            .find(&request.instance_name)
            .ok_or_else(|| PricingError::InstanceNotFound(request.instance_name.clone()))?;

        let hourly_rate = request.plan.hourly_rate(instance);
        let instance_count = f64::from(request.instance_count);
        let monthly_cost = ec2_pricing_core::estimate(
            instance,
            request.plan,
            instance_count,
            request.hours_per_month,
        );
        let exchange_rate = match request.currency {
            Currency::Usd => 1.0,
            Currency::Inr => self.usd_to_inr,
        };

        debug!(
            instance = %request.instance_name,
            plan = %request.plan,
            monthly_cost,
            "Estimated monthly cost"
        );

        Ok(EstimateResponse {
            instance_name: instance.instance_name.clone(),
            plan: request.plan,
            instance_count: request.instance_count,
            hours_per_month: request.hours_per_month,
            hourly_rate,
            monthly_cost,
            currency: request.currency,
            exchange_rate,
            converted_hourly_rate: request.currency.convert(hourly_rate, self.usd_to_inr),
            converted_monthly_cost: request.currency.convert(monthly_cost, self.usd_to_inr),
            breakdown: CostBreakdown::for_instance(
                instance,
                instance_count,
                request.hours_per_month,
            ),
        })
    }
}
