use crate::features::cost_estimation::service::CostEstimationService;
use crate::shared::error::PricingResult;
use crate::shared::types::{EstimateResponse, RawEstimateQuery};
use std::sync::Arc;

pub struct CostEstimationController {
    service: Arc<CostEstimationService>,
}

impl CostEstimationController {
    pub fn new(service: Arc<CostEstimationService>) -> Self {
        Self { service }
    }

    pub async fn estimate(&self, raw: RawEstimateQuery) -> PricingResult<EstimateResponse> {
        let request = CostEstimationService::parse_request(raw);
        self.service.estimate(request).await
    }
}
