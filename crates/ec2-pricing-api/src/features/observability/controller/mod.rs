use crate::features::observability::repo::ObservabilityRepository;
use crate::features::observability::service::ObservabilityService;
use crate::shared::error::PricingResult;
use std::sync::Arc;

pub struct ObservabilityController {
    service: ObservabilityService,
}

impl ObservabilityController {
    pub fn new(service: ObservabilityService) -> Self {
        Self { service }
    }

    /// Controller over a fresh registry
    pub fn with_new_registry() -> PricingResult<Arc<Self>> {
        let repo = Arc::new(ObservabilityRepository::new()?);
        Ok(Arc::new(Self::new(ObservabilityService::new(repo))))
    }

    pub fn record_api_request(&self, endpoint: &str, status: u16, seconds: f64) {
        self.service.record_api_request(endpoint, status, seconds);
    }

    pub fn record_catalog_load(&self, instances: usize, used_fallback: bool) {
        self.service.record_catalog_load(instances, used_fallback);
    }

    pub fn render_metrics(&self) -> PricingResult<String> {
        self.service.render_metrics()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_render_contains_known_metric_names() {
        let controller = ObservabilityController::with_new_registry().unwrap();
        controller.record_api_request("/api/health", 200, 0.01);
        let rendered = controller.render_metrics().unwrap();
        assert!(rendered.contains("pricing_api_request_total"));
        assert!(rendered.contains("pricing_catalog_refresh_total 0"));
    }
}
