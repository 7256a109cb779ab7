use crate::features::observability::repo::ObservabilityRepository;
use crate::shared::error::PricingResult;
use std::sync::Arc;

pub struct ObservabilityService {
    repo: Arc<ObservabilityRepository>,
}

impl ObservabilityService {
    pub fn new(repo: Arc<ObservabilityRepository>) -> Self {
        Self { repo }
    }

    pub fn record_api_request(&self, endpoint: &str, status: u16, seconds: f64) {
        self.repo
            .observe_api_request(endpoint, &status.to_string(), seconds);
    }

    /// Records one completed catalog load
    pub fn record_catalog_load(&self, instances: usize, used_fallback: bool) {
        self.repo.inc_catalog_refresh_total();
        self.repo.set_catalog_instances(instances as f64);
        if used_fallback {
            self.repo.inc_catalog_fallback_total();
        }
    }

    pub fn render_metrics(&self) -> PricingResult<String> {
        self.repo.render_metrics()
    }
}
