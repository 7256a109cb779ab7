use prometheus::{
    opts, CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, IntCounter, Registry,
    TextEncoder,
};

use crate::shared::error::{PricingError, PricingResult};

fn metrics_error(err: impl std::fmt::Display) -> PricingError {
    PricingError::Internal(format!("metrics: {err}"))
}

pub struct ObservabilityRepository {
    registry: Registry,
    catalog_instances: Gauge,
    catalog_refresh_total: IntCounter,
    catalog_fallback_total: IntCounter,
    api_request_total: CounterVec,
    api_request_latency_seconds: HistogramVec,
}

impl ObservabilityRepository {
    pub fn new() -> PricingResult<Self> {
        let registry = Registry::new();

        let catalog_instances = Gauge::with_opts(opts!(
            "pricing_catalog_instances",
            "Instances in the cached catalog"
        ))
        .map_err(metrics_error)?;
        let catalog_refresh_total = IntCounter::with_opts(opts!(
            "pricing_catalog_refresh_total",
            "Catalog loads and refreshes total"
        ))
        .map_err(metrics_error)?;
        let catalog_fallback_total = IntCounter::with_opts(opts!(
            "pricing_catalog_fallback_total",
            "Catalog loads that fell back to sample data"
        ))
        .map_err(metrics_error)?;
        let api_request_total = CounterVec::new(
            opts!("pricing_api_request_total", "Pricing API request total"),
            &["endpoint", "status"],
        )
        .map_err(metrics_error)?;
        let api_request_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "pricing_api_request_latency_seconds",
                "Pricing API request latency (seconds)",
            ),
            &["endpoint"],
        )
        .map_err(metrics_error)?;

        registry
            .register(Box::new(catalog_instances.clone()))
            .map_err(metrics_error)?;
        registry
            .register(Box::new(catalog_refresh_total.clone()))
            .map_err(metrics_error)?;
        registry
            .register(Box::new(catalog_fallback_total.clone()))
            .map_err(metrics_error)?;
        registry
            .register(Box::new(api_request_total.clone()))
            .map_err(metrics_error)?;
        registry
            .register(Box::new(api_request_latency_seconds.clone()))
            .map_err(metrics_error)?;

        Ok(Self {
            registry,
            catalog_instances,
            catalog_refresh_total,
            catalog_fallback_total,
            api_request_total,
            api_request_latency_seconds,
        })
    }

    pub fn set_catalog_instances(&self, count: f64) {
        self.catalog_instances.set(count);
    }

    pub fn inc_catalog_refresh_total(&self) {
        self.catalog_refresh_total.inc();
    }

    pub fn inc_catalog_fallback_total(&self) {
        self.catalog_fallback_total.inc();
    }

    pub fn observe_api_request(&self, endpoint: &str, status: &str, seconds: f64) {
        self.api_request_total
            .with_label_values(&[endpoint, status])
            .inc();
        self.api_request_latency_seconds
            .with_label_values(&[endpoint])
            .observe(seconds);
    }

    pub fn render_metrics(&self) -> PricingResult<String> {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        let families = self.registry.gather();
        encoder
            .encode(&families, &mut buffer)
            .map_err(metrics_error)?;
        String::from_utf8(buffer).map_err(metrics_error)
    }
}
