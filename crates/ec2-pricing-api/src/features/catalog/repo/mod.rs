pub mod xlsx;

use async_trait::async_trait;
use ec2_pricing_core::{sample_catalog, Catalog};
use std::sync::Arc;
use tracing::{info, warn};

use crate::shared::error::{PricingError, PricingResult};

/// Source of the tabular pricing data
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Read and normalize the full catalog
    async fn read(&self) -> PricingResult<Catalog>;

    /// Human readable location, used in logs
    fn describe(&self) -> String;
}

/// Source that always yields the built-in sample catalog
#[derive(Debug, Clone, Default)]
pub struct SampleCatalogSource;

impl SampleCatalogSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CatalogSource for SampleCatalogSource {
    async fn read(&self) -> PricingResult<Catalog> {
        Ok(sample_catalog())
    }

    fn describe(&self) -> String {
        "built-in sample data".to_string()
    }
}

/// Reads a catalog from a source, degrading to sample data on any failure.
pub struct CatalogLoader {
    source: Arc<dyn CatalogSource>,
}

impl CatalogLoader {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self { source }
    }

    /// Never fails; read errors are logged and replaced by the sample catalog.
    pub async fn load(&self) -> Catalog {
        let source = self.source.describe();

        match self.source.read().await {
            Ok(catalog) => {
                info!(%source, instances = catalog.len(), origin = ?catalog.origin, "Pricing catalog loaded");
                catalog
            }
            Err(PricingError::SourceNotFound(path)) => {
                info!(%path, "Pricing spreadsheet not found, using sample data");
                sample_catalog()
            }
            Err(error) => {
                warn!(%source, error = %error, "Failed to read pricing spreadsheet, using sample data");
                sample_catalog()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ec2_pricing_core::{CatalogOrigin, PricingProfile};

    fn spreadsheet_catalog() -> Catalog {
        let instances = sample_catalog().instances.into_iter().take(3).collect();
        Catalog::from_spreadsheet(PricingProfile::default(), instances)
    }

    #[tokio::test]
    async fn test_sample_source_yields_sample_catalog() {
        let loader = CatalogLoader::new(Arc::new(SampleCatalogSource::new()));
        let catalog = loader.load().await;
        assert_eq!(catalog, sample_catalog());
    }

    #[tokio::test]
    async fn test_load_passes_through_source_catalog() {
        let mut source = MockCatalogSource::new();
        source.expect_describe().return_const("mock".to_string());
        source
            .expect_read()
            .times(1)
            .returning(|| Ok(spreadsheet_catalog()));

        let catalog = CatalogLoader::new(Arc::new(source)).load().await;
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.origin, CatalogOrigin::Spreadsheet);
        assert_eq!(catalog.metadata.progress, "3/3 (100.0%)");
    }

    #[tokio::test]
    async fn test_missing_source_falls_back_to_sample() {
        let mut source = MockCatalogSource::new();
        source.expect_describe().return_const("mock".to_string());
        source
            .expect_read()
            .returning(|| Err(PricingError::SourceNotFound("data/missing.xlsx".to_string())));

        let catalog = CatalogLoader::new(Arc::new(source)).load().await;
        assert_eq!(catalog.origin, CatalogOrigin::Sample);
        assert_eq!(catalog.len(), 10);
    }

    #[tokio::test]
    async fn test_read_error_falls_back_to_sample() {
        let mut source = MockCatalogSource::new();
        source.expect_describe().return_const("mock".to_string());
        source
            .expect_read()
            .returning(|| Err(PricingError::MissingTable("EC2 Instances".to_string())));

        let catalog = CatalogLoader::new(Arc::new(source)).load().await;
        assert_eq!(catalog, sample_catalog());
    }
}
