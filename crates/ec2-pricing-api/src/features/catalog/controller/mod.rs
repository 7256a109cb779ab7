use crate::features::catalog::service::CatalogService;
use crate::shared::types::{CatalogMetadata, RefreshResponse};
use std::sync::Arc;
use tracing::info;

/// Controller for catalog metadata and refresh endpoints
pub struct CatalogController {
    service: Arc<CatalogService>,
}

impl CatalogController {
    pub fn new(service: Arc<CatalogService>) -> Self {
        Self { service }
    }

    pub async fn metadata(&self) -> CatalogMetadata {
        self.service.get_cached().await.metadata.clone()
    }

    pub async fn refresh(&self) -> RefreshResponse {
        info!("Received catalog refresh request");
        let catalog = self.service.refresh().await;
        RefreshResponse::new(catalog.len())
    }
}
