use crate::features::catalog::repo::CatalogLoader;
use crate::features::observability::controller::ObservabilityController;
use ec2_pricing_core::{Catalog, CatalogOrigin};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Process-wide catalog cache
///
/// The first reader loads the catalog; concurrent first readers wait on the
/// write lock so the source is read exactly once. Handed-out snapshots are
/// immutable, and a refresh swaps in a new snapshot without touching the
/// ones already in flight.
pub struct CatalogService {
    loader: CatalogLoader,
    cache: RwLock<Option<Arc<Catalog>>>,
    observability: Option<Arc<ObservabilityController>>,
}

impl CatalogService {
    pub fn new(loader: CatalogLoader) -> Self {
        Self {
            loader,
            cache: RwLock::new(None),
            observability: None,
        }
    }

    pub fn with_observability(mut self, observability: Arc<ObservabilityController>) -> Self {
        self.observability = Some(observability);
        self
    }

    /// Current snapshot, loading it on first use
    pub async fn get_cached(&self) -> Arc<Catalog> {
        if let Some(catalog) = self.cache.read().await.as_ref() {
            return Arc::clone(catalog);
        }

        let mut cache = self.cache.write().await;
        if let Some(catalog) = cache.as_ref() {
            debug!("Catalog loaded by a concurrent request");
            return Arc::clone(catalog);
        }

        let catalog = Arc::new(self.loader.load().await);
        self.record_load(&catalog);
        *cache = Some(Arc::clone(&catalog));
        catalog
    }

    /// Reload from the source and replace the cached snapshot
    pub async fn refresh(&self) -> Arc<Catalog> {
        let catalog = Arc::new(self.loader.load().await);
        self.record_load(&catalog);

        let previous = self.cache.write().await.replace(Arc::clone(&catalog));
        info!(
            instances = catalog.len(),
            previous = previous.map(|c| c.len()),
            "Catalog refreshed"
        );
        catalog
    }

    fn record_load(&self, catalog: &Catalog) {
        if let Some(observability) = &self.observability {
            observability.record_catalog_load(catalog.len(), catalog.origin == CatalogOrigin::Sample);
        }
    }
}
