use crate::features::catalog::service::CatalogService;
use crate::shared::types::{FilterOptions, InstancePage, QueryParameters, RawQueryParameters};
use std::sync::Arc;
use tracing::debug;

/// Filtering, pagination and filter options over the cached catalog
pub struct InstanceQueryService {
    catalog: Arc<CatalogService>,
}

impl InstanceQueryService {
    pub fn new(catalog: Arc<CatalogService>) -> Self {
        Self { catalog }
    }

    pub async fn list_instances(&self, raw: RawQueryParameters) -> InstancePage {
        let params = QueryParameters::from_raw(raw);
        let catalog = self.catalog.get_cached().await;
        let page = ec2_pricing_core::query(&catalog, &params);

        debug!(
            page = params.page,
            limit = params.limit,
            matched = page.pagination.total_items,
            returned = page.instances.len(),
            "Instance query"
        );
        page
    }

    pub async fn filter_options(&self) -> FilterOptions {
        let catalog = self.catalog.get_cached().await;
        ec2_pricing_core::filter_options(&catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::catalog::repo::{CatalogLoader, SampleCatalogSource};

    fn service() -> InstanceQueryService {
        let loader = CatalogLoader::new(Arc::new(SampleCatalogSource::new()));
        InstanceQueryService::new(Arc::new(CatalogService::new(loader)))
    }

    fn raw(pairs: &[(&str, &str)]) -> RawQueryParameters {
        let mut raw = RawQueryParameters::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "page" => raw.page = value,
                "limit" => raw.limit = value,
                "search" => raw.search = value,
                "family" => raw.family = value,
                "vcpus" => raw.vcpus = value,
                "memory" => raw.memory = value,
                "network" => raw.network = value,
                other => panic!("unknown key {other}"),
            }
        }
        raw
    }

    #[tokio::test]
    async fn test_list_instances_defaults() {
        let page = service().list_instances(RawQueryParameters::default()).await;
        assert_eq!(page.instances.len(), 10);
        assert_eq!(page.pagination.current_page, 1);
        assert_eq!(page.pagination.total_pages, 1);
        assert_eq!(page.pagination.items_per_page, 10);
    }

    #[tokio::test]
    async fn test_list_instances_family_and_vcpus() {
        let page = service()
            .list_instances(raw(&[("family", "T3A"), ("vcpus", "2")]))
            .await;
        assert!(!page.instances.is_empty());
        assert!(page
            .instances
            .iter()
            .all(|i| i.instance_name.starts_with("t3a") && i.vcpus == 2));
    }

    #[tokio::test]
    async fn test_list_instances_coerces_bad_limit_and_page() {
        let page = service()
            .list_instances(raw(&[("limit", "25"), ("page", "abc")]))
            .await;
        assert_eq!(page.pagination.items_per_page, 10);
        assert_eq!(page.pagination.current_page, 0);
        assert!(page.instances.is_empty());
    }

    #[tokio::test]
    async fn test_list_instances_page_past_end() {
        let page = service().list_instances(raw(&[("page", "5")])).await;
        assert!(page.instances.is_empty());
        assert_eq!(page.pagination.total_items, 10);
    }

    #[tokio::test]
    async fn test_filter_options_from_sample() {
        let options = service().filter_options().await;
        assert!(options.families.contains(&"t3a".to_string()));
        assert!(options.vcpus.windows(2).all(|w| w[0] < w[1]));
        assert!(!options.memories.is_empty());
        assert!(!options.networks.is_empty());
    }
}
