use crate::features::instance_query::service::InstanceQueryService;
use crate::shared::types::{FilterOptions, InstancePage, RawQueryParameters};
use std::sync::Arc;

pub struct InstanceQueryController {
    service: Arc<InstanceQueryService>,
}

impl InstanceQueryController {
    pub fn new(service: Arc<InstanceQueryService>) -> Self {
        Self { service }
    }

    pub async fn list_instances(&self, raw: RawQueryParameters) -> InstancePage {
        self.service.list_instances(raw).await
    }

    pub async fn filter_options(&self) -> FilterOptions {
        self.service.filter_options().await
    }
}
