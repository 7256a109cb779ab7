use serde::{Deserialize, Serialize};

/// One priced EC2 instance type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceRecord {
    pub instance_name: String,
    #[serde(rename = "vCPUs")]
    pub vcpus: u32,
    pub memory: String,
    pub network_performance: String,
    pub storage: String,
    pub on_demand_hourly_cost: f64,
    pub current_generation: String,
    pub potential_effective_hourly_cost: String,
}

impl InstanceRecord {
    /// Name prefix before the first `.`, e.g. `t3a` for `t3a.nano`.
    pub fn family(&self) -> &str {
        self.instance_name
            .split('.')
            .next()
            .unwrap_or(&self.instance_name)
    }

    pub(crate) fn searchable_text(&self) -> String {
        [
            self.instance_name.as_str(),
            self.memory.as_str(),
            self.network_performance.as_str(),
            self.storage.as_str(),
            self.current_generation.as_str(),
        ]
        .join(" ")
        .to_lowercase()
    }
}

/// Region, tenancy, OS and workload the prices were collected for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingProfile {
    pub region: String,
    pub tenancy: String,
    pub os: String,
    pub workload: String,
}

impl Default for PricingProfile {
    fn default() -> Self {
        Self {
            region: "Asia Pacific (Mumbai)".to_string(),
            tenancy: "Shared Instances".to_string(),
            os: "Windows Server".to_string(),
            workload: "Constant usage".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogMetadata {
    pub region: String,
    pub tenancy: String,
    pub os: String,
    pub workload: String,
    pub total_instances: usize,
    pub pages_complete: String,
    pub progress: String,
}

impl CatalogMetadata {
    pub fn from_spreadsheet(profile: PricingProfile, total_instances: usize) -> Self {
        Self {
            region: profile.region,
            tenancy: profile.tenancy,
            os: profile.os,
            workload: profile.workload,
            total_instances,
            pages_complete: "8 of 8".to_string(),
            progress: format!("{total_instances}/{total_instances} (100.0%)"),
        }
    }

    pub fn sample() -> Self {
        let profile = PricingProfile::default();
        Self {
            region: profile.region,
            tenancy: profile.tenancy,
            os: profile.os,
            workload: profile.workload,
            total_instances: SAMPLE_INSTANCE_COUNT,
            pages_complete: "Sample Data".to_string(),
            progress: "10/394 (2.4%)".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogOrigin {
    Spreadsheet,
    Sample,
}

/// Snapshot of metadata plus instance records. Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    pub metadata: CatalogMetadata,
    pub instances: Vec<InstanceRecord>,
    pub origin: CatalogOrigin,
}

impl Catalog {
    pub fn from_spreadsheet(profile: PricingProfile, instances: Vec<InstanceRecord>) -> Self {
        Self {
            metadata: CatalogMetadata::from_spreadsheet(profile, instances.len()),
            instances,
            origin: CatalogOrigin::Spreadsheet,
        }
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn find(&self, instance_name: &str) -> Option<&InstanceRecord> {
        self.instances
            .iter()
            .find(|instance| instance.instance_name == instance_name)
    }
}

const SAMPLE_INSTANCE_COUNT: usize = 10;

fn sample_instance(
    instance_name: &str,
    vcpus: u32,
    memory: &str,
    network_performance: &str,
    on_demand_hourly_cost: f64,
    potential_effective_hourly_cost: &str,
) -> InstanceRecord {
    InstanceRecord {
        instance_name: instance_name.to_string(),
        vcpus,
        memory: memory.to_string(),
        network_performance: network_performance.to_string(),
        storage: "EBS only".to_string(),
        on_demand_hourly_cost,
        current_generation: "Yes".to_string(),
        potential_effective_hourly_cost: potential_effective_hourly_cost.to_string(),
    }
}

/// Fixed catalog served when the spreadsheet cannot be read.
pub fn sample_catalog() -> Catalog {
    let instances = vec![
        sample_instance("t3a.nano", 2, "0.5 GiB", "Up to 5 Gigabit", 0.0077, "0.0057 (25%)"),
        sample_instance("t2.nano", 1, "0.5 GiB", "Low", 0.0085, "0.0046 (46%)"),
        sample_instance("t3.nano", 2, "0.5 GiB", "Up to 5 Gigabit", 0.0102, "0.0067 (35%)"),
        sample_instance("t3a.micro", 2, "1 GiB", "Up to 5 Gigabit", 0.0154, "0.0115 (26%)"),
        sample_instance("t2.micro", 1, "1 GiB", "Low to Moderate", 0.017, "0.0091 (46%)"),
        sample_instance("t3.micro", 2, "1 GiB", "Up to 5 Gigabit", 0.0204, "0.0133 (35%)"),
        sample_instance("t3a.small", 2, "2 GiB", "Up to 5 Gigabit", 0.0307, "0.0229 (25%)"),
        sample_instance("t2.small", 1, "2 GiB", "Low to Moderate", 0.034, "0.0183 (46%)"),
        sample_instance("m5.large", 2, "8 GiB", "Up to 10 Gigabit", 0.193, "0.1300 (33%)"),
        sample_instance("c5.large", 2, "4 GiB", "Up to 10 Gigabit", 0.177, "0.1240 (30%)"),
    ];

    Catalog {
        metadata: CatalogMetadata::sample(),
        instances,
        origin: CatalogOrigin::Sample,
    }
}
