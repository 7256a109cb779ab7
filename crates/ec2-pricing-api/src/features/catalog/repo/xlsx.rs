use async_trait::async_trait;
use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use ec2_pricing_core::parsing::{first_decimal, parse_decimal};
use ec2_pricing_core::{Catalog, InstanceRecord, PricingProfile};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::CatalogSource;
use crate::shared::error::{PricingError, PricingResult};

pub const CONFIGURATION_SHEET: &str = "Configuration";
pub const INSTANCES_SHEET: &str = "EC2 Instances";

pub mod columns {
    pub const INSTANCE_NAME: &str = "Instance name";
    pub const VCPUS: &str = "vCPUs";
    pub const MEMORY: &str = "Memory";
    pub const NETWORK_PERFORMANCE: &str = "Network Performance";
    pub const STORAGE: &str = "Storage";
    pub const ON_DEMAND_HOURLY_COST: &str = "On-Demand Hourly Cost";
    pub const CURRENT_GENERATION: &str = "CurrentGeneration";
    pub const POTENTIAL_EFFECTIVE_HOURLY_COST: &str = "Potential Effective Hourly Cost (Savings %)";

    pub const REGION: &str = "region";
    pub const TENANCY: &str = "tenancy";
    pub const OPERATING_SYSTEM: &str = "operating_system";
    pub const WORKLOAD: &str = "workload";
}

/// One data row keyed by its header cell
pub type SheetRow = HashMap<String, Data>;

/// Workbook with a `Configuration` and an `EC2 Instances` sheet
#[derive(Debug, Clone)]
pub struct XlsxCatalogSource {
    path: PathBuf,
}

impl XlsxCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for XlsxCatalogSource {
    async fn read(&self) -> PricingResult<Catalog> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_workbook(&path))
            .await
            .map_err(|e| PricingError::Internal(format!("spreadsheet reader task failed: {e}")))?
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

pub fn read_workbook(path: &Path) -> PricingResult<Catalog> {
    if !path.exists() {
        return Err(PricingError::SourceNotFound(path.display().to_string()));
    }

    let mut workbook =
        open_workbook_auto(path).map_err(|e| PricingError::SourceRead(e.to_string()))?;

    let configuration = sheet_rows(&mut workbook, CONFIGURATION_SHEET)?;
    let instance_rows = sheet_rows(&mut workbook, INSTANCES_SHEET)?;

    let profile = profile_from_rows(&configuration);
    let instances: Vec<InstanceRecord> = instance_rows.iter().filter_map(record_from_row).collect();

    debug!(
        rows = instance_rows.len(),
        kept = instances.len(),
        "Parsed instances sheet"
    );

    Ok(Catalog::from_spreadsheet(profile, instances))
}

fn sheet_rows(workbook: &mut Sheets<BufReader<File>>, sheet: &str) -> PricingResult<Vec<SheetRow>> {
    if !workbook.sheet_names().iter().any(|name| name == sheet) {
        return Err(PricingError::MissingTable(sheet.to_string()));
    }

    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| PricingError::SourceRead(format!("{sheet}: {e}")))?;

    Ok(rows_to_records(&range))
}

/// Turns a sheet into header-keyed rows. The first row is the header; cells
/// under a blank header are dropped.
pub fn rows_to_records(range: &Range<Data>) -> Vec<SheetRow> {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Vec::new();
    };
    let headers: Vec<String> = header.iter().map(cell_text).collect();

    rows.map(|row| {
        headers
            .iter()
            .zip(row.iter())
            .filter(|(name, _)| !name.is_empty())
            .map(|(name, cell)| (name.clone(), cell.clone()))
            .collect()
    })
    .collect()
}

pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(value) => value.trim().to_string(),
        Data::Float(value) => value.to_string(),
        Data::Int(value) => value.to_string(),
        Data::Bool(value) => value.to_string(),
        Data::Empty => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

pub fn cell_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(value) if value.is_finite() => Some(*value),
        Data::Int(value) => Some(*value as f64),
        Data::String(value) => parse_decimal(value).ok().or_else(|| first_decimal(value)),
        _ => None,
    }
}

fn text_column(row: &SheetRow, column: &str) -> String {
    row.get(column).map(cell_text).unwrap_or_default()
}

/// Maps one instances-sheet row, or `None` for rows without an instance name
/// or without a positive whole vCPU count.
pub fn record_from_row(row: &SheetRow) -> Option<InstanceRecord> {
    let instance_name = text_column(row, columns::INSTANCE_NAME);
    if instance_name.is_empty() {
        return None;
    }

    let vcpus = row
        .get(columns::VCPUS)
        .and_then(cell_number)
        .filter(|value| *value >= 1.0 && value.fract() == 0.0 && *value <= u32::MAX as f64)
        .map(|value| value as u32);
    let Some(vcpus) = vcpus else {
        warn!(instance = %instance_name, "Skipping row without a valid vCPU count");
        return None;
    };

    let on_demand_hourly_cost = match row.get(columns::ON_DEMAND_HOURLY_COST).and_then(cell_number) {
        Some(cost) => cost,
        None => {
            warn!(instance = %instance_name, "Unreadable on-demand hourly cost, using 0");
            0.0
        }
    };

    Some(InstanceRecord {
        instance_name,
        vcpus,
        memory: text_column(row, columns::MEMORY),
        network_performance: text_column(row, columns::NETWORK_PERFORMANCE),
        storage: text_column(row, columns::STORAGE),
        on_demand_hourly_cost,
        current_generation: text_column(row, columns::CURRENT_GENERATION),
        potential_effective_hourly_cost: text_column(row, columns::POTENTIAL_EFFECTIVE_HOURLY_COST),
    })
}

/// Region, tenancy, OS and workload from the first configuration row; blank
/// or missing cells keep the defaults.
pub fn profile_from_rows(rows: &[SheetRow]) -> PricingProfile {
    let mut profile = PricingProfile::default();
    let Some(row) = rows.first() else {
        return profile;
    };

    for (column, field) in [
        (columns::REGION, &mut profile.region),
        (columns::TENANCY, &mut profile.tenancy),
        (columns::OPERATING_SYSTEM, &mut profile.os),
        (columns::WORKLOAD, &mut profile.workload),
    ] {
        let value = text_column(row, column);
        if !value.is_empty() {
            *field = value;
        }
    }

    profile
}
