//! Filtering, pagination and filter-option derivation over a [`Catalog`].

use crate::catalog::{Catalog, InstanceRecord};
use crate::parsing::{memory_prefix, parse_decimal, parse_integer};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

pub const ALLOWED_LIMITS: [usize; 3] = [10, 30, 50];
pub const DEFAULT_LIMIT: usize = 10;
const ALL: &str = "All";

/// Query string exactly as received; every field is optional text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RawQueryParameters {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub family: Option<String>,
    pub vcpus: Option<String>,
    pub memory: Option<String>,
    pub network: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParameters {
    pub page: i64,
    pub limit: usize,
    pub search: String,
    pub family: String,
    pub vcpus: String,
    pub memory: String,
    pub network: String,
}

impl Default for QueryParameters {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
            search: String::new(),
            family: String::new(),
            vcpus: String::new(),
            memory: String::new(),
            network: String::new(),
        }
    }
}

impl QueryParameters {
    /// Coerces raw values instead of rejecting them. Page and limit use the
    /// leading integer of the text (`"2.0"` -> 2). A limit outside
    /// [`ALLOWED_LIMITS`] becomes [`DEFAULT_LIMIT`], a missing page becomes 1
    /// and a page without leading digits becomes 0 (an empty page).
    pub fn from_raw(raw: RawQueryParameters) -> Self {
        let page = match raw.page.as_deref().map(str::trim) {
            None | Some("") => 1,
            Some(value) => parse_integer(value).unwrap_or(0),
        };

        let limit = raw
            .limit
            .as_deref()
            .and_then(|value| parse_integer(value).ok())
            .and_then(|value| usize::try_from(value).ok())
            .filter(|value| ALLOWED_LIMITS.contains(value))
            .unwrap_or(DEFAULT_LIMIT);

        Self {
            page,
            limit,
            search: raw.search.unwrap_or_default(),
            family: raw.family.unwrap_or_default(),
            vcpus: raw.vcpus.unwrap_or_default(),
            memory: raw.memory.unwrap_or_default(),
            network: raw.network.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: i64,
    pub total_pages: usize,
    pub total_items: usize,
    pub items_per_page: usize,
    pub start_index: i64,
    pub end_index: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstancePage {
    pub instances: Vec<InstanceRecord>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub families: Vec<String>,
    pub vcpus: Vec<u32>,
    pub memories: Vec<String>,
    pub networks: Vec<String>,
}

fn is_active(filter: &str) -> bool {
    !filter.is_empty() && filter != ALL
}

fn matches_search(instance: &InstanceRecord, terms: &[String]) -> bool {
    let text = instance.searchable_text();
    terms.iter().all(|term| text.contains(term.as_str()))
}

/// Applies search, family, vCPU, memory and network filters in that order.
pub fn filter_instances<'a>(
    catalog: &'a Catalog,
    params: &QueryParameters,
) -> Vec<&'a InstanceRecord> {
    let mut filtered: Vec<&InstanceRecord> = catalog.instances.iter().collect();

    if !params.search.is_empty() {
        let terms: Vec<String> = params
            .search
            .to_lowercase()
            .split_whitespace()
            .map(ToString::to_string)
            .collect();
        filtered.retain(|instance| matches_search(instance, &terms));
    }

    if is_active(&params.family) {
        let family = params.family.to_lowercase();
        filtered.retain(|instance| instance.instance_name.to_lowercase().starts_with(&family));
    }

    if is_active(&params.vcpus) {
        filtered.retain(|instance| instance.vcpus.to_string() == params.vcpus);
    }

    if is_active(&params.memory) {
        filtered.retain(|instance| instance.memory.contains(params.memory.as_str()));
    }

    if is_active(&params.network) {
        filtered.retain(|instance| {
            instance
                .network_performance
                .contains(params.network.as_str())
        });
    }

    filtered
}

/// Pagination metadata plus the `[from, to)` slice bounds, or `None` for
/// pages below 1.
pub fn paginate(
    total_items: usize,
    page: i64,
    limit: usize,
) -> (Pagination, Option<(usize, usize)>) {
    let limit = if limit == 0 { DEFAULT_LIMIT } else { limit };
    let limit_i = limit as i64;
    let start = page.saturating_sub(1).saturating_mul(limit_i);
    let end = start.saturating_add(limit_i);
    let total_i = total_items as i64;

    let range = if page < 1 {
        None
    } else {
        let from = start.min(total_i) as usize;
        let to = end.min(total_i) as usize;
        Some((from, to))
    };

    let pagination = Pagination {
        current_page: page,
        total_pages: total_items.div_ceil(limit),
        total_items,
        items_per_page: limit,
        start_index: start.saturating_add(1),
        end_index: end.min(total_i),
    };

    (pagination, range)
}

pub fn query(catalog: &Catalog, params: &QueryParameters) -> InstancePage {
    let filtered = filter_instances(catalog, params);
    let (pagination, range) = paginate(filtered.len(), params.page, params.limit);

    let instances = match range {
        Some((from, to)) => filtered[from..to].iter().map(|i| (*i).clone()).collect(),
        None => Vec::new(),
    };

    InstancePage {
        instances,
        pagination,
    }
}

fn compare_memory(a: &str, b: &str) -> Ordering {
    match (parse_decimal(a).ok(), parse_decimal(b).ok()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

pub fn filter_options(catalog: &Catalog) -> FilterOptions {
    let families: BTreeSet<String> = catalog
        .instances
        .iter()
        .map(|instance| instance.family().to_string())
        .collect();

    let vcpus: BTreeSet<u32> = catalog.instances.iter().map(|i| i.vcpus).collect();

    let mut memories: Vec<String> = catalog
        .instances
        .iter()
        .map(|instance| memory_prefix(&instance.memory).to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    memories.sort_by(|a, b| compare_memory(a, b));

    let networks: BTreeSet<String> = catalog
        .instances
        .iter()
        .map(|instance| instance.network_performance.clone())
        .collect();

    FilterOptions {
        families: families.into_iter().collect(),
        vcpus: vcpus.into_iter().collect(),
        memories,
        networks: networks.into_iter().collect(),
    }
}
