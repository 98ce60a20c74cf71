//! Dashboard statistics over the ramp registry.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::error::ApiResult;
use crate::models::RampRecord;
use crate::query::RampsQuery;
use crate::services::RampService;
use crate::table::pagination::total_pages;
use crate::table::row::parse_date;

pub const UNKNOWN_LABEL: &str = "미상";

/// Width ranges in metres: `[lower, upper)` with a label
const WIDTH_BUCKETS: [(f64, f64, &str); 4] = [
    (0.0, 0.9, "0.9m 미만"),
    (0.9, 1.2, "0.9m 이상 1.2m 미만"),
    (1.2, 1.5, "1.2m 이상 1.5m 미만"),
    (1.5, f64::INFINITY, "1.5m 이상"),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountEntry {
    pub name: String,
    pub count: u64,
    /// Share of the total, rounded to one decimal
    pub percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RampStatistics {
    pub total: u64,
    pub with_coordinates: u64,
    pub with_images: u64,
    pub by_district: Vec<CountEntry>,
    pub by_facility_type: Vec<CountEntry>,
    pub by_width: Vec<CountEntry>,
    /// `YYYY-MM` of creation, oldest first
    pub by_month: Vec<CountEntry>,
}

impl RampStatistics {
    pub fn from_records(records: &[RampRecord]) -> Self {
        let total = records.len() as u64;

        let mut districts: HashMap<String, u64> = HashMap::new();
        let mut types: HashMap<String, u64> = HashMap::new();
        let mut widths = [0u64; WIDTH_BUCKETS.len()];
        let mut unknown_width = 0u64;
        let mut months: BTreeMap<String, u64> = BTreeMap::new();

        for record in records {
            *districts.entry(label_or_unknown(&record.district)).or_default() += 1;
            *types.entry(label_or_unknown(&record.facility_type)).or_default() += 1;

            match record.width.metres().and_then(width_bucket) {
                Some(idx) => widths[idx] += 1,
                None => unknown_width += 1,
            }

            if let Some(date) = record.created_at.as_deref().and_then(parse_date) {
                *months.entry(date.format("%Y-%m").to_string()).or_default() += 1;
            }
        }

        let mut by_width: Vec<CountEntry> = WIDTH_BUCKETS
            .iter()
            .zip(widths)
            .map(|((_, _, label), count)| entry(label, count, total))
            .collect();
        if unknown_width > 0 {
            by_width.push(entry(UNKNOWN_LABEL, unknown_width, total));
        }

        Self {
            total,
            with_coordinates: records.iter().filter(|r| r.has_coordinates()).count() as u64,
            with_images: records.iter().filter(|r| !r.images_keys.is_empty()).count() as u64,
            by_district: ranked(districts, total),
            by_facility_type: ranked(types, total),
            by_width,
            by_month: months
                .into_iter()
                .map(|(month, count)| entry(&month, count, total))
                .collect(),
        }
    }
}

/// Page through every record matching the default filters.
///
/// Stops after the first response when the server returns the whole
/// collection at once.
pub async fn collect_all(service: &RampService, take: u32) -> ApiResult<Vec<RampRecord>> {
    let base = RampsQuery::with_take(take.max(1));
    let mut records = Vec::new();
    let mut page = 1;

    loop {
        let listing = service.list(&base.at_page(page)).await?;
        let returned = listing.data.len() as u64;
        records.extend(listing.data.iter().cloned());

        let last_page = total_pages(listing.total, base.take);
        if returned == 0 || returned >= listing.total || records.len() as u64 >= listing.total || page >= last_page {
            break;
        }
        page += 1;
    }

    tracing::debug!(count = records.len(), pages = page, "collected ramps for statistics");
    Ok(records)
}

fn width_bucket(metres: f64) -> Option<usize> {
    WIDTH_BUCKETS
        .iter()
        .position(|(lower, upper, _)| metres >= *lower && metres < *upper)
}

fn label_or_unknown(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        UNKNOWN_LABEL.to_string()
    } else {
        value.to_string()
    }
}

/// Descending count, then name
fn ranked(counts: HashMap<String, u64>, total: u64) -> Vec<CountEntry> {
    let mut entries: Vec<CountEntry> = counts
        .into_iter()
        .map(|(name, count)| entry(&name, count, total))
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    entries
}

fn entry(name: &str, count: u64, total: u64) -> CountEntry {
    let percent = if total == 0 {
        0.0
    } else {
        (count as f64 * 1000.0 / total as f64).round() / 10.0
    };
    CountEntry {
        name: name.to_string(),
        count,
        percent,
    }
}
