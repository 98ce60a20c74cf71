use chrono::{DateTime, Datelike, NaiveDate};
use serde::Serialize;

use crate::models::RampRecord;

/// One display row of the ramp table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    pub id: i64,
    pub district: String,
    #[serde(rename = "type")]
    pub facility_type: String,
    pub store_name: String,
    pub address: String,
    pub ramp_width: String,
    pub update_date: String,
    pub checked: bool,
}

impl From<&RampRecord> for TableRow {
    fn from(record: &RampRecord) -> Self {
        let updated = record
            .updated_at
            .as_deref()
            .or(record.created_at.as_deref())
            .unwrap_or_default();

        Self {
            id: record.id,
            district: record.district.clone(),
            facility_type: record.facility_type.clone(),
            store_name: record.trade_name.clone(),
            address: record.address.clone(),
            ramp_width: record.width.to_string(),
            update_date: format_korean_date(updated),
            checked: false,
        }
    }
}

/// `2025년 03월 04일` from `2025.3.4`, `2025-03-04...`, RFC 3339 or RFC 2822.
/// Anything else formats as an empty string.
pub fn format_korean_date(raw: &str) -> String {
    match parse_date(raw) {
        Some(d) => format!("{}년 {:02}월 {:02}일", d.year(), d.month(), d.day()),
        None => String::new(),
    }
}

/// Calendar date of a server timestamp in any of the accepted shapes
pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    parse_dotted(raw)
        .or_else(|| parse_dashed_prefix(raw))
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|d| d.date_naive()))
        .or_else(|| DateTime::parse_from_rfc2822(raw).ok().map(|d| d.date_naive()))
}

fn parse_dotted(raw: &str) -> Option<NaiveDate> {
    let mut parts = raw.split('.');
    let date = ymd(parts.next()?, parts.next()?, parts.next()?)?;
    parts.next().is_none().then_some(date)
}

/// Leading `YYYY-M-D`; whatever follows (a time part) is ignored
fn parse_dashed_prefix(raw: &str) -> Option<NaiveDate> {
    let mut parts = raw.splitn(3, '-');
    let year = parts.next()?;
    let month = parts.next()?;
    let rest = parts.next()?;
    let day_len = rest.chars().take(2).take_while(char::is_ascii_digit).count();
    ymd(year, month, &rest[..day_len])
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    fn digits(s: &str, min: usize, max: usize) -> Option<&str> {
        (s.len() >= min && s.len() <= max && s.bytes().all(|b| b.is_ascii_digit())).then_some(s)
    }

    NaiveDate::from_ymd_opt(
        digits(year, 4, 4)?.parse().ok()?,
        digits(month, 1, 2)?.parse().ok()?,
        digits(day, 1, 2)?.parse().ok()?,
    )
}
