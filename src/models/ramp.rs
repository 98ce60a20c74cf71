use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ramp facility as returned by the `ramps` endpoints.
///
/// Older deployments send `storeName`/`name` instead of `tradeName`,
/// `rampWidth` instead of `width` and `updateDate` instead of `updatedAt`.
/// Any combination of these keys is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RampWire")]
pub struct RampRecord {
    pub id: i64,
    pub district: String,
    #[serde(rename = "type")]
    pub facility_type: String,
    pub trade_name: String,
    pub address: String,
    pub width: RampWidth,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub images_keys: Vec<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Wire shape of [`RampRecord`] with every legacy key kept apart, so a
/// record carrying both the old and the new name still decodes.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RampWire {
    id: i64,
    #[serde(default)]
    district: Option<String>,
    #[serde(rename = "type", default)]
    facility_type: Option<String>,
    #[serde(default)]
    store_name: Option<String>,
    #[serde(default)]
    trade_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    ramp_width: Option<RampWidth>,
    #[serde(default)]
    width: Option<RampWidth>,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
    #[serde(default)]
    images_keys: Option<Vec<String>>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    update_date: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
}

impl From<RampWire> for RampRecord {
    fn from(wire: RampWire) -> Self {
        Self {
            id: wire.id,
            district: wire.district.unwrap_or_default(),
            facility_type: wire.facility_type.unwrap_or_default(),
            trade_name: wire.store_name.or(wire.trade_name).or(wire.name).unwrap_or_default(),
            address: wire.address.unwrap_or_default(),
            width: wire.ramp_width.or(wire.width).unwrap_or_default(),
            latitude: wire.latitude,
            longitude: wire.longitude,
            images_keys: wire.images_keys.unwrap_or_default(),
            created_at: wire.created_at,
            updated_at: wire.update_date.or(wire.updated_at),
        }
    }
}

impl RampRecord {
    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

/// Ramp width as sent by the server: a number of metres or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RampWidth {
    Metres(f64),
    Text(String),
}

impl RampWidth {
    /// Width in metres when the value is numeric (or numeric text)
    pub fn metres(&self) -> Option<f64> {
        match self {
            RampWidth::Metres(m) => Some(*m),
            RampWidth::Text(t) => t.trim().trim_end_matches('m').trim().parse().ok(),
        }
    }
}

impl Default for RampWidth {
    fn default() -> Self {
        RampWidth::Text(String::new())
    }
}

impl fmt::Display for RampWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RampWidth::Metres(m) => write!(f, "{}", m),
            RampWidth::Text(t) => write!(f, "{}", t),
        }
    }
}

/// One response of `GET ramps`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RampsPage<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub take: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

impl<T> RampsPage<T> {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Body of `POST ramps`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRampDto {
    pub district: String,
    #[serde(rename = "type")]
    pub facility_type: String,
    pub address: String,
    pub trade_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub width: Decimal,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub images_keys: Vec<String>,
}

/// Body of `DELETE ramps`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteRampsDto {
    pub ids: Vec<i64>,
}
