use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use crate::error::{ApiError, ApiResult};
use crate::models::CreateRampDto;

use super::{is_blank, MSG_ALL_FIELDS_REQUIRED};

pub const MSG_INVALID_WIDTH: &str = "경사로 폭은 0보다 큰 숫자로 입력해주세요.";
pub const MSG_INVALID_LATITUDE: &str = "위도는 -90에서 90 사이여야 합니다.";
pub const MSG_INVALID_LONGITUDE: &str = "경도는 -180에서 180 사이여야 합니다.";

/// Raw input of the "register ramp" form; width and coordinates as typed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RampForm {
    pub district: String,
    pub address: String,
    pub trade_name: String,
    pub facility_type: String,
    pub width: String,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

impl RampForm {
    /// Validated payload with the given uploaded image keys attached
    pub fn to_dto(&self, images_keys: Vec<String>) -> ApiResult<CreateRampDto> {
        let required = [
            ("district", &self.district),
            ("address", &self.address),
            ("tradeName", &self.trade_name),
            ("type", &self.facility_type),
            ("width", &self.width),
        ];
        let missing: HashMap<String, String> = required
            .iter()
            .filter(|(_, v)| is_blank(v))
            .map(|(k, _)| (k.to_string(), MSG_ALL_FIELDS_REQUIRED.to_string()))
            .collect();
        if !missing.is_empty() {
            return Err(ApiError::validation_fields(MSG_ALL_FIELDS_REQUIRED, missing));
        }

        let mut field_errors = HashMap::new();

        let width = parse_width(&self.width);
        if width.is_none() {
            field_errors.insert("width".to_string(), MSG_INVALID_WIDTH.to_string());
        }
        let latitude = parse_coordinate(self.latitude.as_deref(), 90.0);
        if latitude.is_err() {
            field_errors.insert("latitude".to_string(), MSG_INVALID_LATITUDE.to_string());
        }
        let longitude = parse_coordinate(self.longitude.as_deref(), 180.0);
        if longitude.is_err() {
            field_errors.insert("longitude".to_string(), MSG_INVALID_LONGITUDE.to_string());
        }

        match (width, latitude, longitude) {
            (Some(width), Ok(latitude), Ok(longitude)) => Ok(CreateRampDto {
                district: self.district.trim().to_string(),
                facility_type: self.facility_type.trim().to_string(),
                address: self.address.trim().to_string(),
                trade_name: self.trade_name.trim().to_string(),
                width,
                latitude,
                longitude,
                images_keys,
            }),
            _ => {
                let message = field_errors
                    .get("width")
                    .or_else(|| field_errors.get("latitude"))
                    .or_else(|| field_errors.get("longitude"))
                    .cloned()
                    .unwrap_or_default();
                Err(ApiError::validation_fields(message, field_errors))
            }
        }
    }
}

/// Positive decimal; a trailing unit `m` is accepted
fn parse_width(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim().trim_end_matches('m').trim();
    Decimal::from_str(trimmed).ok().filter(|w| *w > Decimal::ZERO)
}

/// Empty means "not given"; otherwise a number within `[-limit, limit]`
fn parse_coordinate(raw: Option<&str>, limit: f64) -> Result<Option<f64>, ()> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && v.abs() <= limit)
            .map(Some)
            .ok_or(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> RampForm {
        RampForm {
            district: "강남구".to_string(),
            address: "테헤란로 152".to_string(),
            trade_name: "카페 경사로".to_string(),
            facility_type: "카페".to_string(),
            width: "1.2".to_string(),
            latitude: Some("37.5".to_string()),
            longitude: Some(" 127.03 ".to_string()),
        }
    }

    #[test]
    fn valid_form_becomes_payload_with_keys() {
        let dto = form().to_dto(vec!["ramps/a.png".to_string()]).unwrap();
        assert_eq!(dto.width, Decimal::new(12, 1));
        assert_eq!(dto.longitude, Some(127.03));
        assert_eq!(dto.images_keys, vec!["ramps/a.png"]);
    }

    #[test]
    fn missing_fields_are_reported_per_field() {
        let f = RampForm {
            address: String::new(),
            trade_name: " ".to_string(),
            ..form()
        };
        let err = f.to_dto(Vec::new()).unwrap_err();
        assert_eq!(err.to_string(), MSG_ALL_FIELDS_REQUIRED);
        let fields = err.field_errors().unwrap();
        assert!(fields.contains_key("address"));
        assert!(fields.contains_key("tradeName"));
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn width_must_be_positive() {
        for bad in ["0", "-1", "wide"] {
            let f = RampForm {
                width: bad.to_string(),
                ..form()
            };
            let err = f.to_dto(Vec::new()).unwrap_err();
            assert_eq!(err.to_string(), MSG_INVALID_WIDTH, "width {bad}");
        }
        let f = RampForm {
            width: "0.9m".to_string(),
            ..form()
        };
        assert!(f.to_dto(Vec::new()).is_ok());
    }

    #[test]
    fn coordinates_are_optional_but_bounded() {
        let f = RampForm {
            latitude: None,
            longitude: Some(String::new()),
            ..form()
        };
        let dto = f.to_dto(Vec::new()).unwrap();
        assert_eq!((dto.latitude, dto.longitude), (None, None));

        let f = RampForm {
            latitude: Some("91".to_string()),
            ..form()
        };
        let err = f.to_dto(Vec::new()).unwrap_err();
        assert!(err.field_errors().unwrap().contains_key("latitude"));
    }
}
