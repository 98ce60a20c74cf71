use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{ApiError, ApiResult};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_TAKE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(SortOrder::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(SortOrder::Desc)
        } else {
            Err(ApiError::validation(format!("invalid sort order: {}", s)))
        }
    }
}

/// Parameters of `GET ramps`; also the list cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RampsQuery {
    pub page: u32,
    pub take: u32,
    pub order: SortOrder,
    pub district: Option<String>,
    pub facility_type: Option<String>,
    pub search: Option<String>,
}

impl Default for RampsQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            take: DEFAULT_TAKE,
            order: SortOrder::Desc,
            district: None,
            facility_type: None,
            search: None,
        }
    }
}

impl RampsQuery {
    pub fn with_take(take: u32) -> Self {
        Self {
            take,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> ApiResult<()> {
        if self.page < 1 {
            return Err(ApiError::validation("page must be >= 1"));
        }
        if self.take < 1 {
            return Err(ApiError::validation("take must be >= 1"));
        }
        Ok(())
    }

    /// Query-string pairs; empty filters are omitted
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("take".to_string(), self.take.to_string()),
            ("order_createdAt".to_string(), self.order.as_str().to_string()),
        ];

        let filters = [
            ("where__district", &self.district),
            ("where__type", &self.facility_type),
            ("where__query", &self.search),
        ];
        for (key, value) in filters {
            if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
                pairs.push((key.to_string(), v.to_string()));
            }
        }
        pairs
    }

    /// Same filters, different page
    pub fn at_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }
}
