use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};

/// Raw API response. Non-success statuses are data, not errors: callers
/// decide how to turn them into [`ApiError`]s.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    body: Option<Value>,
    text: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, text: impl Into<String>) -> Self {
        let text = text.into();
        let body = serde_json::from_str(&text).ok();
        Self { status, body, text }
    }

    pub fn from_json(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            text: body.to_string(),
            body: Some(body),
        }
    }

    pub(crate) async fn read(response: reqwest::Response) -> ApiResult<Self> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::decode(format!("failed to read response body: {}", e)))?;
        Ok(Self::new(status, text))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Parsed JSON body; `None` when the body was empty or not JSON
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn json<T: DeserializeOwned>(&self) -> ApiResult<T> {
        let body = self
            .body
            .as_ref()
            .ok_or_else(|| ApiError::decode(format!("expected JSON body (HTTP {})", self.status.as_u16())))?;
        Ok(serde_json::from_value(body.clone())?)
    }

    /// `message` (or `error`) string from the body, if any
    pub fn message(&self) -> Option<String> {
        let body = self.body.as_ref()?;
        ["message", "error"]
            .iter()
            .filter_map(|key| body.get(*key).and_then(Value::as_str))
            .find(|s| !s.trim().is_empty())
            .map(str::to_string)
    }

    /// Server message, else `fallback`, else `HTTP <status>`
    pub fn error_message(&self, fallback: Option<&str>) -> String {
        self.message()
            .or_else(|| fallback.map(str::to_string))
            .unwrap_or_else(|| format!("HTTP {}", self.status.as_u16()))
    }

    pub fn into_error(self, fallback: Option<&str>) -> ApiError {
        ApiError::http(self.status.as_u16(), self.error_message(fallback))
    }

    /// Pass success through, turn anything else into [`ApiError::Http`]
    pub fn ensure_success(self, fallback: Option<&str>) -> ApiResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(self.into_error(fallback))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_field_wins_over_fallback() {
        let res = ApiResponse::from_json(StatusCode::BAD_REQUEST, json!({ "message": "duplicate email" }));
        assert_eq!(res.error_message(Some("삭제에 실패했습니다")), "duplicate email");
    }

    #[test]
    fn error_field_is_used_when_message_missing() {
        let res = ApiResponse::from_json(StatusCode::FORBIDDEN, json!({ "error": "forbidden" }));
        assert_eq!(res.error_message(None), "forbidden");
    }

    #[test]
    fn unparsable_body_falls_back() {
        let res = ApiResponse::new(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert!(res.body().is_none());
        assert_eq!(res.error_message(Some("경사로 생성에 실패했습니다")), "경사로 생성에 실패했습니다");
        assert_eq!(res.error_message(None), "HTTP 502");
    }

    #[test]
    fn ensure_success_maps_status() {
        let res = ApiResponse::new(StatusCode::UNAUTHORIZED, "");
        let err = res.ensure_success(None).unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "HTTP 401");
    }
}
