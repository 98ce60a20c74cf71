// Client error types
use serde_json::{json, Value};
use std::collections::HashMap;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced by the registry client.
///
/// `Clone` so a single failed fetch can be handed to every caller waiting on
/// the same cache key.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The request never completed (DNS, connect, TLS, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The server answered but the body did not have the expected shape.
    #[error("invalid response: {0}")]
    Decode(String),

    /// Client-side validation failed before any request was issued.
    #[error("{message}")]
    Validation {
        message: String,
        field_errors: HashMap<String, String>,
    },

    /// A multi-file upload aborted at `index`; `uploaded` holds the keys of
    /// the files that completed before it.
    #[error("upload of '{file_name}' (index {index}) failed: {message}")]
    Upload {
        index: usize,
        file_name: String,
        status: Option<u16>,
        message: String,
        uploaded: Vec<String>,
    },

    #[error("session storage error: {0}")]
    Storage(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status associated with the error, if the server produced one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Upload { status, .. } => *status,
            _ => None,
        }
    }

    /// Error code for machine-readable output
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Network(_) => "NETWORK_ERROR",
            ApiError::Http { status: 401, .. } => "UNAUTHORIZED",
            ApiError::Http { status: 403, .. } => "FORBIDDEN",
            ApiError::Http { status: 404, .. } => "NOT_FOUND",
            ApiError::Http { .. } => "HTTP_ERROR",
            ApiError::Decode(_) => "INVALID_RESPONSE",
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::Upload { .. } => "UPLOAD_FAILED",
            ApiError::Storage(_) => "STORAGE_ERROR",
            ApiError::Config(_) => "CONFIG_ERROR",
        }
    }

    pub fn field_errors(&self) -> Option<&HashMap<String, String>> {
        match self {
            ApiError::Validation { field_errors, .. } => Some(field_errors),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Http { status: 401, .. })
    }

    /// Convert to a JSON body for `--json` output
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "success": false,
            "error": self.to_string(),
            "error_code": self.error_code(),
        });

        match self {
            ApiError::Validation { field_errors, .. } if !field_errors.is_empty() => {
                body["field_errors"] = json!(field_errors);
            }
            ApiError::Upload { index, uploaded, .. } => {
                body["failed_index"] = json!(index);
                body["uploaded"] = json!(uploaded);
            }
            _ => {}
        }

        if let Some(status) = self.status_code() {
            body["status"] = json!(status);
        }
        body
    }
}

impl ApiError {
    pub fn network(message: impl Into<String>) -> Self {
        ApiError::Network(message.into())
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        ApiError::Http {
            status,
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        ApiError::Decode(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            field_errors: HashMap::new(),
        }
    }

    pub fn validation_fields(message: impl Into<String>, field_errors: HashMap<String, String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            field_errors,
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        ApiError::Storage(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        ApiError::Config(message.into())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::http(status.as_u16(), format!("HTTP {}", status.as_u16()))
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Storage(err.to_string())
    }
}

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        ApiError::Config(format!("invalid URL: {}", err))
    }
}
