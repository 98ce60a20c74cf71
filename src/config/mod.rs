use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

use crate::table::pagination::PaginationMode;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub table: TableConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    pub default_take: u32,
    pub search_debounce_ms: u64,
    pub stale_time_secs: u64,
    pub pagination_mode: PaginationMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub max_files: usize,
    pub max_file_size_bytes: u64,
    pub allowed_image_types: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("RAMP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // API overrides
        if let Ok(v) = env::var("RAMP_API_URL") {
            if !v.trim().is_empty() {
                self.api.base_url = v.trim().to_string();
            }
        }
        if let Ok(v) = env::var("RAMP_API_TIMEOUT_SECS") {
            self.api.request_timeout_secs = v.parse().unwrap_or(self.api.request_timeout_secs);
        }
        if let Ok(v) = env::var("RAMP_API_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        // Table overrides
        if let Ok(v) = env::var("RAMP_TABLE_TAKE") {
            self.table.default_take = v
                .parse()
                .ok()
                .filter(|take: &u32| *take >= 1)
                .unwrap_or(self.table.default_take);
        }
        if let Ok(v) = env::var("RAMP_TABLE_DEBOUNCE_MS") {
            self.table.search_debounce_ms = v.parse().unwrap_or(self.table.search_debounce_ms);
        }
        if let Ok(v) = env::var("RAMP_TABLE_STALE_SECS") {
            self.table.stale_time_secs = v.parse().unwrap_or(self.table.stale_time_secs);
        }
        if let Ok(v) = env::var("RAMP_TABLE_PAGINATION") {
            self.table.pagination_mode = v.parse().unwrap_or(self.table.pagination_mode);
        }

        // Upload overrides
        if let Ok(v) = env::var("RAMP_UPLOAD_MAX_FILES") {
            self.upload.max_files = v.parse().unwrap_or(self.upload.max_files);
        }
        if let Ok(v) = env::var("RAMP_UPLOAD_MAX_FILE_SIZE_BYTES") {
            self.upload.max_file_size_bytes = v.parse().unwrap_or(self.upload.max_file_size_bytes);
        }
        if let Ok(v) = env::var("RAMP_UPLOAD_IMAGE_TYPES") {
            self.upload.allowed_image_types = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        self
    }

    fn default_image_types() -> Vec<String> {
        ["image/jpeg", "image/png", "image/webp", "image/gif", "image/heic"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: "http://localhost:3000".to_string(),
                request_timeout_secs: 30,
                enable_request_logging: true,
            },
            table: TableConfig {
                default_take: 10,
                search_debounce_ms: 300,
                stale_time_secs: 60,
                pagination_mode: PaginationMode::Auto,
            },
            upload: UploadConfig {
                max_files: 10,
                max_file_size_bytes: 20 * 1024 * 1024, // 20MB
                allowed_image_types: Self::default_image_types(),
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                base_url: "https://staging-api.ramp-registry.kr".to_string(),
                request_timeout_secs: 20,
                enable_request_logging: true,
            },
            table: TableConfig {
                default_take: 10,
                search_debounce_ms: 300,
                stale_time_secs: 60,
                pagination_mode: PaginationMode::Auto,
            },
            upload: UploadConfig {
                max_files: 10,
                max_file_size_bytes: 10 * 1024 * 1024, // 10MB
                allowed_image_types: Self::default_image_types(),
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                base_url: "https://api.ramp-registry.kr".to_string(),
                request_timeout_secs: 15,
                enable_request_logging: false,
            },
            table: TableConfig {
                default_take: 10,
                search_debounce_ms: 300,
                stale_time_secs: 60,
                pagination_mode: PaginationMode::Auto,
            },
            upload: UploadConfig {
                max_files: 5,
                max_file_size_bytes: 10 * 1024 * 1024, // 10MB
                allowed_image_types: Self::default_image_types(),
            },
        }
    }

    /// Same configuration pointed at another API origin
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api.base_url = base_url.into();
        self
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.table.default_take, 10);
        assert_eq!(config.table.search_debounce_ms, 300);
        assert!(config.api.enable_request_logging);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(!config.api.enable_request_logging);
        assert_eq!(config.upload.max_files, 5);
        assert_eq!(config.table.pagination_mode, PaginationMode::Auto);
    }

    #[test]
    fn with_base_url_replaces_origin_only() {
        let config = AppConfig::staging().with_base_url("http://127.0.0.1:9000");
        assert_eq!(config.api.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.api.request_timeout_secs, 20);
    }
}
