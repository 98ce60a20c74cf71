use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{self, AppConfig};
use crate::context::AppContext;
use crate::session::FileStorage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    Up,
    Down,
    Unknown,
}

/// Saved CLI settings (`profile.json`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub api_url: Option<String>,
    pub last_ping: Option<DateTime<Utc>>,
    pub status: ServerStatus,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            api_url: None,
            last_ping: None,
            status: ServerStatus::Unknown,
        }
    }
}

impl Profile {
    pub fn update_ping(&mut self, status: ServerStatus) {
        self.last_ping = Some(Utc::now());
        self.status = status;
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("RAMP_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("ramp").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_profile() -> anyhow::Result<Profile> {
    let profile_file = get_config_dir()?.join("profile.json");

    if !profile_file.exists() {
        return Ok(Profile::default());
    }

    let content = fs::read_to_string(profile_file)?;
    let profile: Profile = serde_json::from_str(&content)?;
    Ok(profile)
}

pub fn save_profile(profile: &Profile) -> anyhow::Result<()> {
    let profile_file = get_config_dir()?.join("profile.json");

    let content = serde_json::to_string_pretty(profile)?;
    fs::write(profile_file, content)?;
    Ok(())
}

/// Environment configuration with the profile's API URL, unless
/// `RAMP_API_URL` is set explicitly
pub fn app_config() -> anyhow::Result<AppConfig> {
    let mut app = config::config().clone();
    if std::env::var("RAMP_API_URL").is_err() {
        if let Some(url) = load_profile()?.api_url {
            app = app.with_base_url(url);
        }
    }
    Ok(app)
}

/// API context whose session lives next to the profile
pub fn build_context() -> anyhow::Result<AppContext> {
    let storage = FileStorage::in_dir(&get_config_dir()?);
    Ok(AppContext::new(app_config()?, Arc::new(storage))?)
}

/// Any HTTP answer below 500 counts as reachable
pub async fn ping_server(url: &str) -> ServerStatus {
    let client = reqwest::Client::new();

    match client.get(url).timeout(std::time::Duration::from_secs(5)).send().await {
        Ok(response) if !response.status().is_server_error() => ServerStatus::Up,
        _ => ServerStatus::Down,
    }
}
