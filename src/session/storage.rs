use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

/// Fixed file name the session is persisted under
pub const SESSION_FILE_NAME: &str = "session.json";

/// Durable part of the session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub access_token: Option<String>,
    /// `name=value` pairs of the refresh cookie(s) for the API origin
    #[serde(default)]
    pub refresh_cookies: Vec<String>,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

impl PersistedSession {
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_cookies.is_empty()
    }
}

/// Where a [`SessionStore`](super::SessionStore) writes through to.
pub trait SessionStorage: Send + Sync {
    fn load(&self) -> ApiResult<Option<PersistedSession>>;
    fn save(&self, session: &PersistedSession) -> ApiResult<()>;
    fn remove(&self) -> ApiResult<()>;
}

/// JSON file storage, `session.json` inside a config directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(SESSION_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> ApiResult<Option<PersistedSession>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        let session: PersistedSession = serde_json::from_str(&content)
            .map_err(|e| ApiError::storage(format!("corrupt session file {}: {}", self.path.display(), e)))?;
        Ok(Some(session))
    }

    fn save(&self, session: &PersistedSession) -> ApiResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    fn remove(&self) -> ApiResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local storage for tests and embedders that persist elsewhere
#[derive(Debug, Default)]
pub struct MemoryStorage {
    inner: Mutex<Option<PersistedSession>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(Some(PersistedSession {
                access_token: Some(token.into()),
                ..Default::default()
            })),
        }
    }

    pub fn snapshot(&self) -> Option<PersistedSession> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> ApiResult<Option<PersistedSession>> {
        Ok(self.snapshot())
    }

    fn save(&self, session: &PersistedSession) -> ApiResult<()> {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner()) = Some(session.clone());
        Ok(())
    }

    fn remove(&self) -> ApiResult<()> {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}
