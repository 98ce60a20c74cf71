//! One API session's wiring: session store, HTTP client and services.

use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::error::ApiResult;
use crate::http::HttpClient;
use crate::services::{AccountService, RampService};
use crate::session::{SessionStorage, SessionStore};
use crate::table::DataTable;

#[derive(Debug)]
pub struct AppContext {
    pub config: AppConfig,
    pub session: SessionStore,
    pub http: Arc<HttpClient>,
    pub ramps: RampService,
    pub account: AccountService,
}

impl AppContext {
    pub fn new(config: AppConfig, storage: Arc<dyn SessionStorage>) -> ApiResult<Self> {
        let session = SessionStore::open(storage);
        let http = Arc::new(HttpClient::new(&config.api, session.clone())?);
        let stale_time = Duration::from_secs(config.table.stale_time_secs);

        let ramps = RampService::new(http.clone(), stale_time, config.upload.clone());
        let account = AccountService::new(http.clone(), stale_time);

        tracing::debug!(base_url = %http.base_url(), "API context ready");
        Ok(Self {
            config,
            session,
            http,
            ramps,
            account,
        })
    }

    /// Context with a memory-only session
    pub fn in_memory(config: AppConfig) -> ApiResult<Self> {
        Self::new(config, Arc::new(crate::session::MemoryStorage::new()))
    }

    /// A ramps table configured from this context
    pub fn table(&self) -> DataTable {
        DataTable::new(&self.config.table)
    }
}
