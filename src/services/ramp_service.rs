use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::api::ramps;
use crate::config::UploadConfig;
use crate::error::ApiResult;
use crate::forms::RampForm;
use crate::http::HttpClient;
use crate::models::{CreateRampDto, RampRecord, RampsPage};
use crate::query::{QueryCache, RampsQuery};
use crate::upload::{self, HttpUploadBackend, UploadFile};

pub type RampsListing = RampsPage<RampRecord>;

pub struct RampService {
    http: Arc<HttpClient>,
    lists: QueryCache<RampsQuery, RampsListing>,
    upload: UploadConfig,
}

impl RampService {
    pub fn new(http: Arc<HttpClient>, stale_time: Duration, upload: UploadConfig) -> Self {
        Self {
            http,
            lists: QueryCache::new(stale_time),
            upload,
        }
    }

    /// One listing, served from cache while fresh
    pub async fn list(&self, query: &RampsQuery) -> ApiResult<Arc<RampsListing>> {
        query.validate()?;
        let http = self.http.clone();
        let key = query.clone();
        self.lists
            .fetch(query.clone(), || async move { ramps::list_ramps(&http, &key).await })
            .await
    }

    pub fn cached(&self, query: &RampsQuery) -> Option<Arc<RampsListing>> {
        self.lists.get_cached(query)
    }

    pub async fn create(&self, dto: &CreateRampDto) -> ApiResult<Option<Value>> {
        let created = ramps::create_ramp(&self.http, dto).await?;
        tracing::info!(district = %dto.district, trade_name = %dto.trade_name, "ramp created");
        self.lists.invalidate();
        Ok(created)
    }

    /// Validate the form and images, upload the images one by one, then
    /// create the record carrying their storage keys.
    ///
    /// Nothing is sent when validation fails. If an upload fails the record
    /// is not created and the images uploaded so far stay in storage.
    pub async fn create_with_images(&self, form: &RampForm, files: &[UploadFile]) -> ApiResult<Option<Value>> {
        form.to_dto(Vec::new())?;
        upload::validate_images(files, &self.upload)?;

        let backend = HttpUploadBackend::new(&self.http);
        let uploaded = upload::upload_files(&backend, files).await?;
        let dto = form.to_dto(upload::uploaded_keys(&uploaded))?;

        self.create(&dto).await
    }

    /// Bulk delete; the ids go out in one request
    pub async fn delete(&self, ids: &[i64]) -> ApiResult<Option<Value>> {
        let result = ramps::delete_ramps(&self.http, ids).await?;
        tracing::info!(count = ids.len(), "ramps deleted");
        self.lists.invalidate();
        Ok(result)
    }

    pub async fn import_excel(&self, file: &UploadFile) -> ApiResult<Option<Value>> {
        upload::validate_spreadsheet(file)?;
        let result = ramps::upload_excel(&self.http, file).await?;
        tracing::info!(file = %file.name, "spreadsheet imported");
        self.lists.invalidate();
        Ok(result)
    }

    /// Drop every cached listing
    pub fn invalidate(&self) {
        self.lists.invalidate();
    }

    pub fn http(&self) -> &Arc<HttpClient> {
        &self.http
    }
}

impl std::fmt::Debug for RampService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RampService")
            .field("lists", &self.lists)
            .finish()
    }
}
