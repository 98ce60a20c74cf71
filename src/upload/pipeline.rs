use async_trait::async_trait;

use crate::api::uploads;
use crate::error::{ApiError, ApiResult};
use crate::http::HttpClient;
use crate::models::PresignedUpload;

use super::file::UploadFile;

/// The two network steps of a presigned upload
#[async_trait]
pub trait UploadBackend: Send + Sync {
    async fn presign(&self, file_name: &str, content_type: &str) -> ApiResult<PresignedUpload>;
    async fn put(&self, upload_url: &str, file: &UploadFile) -> ApiResult<()>;
}

/// Presign through the API, PUT straight to storage
pub struct HttpUploadBackend<'a> {
    http: &'a HttpClient,
}

impl<'a> HttpUploadBackend<'a> {
    pub fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl UploadBackend for HttpUploadBackend<'_> {
    async fn presign(&self, file_name: &str, content_type: &str) -> ApiResult<PresignedUpload> {
        uploads::request_presigned(self.http, file_name, content_type).await
    }

    async fn put(&self, upload_url: &str, file: &UploadFile) -> ApiResult<()> {
        uploads::put_presigned(self.http, upload_url, file).await
    }
}

/// Upload `files` one after another: presign file N, PUT file N, then move
/// on to file N+1.
///
/// The first failure aborts the run with [`ApiError::Upload`] carrying the
/// failed index and the keys already uploaded. Earlier uploads are not
/// rolled back.
pub async fn upload_files<B>(backend: &B, files: &[UploadFile]) -> ApiResult<Vec<PresignedUpload>>
where
    B: UploadBackend + ?Sized,
{
    let mut uploads: Vec<PresignedUpload> = Vec::with_capacity(files.len());

    for (index, file) in files.iter().enumerate() {
        let content_type = file.effective_content_type();
        tracing::debug!(file = %file.name, content_type, "requesting presigned URL");

        let presigned = backend
            .presign(&file.name, content_type)
            .await
            .map_err(|e| upload_failure(index, file, e, &uploads))?;
        tracing::debug!(
            key = %presigned.key,
            upload_url = %preview(&presigned.upload_url),
            expires_in = presigned.expires_in,
            "presigned URL issued"
        );

        backend
            .put(&presigned.upload_url, file)
            .await
            .map_err(|e| upload_failure(index, file, e, &uploads))?;
        tracing::debug!(file = %file.name, key = %presigned.key, "upload complete");

        uploads.push(presigned);
    }

    Ok(uploads)
}

/// Storage keys to send with the ramp record
pub fn uploaded_keys(uploads: &[PresignedUpload]) -> Vec<String> {
    uploads.iter().map(|u| u.key.clone()).collect()
}

fn upload_failure(index: usize, file: &UploadFile, err: ApiError, done: &[PresignedUpload]) -> ApiError {
    tracing::error!(file = %file.name, index, "upload aborted: {}", err);
    ApiError::Upload {
        index,
        file_name: file.name.clone(),
        status: err.status_code(),
        message: err.to_string(),
        uploaded: uploaded_keys(done),
    }
}

fn preview(url: &str) -> &str {
    match url.char_indices().nth(200) {
        Some((idx, _)) => &url[..idx],
        None => url,
    }
}
