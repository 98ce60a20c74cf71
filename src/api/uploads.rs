use reqwest::header::CONTENT_TYPE;

use crate::error::{ApiError, ApiResult};
use crate::http::HttpClient;
use crate::models::{PresignRequest, PresignedUpload};
use crate::upload::UploadFile;

use super::{MSG_PRESIGN_FAILED, MSG_PUT_FAILED};

pub async fn request_presigned(http: &HttpClient, file_name: &str, content_type: &str) -> ApiResult<PresignedUpload> {
    let body = PresignRequest {
        file_name: file_name.to_string(),
        content_type: content_type.to_string(),
    };
    let response = http
        .post_json("uploads/presigned", &body)
        .await?
        .ensure_success(Some(MSG_PRESIGN_FAILED))?;
    response.json()
}

/// PUT raw bytes to a presigned URL. No cookies, no bearer token.
pub async fn put_presigned(http: &HttpClient, upload_url: &str, file: &UploadFile) -> ApiResult<()> {
    let response = http
        .storage_client()
        .put(upload_url)
        .header(CONTENT_TYPE, file.effective_content_type())
        .body(file.bytes.clone())
        .send()
        .await
        .map_err(|e| ApiError::network(format!("PUT {}: {}", file.name, e)))?;

    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let text = response.text().await.unwrap_or_default();
    let body_preview: String = text.chars().take(500).collect();
    tracing::error!(status = status.as_u16(), body = %body_preview, "presigned PUT failed");
    Err(ApiError::http(
        status.as_u16(),
        format!(
            "{} status={} {} {}",
            MSG_PUT_FAILED,
            status.as_u16(),
            status.canonical_reason().unwrap_or(""),
            body_preview
        )
        .trim_end()
        .to_string(),
    ))
}
