use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::http::HttpClient;
use crate::models::{CreateRampDto, DeleteRampsDto, RampRecord, RampsPage};
use crate::query::RampsQuery;
use crate::upload::UploadFile;

use super::{MSG_CREATE_FAILED, MSG_DELETE_FAILED, MSG_EXCEL_FAILED, MSG_LIST_FAILED};

pub async fn list_ramps(http: &HttpClient, query: &RampsQuery) -> ApiResult<RampsPage<RampRecord>> {
    query.validate()?;
    let response = http
        .get("ramps", query.to_pairs())
        .await?
        .ensure_success(Some(MSG_LIST_FAILED))?;
    response.json()
}

/// Create one record; returns the server's body (usually the new record)
pub async fn create_ramp(http: &HttpClient, body: &CreateRampDto) -> ApiResult<Option<Value>> {
    let response = http
        .post_json("ramps", body)
        .await?
        .ensure_success(Some(MSG_CREATE_FAILED))?;
    Ok(response.body().cloned())
}

pub async fn delete_ramps(http: &HttpClient, ids: &[i64]) -> ApiResult<Option<Value>> {
    if ids.is_empty() {
        return Err(ApiError::validation("삭제할 항목을 선택해주세요."));
    }
    let body = DeleteRampsDto { ids: ids.to_vec() };
    let response = http
        .delete_json("ramps", &body)
        .await?
        .ensure_success(Some(MSG_DELETE_FAILED))?;
    Ok(response.body().cloned())
}

/// Bulk import; the sheet is sent as multipart field `file`
pub async fn upload_excel(http: &HttpClient, file: &UploadFile) -> ApiResult<Option<Value>> {
    let response = http.post_multipart("ramps/upload-excel", "file", file.clone()).await?;

    if !response.is_success() {
        let status = response.status();
        return Err(ApiError::http(
            status.as_u16(),
            format!(
                "{}: {} {} {}",
                MSG_EXCEL_FAILED,
                status.as_u16(),
                status.canonical_reason().unwrap_or(""),
                response.text()
            )
            .trim_end()
            .to_string(),
        ));
    }
    Ok(response.body().cloned())
}
