use std::collections::HashMap;
use std::path::Path;

use crate::config::UploadConfig;
use crate::error::{ApiError, ApiResult};

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

const SPREADSHEET_EXTENSIONS: [&str; 3] = ["xlsx", "xls", "csv"];

/// A file held in memory for upload
#[derive(Clone, PartialEq)]
pub struct UploadFile {
    pub name: String,
    /// Declared content type; empty when unknown
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> ApiResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::validation(format!("cannot read {}: {}", path.display(), e)))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let content_type = content_type_for(&name).unwrap_or_default().to_string();
        Ok(Self::new(name, content_type, bytes))
    }

    /// Declared content type, or `application/octet-stream`
    pub fn effective_content_type(&self) -> &str {
        if self.content_type.trim().is_empty() {
            DEFAULT_CONTENT_TYPE
        } else {
            &self.content_type
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
    }

    pub(crate) fn to_form(&self, field: &str) -> ApiResult<reqwest::multipart::Form> {
        let part = reqwest::multipart::Part::bytes(self.bytes.clone())
            .file_name(self.name.clone())
            .mime_str(self.effective_content_type())
            .map_err(|e| ApiError::validation(format!("invalid content type '{}': {}", self.content_type, e)))?;
        Ok(reqwest::multipart::Form::new().part(field.to_string(), part))
    }
}

impl std::fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadFile")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Content type from a file extension, for the types this registry accepts
pub fn content_type_for(name: &str) -> Option<&'static str> {
    let ext = Path::new(name).extension()?.to_string_lossy().to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "xls" => "application/vnd.ms-excel",
        "csv" => "text/csv",
        _ => return None,
    };
    Some(mime)
}

/// Check ramp photos before any presign request is made
pub fn validate_images(files: &[UploadFile], config: &UploadConfig) -> ApiResult<()> {
    if files.len() > config.max_files {
        return Err(ApiError::validation(format!(
            "이미지는 최대 {}개까지 업로드할 수 있습니다.",
            config.max_files
        )));
    }

    let mut field_errors = HashMap::new();
    for file in files {
        if file.bytes.is_empty() {
            field_errors.insert(file.name.clone(), "빈 파일은 업로드할 수 없습니다.".to_string());
        } else if file.size() > config.max_file_size_bytes {
            field_errors.insert(
                file.name.clone(),
                format!("파일 크기는 {}MB 이하여야 합니다.", config.max_file_size_bytes / (1024 * 1024)),
            );
        } else if !config
            .allowed_image_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(file.effective_content_type()))
        {
            field_errors.insert(
                file.name.clone(),
                format!("지원하지 않는 파일 형식입니다: {}", file.effective_content_type()),
            );
        }
    }

    if field_errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_fields("이미지 파일을 확인해주세요.", field_errors))
    }
}

/// Check a bulk-import spreadsheet before it is sent
pub fn validate_spreadsheet(file: &UploadFile) -> ApiResult<()> {
    let ext = file.extension().unwrap_or_default();
    if !SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
        let mut field_errors = HashMap::new();
        field_errors.insert("file".to_string(), format!("xlsx, xls, csv 파일만 가능합니다: {}", file.name));
        return Err(ApiError::validation_fields("엑셀 파일을 선택해주세요.", field_errors));
    }
    if file.bytes.is_empty() {
        return Err(ApiError::validation("빈 파일은 업로드할 수 없습니다."));
    }
    Ok(())
}
