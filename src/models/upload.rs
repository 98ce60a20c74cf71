use serde::{Deserialize, Serialize};

/// Body of `uploads/presigned`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignRequest {
    pub file_name: String,
    pub content_type: String,
}

/// Per-file upload descriptor issued by the server. Consumed once by the
/// upload pipeline; only `key` outlives the upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUpload {
    pub key: String,
    pub upload_url: String,
    #[serde(default)]
    pub public_url: String,
    #[serde(default)]
    pub expires_in: u64,
}
