//! Presigned upload pipeline and client-side file checks.

pub mod file;
pub mod pipeline;

pub use file::{validate_images, validate_spreadsheet, UploadFile, DEFAULT_CONTENT_TYPE};
pub use pipeline::{upload_files, uploaded_keys, HttpUploadBackend, UploadBackend};
