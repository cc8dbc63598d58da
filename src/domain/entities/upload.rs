use actix_web::web::Bytes;
use serde::Serialize;

/// One file picked in the admin image uploader.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, content_type: Option<String>, bytes: impl Into<Bytes>) -> Self {
        UploadFile {
            file_name: file_name.into(),
            content_type,
            bytes: bytes.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadedImagesResponse {
    pub message: String,
    /// Public URLs in the order the files were selected.
    pub images: Vec<String>,
}
