//! Blob storage and upload configuration.

use serde::{Deserialize, Serialize};

/// Blob storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for uploaded file blobs.
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: String,
    /// Maximum upload size in bytes (default 25 MB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// Allowed upload content types.
    #[serde(default = "default_allowed_mime_types")]
    pub allowed_mime_types: Vec<String>,
    /// Maximum number of records an export bundle may contain.
    ///
    /// The export archive is assembled in memory; this cap bounds that
    /// buffer. Callers exceeding it are asked to narrow their filter.
    #[serde(default = "default_max_export_records")]
    pub max_export_records: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            uploads_dir: default_uploads_dir(),
            max_upload_size_bytes: default_max_upload(),
            allowed_mime_types: default_allowed_mime_types(),
            max_export_records: default_max_export_records(),
        }
    }
}

fn default_uploads_dir() -> String {
    "./data/uploads".to_string()
}

fn default_max_upload() -> u64 {
    26_214_400 // 25 MB
}

fn default_allowed_mime_types() -> Vec<String> {
    [
        "application/pdf",
        "application/msword",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "application/vnd.ms-excel",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "image/jpeg",
        "image/png",
        "image/gif",
        "image/bmp",
        "image/webp",
        "text/plain",
        "application/octet-stream",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_max_export_records() -> u64 {
    10_000
}
