//! File record entity model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::file_type::FileType;

/// A file record: one row per uploaded file.
///
/// Invariant: for every record that exists, exactly one blob exists at
/// `storage_path`. The lifecycle manager owns that invariant.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Unique record identifier, assigned at creation.
    pub id: Uuid,
    /// Required free-text description (1–2000 characters after trimming).
    pub description: String,
    /// Generated unique name the blob is kept under.
    pub stored_name: String,
    /// The user-supplied file name, used for downloads and export names.
    pub original_name: String,
    /// Blob locator relative to the uploads root.
    pub storage_path: String,
    /// Category derived from the stored name's extension.
    pub file_type: FileType,
    /// Blob size in bytes, captured at write time.
    pub file_size_bytes: i64,
    /// Upload content type, captured at write time.
    pub mime_type: Option<String>,
    /// Optional logical date of the underlying document.
    pub file_date: Option<NaiveDate>,
    /// Optional free-text cross-reference (≤255 characters).
    pub reference_number: Option<String>,
    /// The identity that uploaded the file (informational only).
    pub uploaded_by: Uuid,
    /// Server-assigned upload timestamp, immutable.
    pub uploaded_at: DateTime<Utc>,
}

impl FileRecord {
    /// The lowercase extension of the original name, if any.
    pub fn extension(&self) -> Option<String> {
        self.original_name
            .rsplit('.')
            .next()
            .filter(|ext| *ext != self.original_name)
            .map(|ext| ext.to_lowercase())
    }
}

/// Data required to insert a new file record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRecord {
    /// Trimmed description.
    pub description: String,
    /// Generated storage name.
    pub stored_name: String,
    /// Original upload file name.
    pub original_name: String,
    /// Blob locator.
    pub storage_path: String,
    /// Derived file type.
    pub file_type: FileType,
    /// Blob size in bytes.
    pub file_size_bytes: i64,
    /// Upload content type.
    pub mime_type: Option<String>,
    /// Logical document date.
    pub file_date: Option<NaiveDate>,
    /// Cross-reference number.
    pub reference_number: Option<String>,
    /// Acting identity.
    pub uploaded_by: Uuid,
}
