//! Record lifecycle service: create, update, delete, download.
//!
//! The ordering rules between blob storage and the database live here:
//!
//! * create: blob first, row second, compensating blob delete if the
//!   insert fails — a row must never point at a missing blob;
//! * replace: the new blob is durable before the old one is removed;
//! * delete: the row goes first, the blob removal is best-effort — a
//!   leftover blob is reclaimed by the orphan sweep, a dangling row
//!   never is.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{Datelike, NaiveDate, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use docvault_core::config::StorageConfig;
use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_database::repositories::RecordRepository;
use docvault_entity::event::{ChangeNotifier, RecordEvent};
use docvault_entity::record::{classify, CreateRecord, FileRecord};
use docvault_storage::{generate_stored_name, BlobStore, ByteStream};

use crate::context::RequestContext;

/// Parameters for uploading a new record.
#[derive(Debug, Clone)]
pub struct UploadParams {
    /// User-supplied description.
    pub description: String,
    /// Original client-side filename.
    pub file_name: String,
    /// Declared MIME type, if the client sent one.
    pub mime_type: Option<String>,
    /// Logical document date.
    pub file_date: Option<NaiveDate>,
    /// External reference number.
    pub reference_number: Option<String>,
    /// File content.
    pub data: Bytes,
}

/// A replacement file attached to a metadata update.
#[derive(Debug, Clone)]
pub struct ReplacementFile {
    /// Original client-side filename.
    pub file_name: String,
    /// Declared MIME type, if the client sent one.
    pub mime_type: Option<String>,
    /// File content.
    pub data: Bytes,
}

/// Parameters for updating an existing record.
///
/// `None` fields are left unchanged; `clear_file_date` and
/// `clear_reference_number` explicitly blank optional metadata.
#[derive(Debug, Clone, Default)]
pub struct UpdateParams {
    /// New description.
    pub description: Option<String>,
    /// New logical document date.
    pub file_date: Option<NaiveDate>,
    /// Blank the logical document date.
    pub clear_file_date: bool,
    /// New reference number.
    pub reference_number: Option<String>,
    /// Blank the reference number.
    pub clear_reference_number: bool,
    /// Replacement file content.
    pub replacement: Option<ReplacementFile>,
}

/// Handles the record write lifecycle and downloads.
#[derive(Clone)]
pub struct RecordService {
    records: Arc<RecordRepository>,
    blobs: Arc<BlobStore>,
    notifier: Arc<dyn ChangeNotifier>,
    config: StorageConfig,
}

impl std::fmt::Debug for RecordService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordService").finish()
    }
}

impl RecordService {
    /// Creates a new record service.
    pub fn new(
        records: Arc<RecordRepository>,
        blobs: Arc<BlobStore>,
        notifier: Arc<dyn ChangeNotifier>,
        config: StorageConfig,
    ) -> Self {
        Self {
            records,
            blobs,
            notifier,
            config,
        }
    }

    /// Uploads a new record: blob write first, row insert second.
    pub async fn create(&self, ctx: &RequestContext, params: UploadParams) -> AppResult<FileRecord> {
        validate_description(&params.description)?;
        validate_reference_number(params.reference_number.as_deref())?;
        validate_upload(params.mime_type.as_deref(), params.data.len(), &self.config)?;

        let stored_name = generate_stored_name(&params.file_name);
        let storage_path = sharded_path(&stored_name);
        let file_size_bytes = params.data.len() as i64;

        self.blobs.write(&storage_path, params.data).await?;

        let create = CreateRecord {
            description: params.description.trim().to_string(),
            stored_name,
            original_name: params.file_name.clone(),
            storage_path: storage_path.clone(),
            file_type: classify(&params.file_name),
            file_size_bytes,
            mime_type: params.mime_type,
            file_date: params.file_date,
            reference_number: params.reference_number,
            uploaded_by: ctx.user_id,
        };

        let record = match self.records.create(&create).await {
            Ok(record) => record,
            Err(e) => {
                // Roll the blob back so the failed insert leaves nothing
                // behind on disk.
                if let Err(cleanup) = self.blobs.delete(&storage_path).await {
                    warn!(
                        path = %storage_path,
                        error = %cleanup,
                        "Failed to clean up blob after insert failure"
                    );
                }
                return Err(e);
            }
        };

        info!(
            user_id = %ctx.user_id,
            record_id = %record.id,
            name = %record.original_name,
            size = record.file_size_bytes,
            "Record created"
        );

        self.notifier.publish(RecordEvent::Created {
            record: record.clone(),
        });
        Ok(record)
    }

    /// Updates a record's metadata and optionally replaces its file.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        params: UpdateParams,
    ) -> AppResult<FileRecord> {
        let mut record = self
            .records
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Record {id} not found")))?;

        // A blank description leaves the stored value alone; only a
        // non-blank value overwrites.
        if let Some(description) = params.description.as_deref().filter(|d| !d.trim().is_empty()) {
            validate_description(description)?;
            record.description = description.trim().to_string();
        }
        if params.clear_file_date {
            record.file_date = None;
        } else if let Some(date) = params.file_date {
            record.file_date = Some(date);
        }
        if params.clear_reference_number {
            record.reference_number = None;
        } else if let Some(reference) = params.reference_number {
            validate_reference_number(Some(&reference))?;
            record.reference_number = Some(reference);
        }

        let old_path = record.storage_path.clone();
        let mut new_path = None;

        if let Some(replacement) = params.replacement {
            validate_upload(
                replacement.mime_type.as_deref(),
                replacement.data.len(),
                &self.config,
            )?;

            let stored_name = generate_stored_name(&replacement.file_name);
            let storage_path = sharded_path(&stored_name);
            record.file_size_bytes = replacement.data.len() as i64;
            record.file_type = classify(&replacement.file_name);
            record.mime_type = replacement.mime_type;
            record.original_name = replacement.file_name;
            record.stored_name = stored_name;
            record.storage_path = storage_path.clone();

            self.blobs.write(&storage_path, replacement.data).await?;
            new_path = Some(storage_path);
        }

        let updated = match self.records.update(&record).await {
            Ok(Some(updated)) => updated,
            Ok(None) => {
                self.discard_new_blob(new_path.as_deref()).await;
                return Err(AppError::not_found(format!("Record {id} not found")));
            }
            Err(e) => {
                self.discard_new_blob(new_path.as_deref()).await;
                return Err(e);
            }
        };

        // The row now points at the new blob; the old one is garbage.
        if new_path.is_some() {
            if let Err(e) = self.blobs.delete(&old_path).await {
                warn!(path = %old_path, error = %e, "Failed to delete replaced blob");
            }
        }

        info!(
            user_id = %ctx.user_id,
            record_id = %updated.id,
            replaced_file = new_path.is_some(),
            "Record updated"
        );

        self.notifier.publish(RecordEvent::Updated {
            record: updated.clone(),
        });
        Ok(updated)
    }

    /// Deletes a record and its blob.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        let record = self
            .records
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Record {id} not found")))?;

        if !self.records.delete(id).await? {
            return Err(AppError::not_found(format!("Record {id} not found")));
        }

        // Row is gone; a failed blob delete leaves an orphan for the
        // sweep, never a dangling reference.
        if let Err(e) = self.blobs.delete(&record.storage_path).await {
            warn!(
                record_id = %id,
                path = %record.storage_path,
                error = %e,
                "Failed to delete blob for removed record"
            );
        }

        info!(user_id = %ctx.user_id, record_id = %id, "Record deleted");

        self.notifier.publish(RecordEvent::Deleted { id });
        Ok(())
    }

    /// Fetches a single record.
    pub async fn get(&self, id: Uuid) -> AppResult<FileRecord> {
        self.records
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Record {id} not found")))
    }

    /// Opens a record's blob for download.
    ///
    /// A record whose blob has vanished surfaces as not-found to the
    /// caller, but is logged as a data-integrity problem.
    pub async fn download(&self, id: Uuid) -> AppResult<(FileRecord, ByteStream)> {
        let record = self.get(id).await?;
        match self.blobs.read(&record.storage_path).await {
            Ok(stream) => Ok((record, stream)),
            Err(e) if e.is(ErrorKind::NotFound) => {
                warn!(
                    record_id = %id,
                    path = %record.storage_path,
                    "Record exists but its blob is missing"
                );
                Err(AppError::not_found(format!("File for record {id} not found")))
            }
            Err(e) => Err(e),
        }
    }

    async fn discard_new_blob(&self, path: Option<&str>) {
        if let Some(path) = path {
            if let Err(e) = self.blobs.delete(path).await {
                warn!(path, error = %e, "Failed to clean up blob after update failure");
            }
        }
    }
}

/// Shard stored files into year/month directories.
fn sharded_path(stored_name: &str) -> String {
    let now = Utc::now();
    format!("{:04}/{:02}/{}", now.year(), now.month(), stored_name)
}

const MAX_DESCRIPTION_CHARS: usize = 2000;
const MAX_REFERENCE_CHARS: usize = 255;

fn validate_description(description: &str) -> AppResult<()> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Description is required"));
    }
    if trimmed.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(AppError::validation(format!(
            "Description must be at most {MAX_DESCRIPTION_CHARS} characters"
        )));
    }
    Ok(())
}

fn validate_reference_number(reference: Option<&str>) -> AppResult<()> {
    if let Some(reference) = reference {
        if reference.chars().count() > MAX_REFERENCE_CHARS {
            return Err(AppError::validation(format!(
                "Reference number must be at most {MAX_REFERENCE_CHARS} characters"
            )));
        }
    }
    Ok(())
}

/// Enforce the upload size limit and MIME allow-list.
///
/// An absent MIME type is accepted; type classification comes from the
/// filename, not the declared type.
fn validate_upload(mime_type: Option<&str>, size: usize, config: &StorageConfig) -> AppResult<()> {
    if size as u64 > config.max_upload_size_bytes {
        return Err(AppError::payload_too_large(format!(
            "File exceeds maximum upload size of {} bytes",
            config.max_upload_size_bytes
        )));
    }

    if let Some(mime) = mime_type {
        let base = mime.split(';').next().unwrap_or(mime).trim();
        let allowed = config
            .allowed_mime_types
            .iter()
            .any(|m| m.eq_ignore_ascii_case(base));
        if !allowed {
            return Err(AppError::unsupported_media(format!(
                "File type '{base}' is not allowed"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use docvault_core::ErrorKind;

    fn config() -> StorageConfig {
        StorageConfig::default()
    }

    #[test]
    fn test_description_must_not_be_blank() {
        assert!(validate_description("Quarterly report").is_ok());
        let err = validate_description("   ").unwrap_err();
        assert!(err.is(ErrorKind::Validation));
    }

    #[test]
    fn test_description_length_capped() {
        assert!(validate_description(&"x".repeat(2000)).is_ok());
        let err = validate_description(&"x".repeat(2001)).unwrap_err();
        assert!(err.is(ErrorKind::Validation));
    }

    #[test]
    fn test_reference_number_length_capped() {
        assert!(validate_reference_number(None).is_ok());
        assert!(validate_reference_number(Some("REF-2024-001")).is_ok());
        let err = validate_reference_number(Some(&"r".repeat(256))).unwrap_err();
        assert!(err.is(ErrorKind::Validation));
    }

    #[test]
    fn test_oversized_upload_rejected() {
        let config = config();
        let err =
            validate_upload(None, (config.max_upload_size_bytes + 1) as usize, &config).unwrap_err();
        assert!(err.is(ErrorKind::PayloadTooLarge));
    }

    #[test]
    fn test_mime_allow_list() {
        let config = config();
        assert!(validate_upload(Some("application/pdf"), 10, &config).is_ok());
        assert!(validate_upload(Some("APPLICATION/PDF"), 10, &config).is_ok());
        assert!(validate_upload(Some("image/png; charset=binary"), 10, &config).is_ok());
        assert!(validate_upload(None, 10, &config).is_ok());

        let err = validate_upload(Some("application/x-msdownload"), 10, &config).unwrap_err();
        assert!(err.is(ErrorKind::UnsupportedMedia));
    }

    #[test]
    fn test_sharded_path_shape() {
        let path = sharded_path("123-abc-report.pdf");
        let parts: Vec<&str> = path.split('/').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 4);
        assert_eq!(parts[1].len(), 2);
        assert_eq!(parts[2], "123-abc-report.pdf");
    }
}
