//! Filtered export: a zip archive containing a CSV listing and the
//! matching files.
//!
//! The export re-runs the caller's listing filter without pagination,
//! so what you see filtered is exactly what you get archived. A record
//! whose blob has gone missing still appears in the listing but
//! contributes no archive entry.

use std::io::{Cursor, Write};
use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use tracing::{info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use docvault_core::config::StorageConfig;
use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_core::types::sorting::SortSpec;
use docvault_database::repositories::RecordRepository;
use docvault_database::RecordFilter;
use docvault_entity::record::FileRecord;
use docvault_storage::BlobStore;

/// Placeholder for absent optional fields in the CSV listing.
const EMPTY_FIELD: &str = "-";

/// A finished export archive.
#[derive(Debug, Clone)]
pub struct ExportArchive {
    /// Suggested download filename.
    pub file_name: String,
    /// Zip archive bytes.
    pub data: Bytes,
}

/// Builds export archives for filtered record sets.
#[derive(Debug, Clone)]
pub struct ExportService {
    records: Arc<RecordRepository>,
    blobs: Arc<BlobStore>,
    config: StorageConfig,
}

impl ExportService {
    /// Creates a new export service.
    pub fn new(records: Arc<RecordRepository>, blobs: Arc<BlobStore>, config: StorageConfig) -> Self {
        Self {
            records,
            blobs,
            config,
        }
    }

    /// Exports every record matching the filter, capped at the
    /// configured maximum.
    pub async fn export(&self, filter: &RecordFilter, sort: SortSpec) -> AppResult<ExportArchive> {
        let records = self
            .records
            .list_all(filter, sort, self.config.max_export_records)
            .await?;

        let data = build_archive(&records, &self.blobs).await?;
        let file_name = format!("export-{}.zip", Utc::now().format("%Y%m%d-%H%M%S"));

        info!(
            records = records.len(),
            bytes = data.len(),
            name = %file_name,
            "Export archive built"
        );

        Ok(ExportArchive { file_name, data })
    }
}

/// Assemble the archive: `records.csv` at the root plus each blob as
/// `files/{seq:03}_{base_name}`. The sequence prefix keeps records
/// that share an original file name from colliding; the base name is
/// flattened so no entry ever escapes `files/`.
async fn build_archive(records: &[FileRecord], blobs: &BlobStore) -> AppResult<Bytes> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    writer
        .start_file("records.csv", options)
        .map_err(zip_error)?;
    writer
        .write_all(build_listing(records).as_bytes())
        .map_err(|e| AppError::with_source(ErrorKind::Internal, "Failed to write listing", e))?;

    for (seq, record) in records.iter().enumerate() {
        let data = match blobs.read_bytes(&record.storage_path).await {
            Ok(data) => data,
            Err(e) if e.is(ErrorKind::NotFound) => {
                warn!(
                    record_id = %record.id,
                    path = %record.storage_path,
                    "Blob missing during export, skipping archive entry"
                );
                continue;
            }
            Err(e) => return Err(e),
        };

        let entry_name = format!(
            "files/{:03}_{}",
            seq + 1,
            entry_base_name(&record.original_name)
        );
        writer.start_file(entry_name, options).map_err(zip_error)?;
        writer.write_all(&data).map_err(|e| {
            AppError::with_source(ErrorKind::Internal, "Failed to write archive entry", e)
        })?;
    }

    let cursor = writer.finish().map_err(zip_error)?;
    Ok(Bytes::from(cursor.into_inner()))
}

/// Reduce a client-supplied file name to a flat base name so every
/// blob lands directly under `files/` no matter what the uploader
/// called it. Path separators and `..` segments never survive.
fn entry_base_name(original_name: &str) -> String {
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name)
        .trim();
    if base.is_empty() || base == "." || base == ".." {
        "file".to_string()
    } else {
        base.to_string()
    }
}

/// One row per record: sequence number, description, fileDate,
/// referenceNumber, originalName, fileType, uploadedAt.
fn build_listing(records: &[FileRecord]) -> String {
    let mut csv = String::from(
        "No,Description,File Date,Reference Number,Original Name,File Type,Uploaded At\n",
    );
    for (seq, record) in records.iter().enumerate() {
        let row = [
            (seq + 1).to_string(),
            record.description.clone(),
            record
                .file_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| EMPTY_FIELD.to_string()),
            record
                .reference_number
                .clone()
                .unwrap_or_else(|| EMPTY_FIELD.to_string()),
            record.original_name.clone(),
            record.file_type.to_string(),
            record.uploaded_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ];
        let escaped: Vec<String> = row.iter().map(|f| csv_escape(f)).collect();
        csv.push_str(&escaped.join(","));
        csv.push('\n');
    }
    csv
}

/// Quote a CSV field when it contains a delimiter, quote, or newline.
fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn zip_error(e: zip::result::ZipError) -> AppError {
    AppError::with_source(ErrorKind::Internal, "Failed to build zip archive", e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Read;
    use uuid::Uuid;

    fn record(description: &str, original_name: &str, storage_path: &str) -> FileRecord {
        FileRecord {
            id: Uuid::new_v4(),
            description: description.to_string(),
            stored_name: original_name.to_string(),
            original_name: original_name.to_string(),
            storage_path: storage_path.to_string(),
            file_type: docvault_entity::record::classify(original_name),
            file_size_bytes: 5,
            mime_type: None,
            file_date: NaiveDate::from_ymd_opt(2024, 3, 15),
            reference_number: Some("REF-1".into()),
            uploaded_by: Uuid::new_v4(),
            uploaded_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_archive_contains_listing_and_files() {
        let dir = tempfile::tempdir().unwrap();
        let blobs = BlobStore::new(dir.path().to_str().unwrap()).await.unwrap();
        blobs
            .write("2024/03/a.pdf", Bytes::from_static(b"hello"))
            .await
            .unwrap();

        let present = record("Present", "report.pdf", "2024/03/a.pdf");
        let missing = record("Gone", "report.pdf", "2024/03/b.pdf");

        let data = build_archive(&[present, missing], &blobs).await.unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(data.to_vec())).unwrap();

        let mut listing = String::new();
        archive
            .by_name("records.csv")
            .unwrap()
            .read_to_string(&mut listing)
            .unwrap();
        // Both records are listed even though the second blob is gone.
        assert!(listing.contains("Present"));
        assert!(listing.contains("Gone"));
        assert!(listing.contains("2024-03-15"));
        assert!(listing.contains("REF-1"));

        let mut body = Vec::new();
        archive
            .by_name("files/001_report.pdf")
            .unwrap()
            .read_to_end(&mut body)
            .unwrap();
        assert_eq!(body, b"hello");

        // The missing blob contributes no archive entry.
        assert!(archive.by_name("files/002_report.pdf").is_err());
    }

    #[tokio::test]
    async fn test_hostile_original_names_stay_under_files() {
        let dir = tempfile::tempdir().unwrap();
        let blobs = BlobStore::new(dir.path().to_str().unwrap()).await.unwrap();
        blobs
            .write("2024/03/a.pdf", Bytes::from_static(b"hello"))
            .await
            .unwrap();

        let sneaky = record("Sneaky", "../../etc/passwd.pdf", "2024/03/a.pdf");
        let data = build_archive(&[sneaky], &blobs).await.unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(data.to_vec())).unwrap();
        assert!(archive.by_name("files/001_passwd.pdf").is_ok());
    }

    #[test]
    fn test_entry_base_name_flattens_paths() {
        assert_eq!(entry_base_name("report.pdf"), "report.pdf");
        assert_eq!(entry_base_name("a/b/report.pdf"), "report.pdf");
        assert_eq!(entry_base_name("..\\..\\evil.exe"), "evil.exe");
        assert_eq!(entry_base_name("../.."), "file");
        assert_eq!(entry_base_name("  "), "file");
    }

    #[test]
    fn test_listing_placeholders() {
        let mut r = record("No extras", "a.pdf", "2024/03/a.pdf");
        r.file_date = None;
        r.reference_number = None;

        let listing = build_listing(&[r]);
        let row = listing.lines().nth(1).unwrap();
        assert_eq!(row.split(',').nth(2).unwrap(), "-");
        assert_eq!(row.split(',').nth(3).unwrap(), "-");
    }

    #[test]
    fn test_csv_escape() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_escape("two\nlines"), "\"two\nlines\"");
    }
}
