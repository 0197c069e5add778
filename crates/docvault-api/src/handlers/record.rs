//! Record handlers: listing, stats, upload, update, delete, download,
//! export.

use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use axum::Json;
use bytes::Bytes;
use chrono::NaiveDate;
use uuid::Uuid;

use docvault_core::error::AppError;
use docvault_database::repositories::RecordStats;
use docvault_entity::record::FileRecord;
use docvault_service::record::{ReplacementFile, UpdateParams, UploadParams};

use crate::dto::response::{ApiResponse, RecordListResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ListParams};
use crate::state::AppState;

/// GET /api/files
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    params: ListParams,
) -> Result<Json<ApiResponse<RecordListResponse>>, ApiError> {
    let page = state
        .query_service
        .list(&params.filter, params.sort, &params.page)
        .await?;
    Ok(Json(ApiResponse::ok(page.into())))
}

/// GET /api/files/stats
pub async fn stats(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<ApiResponse<RecordStats>>, ApiError> {
    let stats = state.query_service.stats().await?;
    Ok(Json(ApiResponse::ok(stats)))
}

/// GET /api/files/{id}
pub async fn get(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<FileRecord>>, ApiError> {
    let record = state.record_service.get(id).await?;
    Ok(Json(ApiResponse::ok(record)))
}

/// POST /api/files
pub async fn upload(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<FileRecord>>), ApiError> {
    let form = RecordForm::read(multipart).await?;
    let file = form
        .file
        .ok_or_else(|| AppError::validation("A file is required"))?;

    let record = state
        .record_service
        .create(
            &auth,
            UploadParams {
                description: form.description.unwrap_or_default(),
                file_name: file.file_name,
                mime_type: file.mime_type,
                file_date: parse_form_date(form.file_date.as_deref())?,
                reference_number: form.reference_number.filter(|r| !r.trim().is_empty()),
                data: file.data,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(record))))
}

/// PUT /api/files/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<FileRecord>>, ApiError> {
    let form = RecordForm::read(multipart).await?;

    // An empty form value means "blank this field"; an absent field
    // means "leave it alone".
    let (file_date, clear_file_date) = match form.file_date.as_deref().map(str::trim) {
        None => (None, false),
        Some("") => (None, true),
        Some(value) => (parse_form_date(Some(value))?, false),
    };
    let (reference_number, clear_reference_number) =
        match form.reference_number.map(|r| r.trim().to_string()) {
            None => (None, false),
            Some(r) if r.is_empty() => (None, true),
            Some(r) => (Some(r), false),
        };

    let record = state
        .record_service
        .update(
            &auth,
            id,
            UpdateParams {
                description: form.description,
                file_date,
                clear_file_date,
                reference_number,
                clear_reference_number,
                replacement: form.file.map(|f| ReplacementFile {
                    file_name: f.file_name,
                    mime_type: f.mime_type,
                    data: f.data,
                }),
            },
        )
        .await?;

    Ok(Json(ApiResponse::ok(record)))
}

/// DELETE /api/files/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.record_service.delete(&auth, id).await?;
    Ok(Json(ApiResponse::message_only("Record deleted")))
}

/// GET /api/files/{id}/download
pub async fn download(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let (record, stream) = state.record_service.download(id).await?;

    let mime = record
        .mime_type
        .as_deref()
        .unwrap_or("application/octet-stream");

    let response = Response::builder()
        .header(header::CONTENT_TYPE, mime)
        .header(
            header::CONTENT_DISPOSITION,
            attachment_disposition(&record.original_name),
        )
        .header(header::CONTENT_LENGTH, record.file_size_bytes)
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::internal(format!("Failed to build download response: {e}")))?;

    Ok(response)
}

/// GET /api/files/export
///
/// Takes the same query parameters as the listing and archives every
/// matching record.
pub async fn export(
    State(state): State<AppState>,
    _auth: AuthUser,
    params: ListParams,
) -> Result<Response, ApiError> {
    let archive = state
        .export_service
        .export(&params.filter, params.sort)
        .await?;

    let response = Response::builder()
        .header(header::CONTENT_TYPE, "application/zip")
        .header(
            header::CONTENT_DISPOSITION,
            attachment_disposition(&archive.file_name),
        )
        .header(header::CONTENT_LENGTH, archive.data.len())
        .body(Body::from(archive.data))
        .map_err(|e| AppError::internal(format!("Failed to build export response: {e}")))?;

    Ok(response)
}

/// A parsed multipart upload/update form.
#[derive(Debug, Default)]
struct RecordForm {
    description: Option<String>,
    file_date: Option<String>,
    reference_number: Option<String>,
    file: Option<FilePart>,
}

#[derive(Debug)]
struct FilePart {
    file_name: String,
    mime_type: Option<String>,
    data: Bytes,
}

impl RecordForm {
    /// Drain a multipart stream into the known form fields. Unknown
    /// fields are ignored so client additions do not break uploads.
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::validation(format!("Malformed multipart body: {e}")))?
        {
            match field.name() {
                Some("description") => {
                    form.description = Some(read_text(field).await?);
                }
                Some("fileDate") => {
                    form.file_date = Some(read_text(field).await?);
                }
                Some("letterReferenceNumber") => {
                    form.reference_number = Some(read_text(field).await?);
                }
                Some("file") => {
                    let file_name = field
                        .file_name()
                        .map(str::to_string)
                        .filter(|n| !n.is_empty())
                        .ok_or_else(|| AppError::validation("Uploaded file has no name"))?;
                    let mime_type = field.content_type().map(str::to_string);
                    let data = field.bytes().await.map_err(|e| {
                        AppError::validation(format!("Failed to read uploaded file: {e}"))
                    })?;
                    form.file = Some(FilePart {
                        file_name,
                        mime_type,
                        data,
                    });
                }
                _ => {}
            }
        }

        Ok(form)
    }
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::validation(format!("Malformed form field: {e}")))
}

fn parse_form_date(value: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| AppError::validation(format!("Invalid fileDate: '{value}', expected YYYY-MM-DD")))
}

/// Build a `Content-Disposition: attachment` value, falling back to a
/// bland name if the original cannot be carried in a header.
fn attachment_disposition(file_name: &str) -> HeaderValue {
    let sanitized: String = file_name
        .chars()
        .map(|c| if c == '"' || c.is_control() { '_' } else { c })
        .collect();
    HeaderValue::from_str(&format!("attachment; filename=\"{sanitized}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment; filename=\"download\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_form_date() {
        assert_eq!(
            parse_form_date(Some("2024-03-15")).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 15)
        );
        assert_eq!(parse_form_date(Some("  ")).unwrap(), None);
        assert_eq!(parse_form_date(None).unwrap(), None);
        assert!(parse_form_date(Some("15/03/2024")).is_err());
    }

    #[test]
    fn test_attachment_disposition_sanitizes() {
        let value = attachment_disposition("report \"final\".pdf");
        assert_eq!(
            value.to_str().unwrap(),
            "attachment; filename=\"report _final_.pdf\""
        );

        let value = attachment_disposition("plain.pdf");
        assert_eq!(value.to_str().unwrap(), "attachment; filename=\"plain.pdf\"");
    }
}
