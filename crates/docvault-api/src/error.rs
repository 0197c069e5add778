//! Maps domain `AppError` into HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;

use docvault_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// Newtype carrying an [`AppError`] out of a handler.
///
/// Handlers return `Result<_, ApiError>`; the `From` impl lets `?`
/// lift any service error into a response.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        // The browser client treats every 4xx body uniformly, so the
        // unusual kinds (unsupported media, oversized payload, duplicate
        // unique fields) map to plain 400s rather than their niche
        // status codes.
        let status = match err.kind {
            ErrorKind::Validation
            | ErrorKind::UnsupportedMedia
            | ErrorKind::PayloadTooLarge
            | ErrorKind::Conflict
            | ErrorKind::Serialization => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Storage
            | ErrorKind::Database
            | ErrorKind::Configuration
            | ErrorKind::Internal => {
                error!(kind = %err.kind, message = %err.message, "Internal server error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Never leak storage paths or SQL details to clients.
            "Internal server error".to_string()
        } else {
            err.message
        };

        let body = ApiErrorResponse {
            success: false,
            error: err.kind.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::validation("bad"), StatusCode::BAD_REQUEST),
            (AppError::unsupported_media("nope"), StatusCode::BAD_REQUEST),
            (AppError::payload_too_large("big"), StatusCode::BAD_REQUEST),
            (AppError::unauthorized("who"), StatusCode::UNAUTHORIZED),
            (AppError::forbidden("no"), StatusCode::FORBIDDEN),
            (AppError::not_found("gone"), StatusCode::NOT_FOUND),
            (AppError::conflict("dup"), StatusCode::BAD_REQUEST),
            (AppError::database("boom"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            let response = ApiError(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn test_internal_message_is_generic() {
        let response = ApiError(AppError::database("SELECT exploded at row 3")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
