//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use docvault_core::types::pagination::PageResponse;
use docvault_entity::record::FileRecord;
use docvault_entity::user::User;

/// Standard success response wrapper: `{success, message, data?}`,
/// mirroring the error envelope from the error module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Human-readable message.
    pub message: String,
    /// Response data, omitted for message-only responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response carrying data.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: "OK".to_string(),
            data: Some(data),
        }
    }

    /// Creates a successful response with a custom message.
    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Creates a successful message-only response with no data.
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

/// User summary exposed over the API. Never includes the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// User ID.
    pub id: Uuid,
    /// Username.
    pub username: String,
    /// Email.
    pub email: Option<String>,
    /// Display name.
    pub display_name: Option<String>,
    /// Role.
    pub role: String,
    /// Identity kind.
    pub kind: String,
    /// Account status.
    pub status: String,
    /// Created at.
    pub created_at: DateTime<Utc>,
    /// Last login.
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            display_name: user.display_name,
            role: user.role.to_string(),
            kind: user.kind.to_string(),
            status: user.status.to_string(),
            created_at: user.created_at,
            last_login_at: user.last_login_at,
        }
    }
}

/// Login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Access token.
    pub token: String,
    /// Token expiration.
    pub expires_at: DateTime<Utc>,
    /// The authenticated user.
    pub user: UserResponse,
}

/// Pagination metadata in the shape the browser client expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    /// Current page (1-based).
    pub current_page: u64,
    /// Total number of pages (0 when the result set is empty).
    pub total_pages: u64,
    /// Total matching records.
    pub total_records: u64,
    /// Page size used.
    pub page_size: u64,
    /// Whether a next page exists.
    pub has_next_page: bool,
    /// Whether a previous page exists.
    pub has_prev_page: bool,
}

/// A page of records plus pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordListResponse {
    /// The records on this page.
    pub records: Vec<FileRecord>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

impl From<PageResponse<FileRecord>> for RecordListResponse {
    fn from(page: PageResponse<FileRecord>) -> Self {
        Self {
            pagination: PaginationMeta {
                current_page: page.page,
                total_pages: page.total_pages,
                total_records: page.total_items,
                page_size: page.page_size,
                has_next_page: page.has_next,
                has_prev_page: page.has_previous,
            },
            records: page.items,
        }
    }
}

/// Component health in the health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status: "ok" or "degraded".
    pub status: String,
    /// Database reachability.
    pub database: bool,
    /// Blob store reachability.
    pub storage: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_shape() {
        let json = serde_json::to_value(ApiResponse::ok(42)).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "OK");
        assert_eq!(json["data"], 42);
    }

    #[test]
    fn test_message_only_envelope_omits_data() {
        let json = serde_json::to_value(ApiResponse::<()>::message_only("Record deleted")).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Record deleted");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_pagination_meta_shape() {
        let page: PageResponse<FileRecord> = PageResponse::new(Vec::new(), 1, 10, 0);
        let response = RecordListResponse::from(page);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["pagination"]["currentPage"], 1);
        assert_eq!(json["pagination"]["totalPages"], 0);
        assert_eq!(json["pagination"]["hasNextPage"], false);
        assert_eq!(json["records"], serde_json::json!([]));
    }
}
