//! Request context carrying the authenticated caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use docvault_entity::user::{UserKind, UserRole};

/// Context for the current authenticated request.
///
/// Extracted from JWT claims by the API layer and passed into service
/// methods so every operation knows who is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: Uuid,
    /// The user's role at the time the token was issued.
    pub role: UserRole,
    /// The user's identity kind.
    pub kind: UserKind,
    /// The username (convenience field from JWT claims).
    pub username: String,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: Uuid, role: UserRole, kind: UserKind, username: String) -> Self {
        Self {
            user_id,
            role,
            kind,
            username,
            request_time: Utc::now(),
        }
    }

    /// Whether the current user is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }
}
