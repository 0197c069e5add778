//! JWT claims structure embedded in every access token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use docvault_entity::user::{UserKind, UserRole};

/// Claims payload carried by a DocVault access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject, the user ID.
    pub sub: Uuid,
    /// Username for convenience.
    pub username: String,
    /// User role at the time of issuance.
    pub role: UserRole,
    /// Identity kind at the time of issuance.
    pub kind: UserKind,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    /// The user ID from the subject claim.
    pub fn user_id(&self) -> Uuid {
        self.sub
    }

    /// The expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }

    /// Whether this token has already expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}
