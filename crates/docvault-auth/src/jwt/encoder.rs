//! JWT token creation with configurable signing and TTL.

use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};

use docvault_core::config::AuthConfig;
use docvault_core::error::AppError;
use docvault_entity::user::User;

use super::claims::Claims;

/// Creates signed JWT access tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Token TTL in hours.
    token_ttl_hours: i64,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("token_ttl_hours", &self.token_ttl_hours)
            .finish()
    }
}

/// A freshly issued token and its expiry.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct IssuedToken {
    /// The signed token string.
    pub token: String,
    /// When the token expires.
    pub expires_at: DateTime<Utc>,
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            token_ttl_hours: config.token_ttl_hours as i64,
        }
    }

    /// Generates an access token for the given user.
    pub fn generate_token(&self, user: &User) -> Result<IssuedToken, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::hours(self.token_ttl_hours);

        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            role: user.role,
            kind: user.kind,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))?;

        Ok(IssuedToken { token, expires_at })
    }
}
