//! JWT token validation.

use jsonwebtoken::{decode, errors::ErrorKind as JwtErrorKind, Algorithm, DecodingKey, Validation};

use docvault_core::config::AuthConfig;
use docvault_core::error::AppError;

use super::claims::Claims;

/// Validates JWT access tokens.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5; // seconds of clock-skew tolerance

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and validates a token string, checking signature and
    /// expiration. Expired tokens get a distinct message so clients can
    /// prompt for re-login instead of reporting a generic failure.
    pub fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => {
                    AppError::unauthorized("Token has expired, please log in again")
                }
                _ => AppError::unauthorized("Invalid authentication token"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::encoder::JwtEncoder;
    use chrono::Utc;
    use docvault_core::ErrorKind;
    use docvault_entity::user::{User, UserKind, UserRole, UserStatus};
    use uuid::Uuid;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".into(),
            token_ttl_hours: 24,
            password_min_length: 8,
        }
    }

    fn user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: Some("alice@example.com".into()),
            password_hash: "hash".into(),
            display_name: Some("Alice".into()),
            role: UserRole::User,
            kind: UserKind::Member,
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    #[test]
    fn test_round_trip() {
        let config = config();
        let user = user();
        let issued = JwtEncoder::new(&config).generate_token(&user).unwrap();

        let claims = JwtDecoder::new(&config).decode_token(&issued.token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, UserRole::User);
        assert_eq!(claims.kind, UserKind::Member);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issued = JwtEncoder::new(&config()).generate_token(&user()).unwrap();

        let mut other = config();
        other.jwt_secret = "different-secret".into();
        let err = JwtDecoder::new(&other).decode_token(&issued.token).unwrap_err();
        assert!(err.is(ErrorKind::Unauthorized));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let err = JwtDecoder::new(&config())
            .decode_token("not.a.token")
            .unwrap_err();
        assert!(err.is(ErrorKind::Unauthorized));
    }
}
