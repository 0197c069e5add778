//! Login, registration, and current-user lookup.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use docvault_auth::jwt::{IssuedToken, JwtEncoder};
use docvault_auth::password::PasswordHasher;
use docvault_core::config::AuthConfig;
use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_database::repositories::UserRepository;
use docvault_entity::user::{CreateUser, User, UserKind, UserRole, UserStatus};

/// Parameters for registering a new account.
#[derive(Debug, Clone)]
pub struct RegisterParams {
    /// Login name.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Plaintext password, hashed before storage.
    pub password: String,
    /// Human-readable display name.
    pub display_name: String,
    /// Identity kind being registered.
    pub kind: UserKind,
}

/// Handles login, registration, and identity lookups.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<UserRepository>,
    hasher: PasswordHasher,
    encoder: JwtEncoder,
    config: AuthConfig,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService").finish()
    }
}

impl AuthService {
    /// Creates a new auth service.
    pub fn new(users: Arc<UserRepository>, config: AuthConfig) -> Self {
        Self {
            users,
            hasher: PasswordHasher::new(),
            encoder: JwtEncoder::new(&config),
            config,
        }
    }

    /// Authenticates a user and issues an access token.
    ///
    /// Unknown usernames and wrong passwords produce the same message so
    /// the endpoint cannot be used to probe for accounts.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<(User, IssuedToken)> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid username or password"))?;

        if !self.hasher.verify_password(password, &user.password_hash)? {
            return Err(AppError::unauthorized("Invalid username or password"));
        }

        match user.status {
            UserStatus::Active => {}
            UserStatus::Pending => {
                return Err(AppError::forbidden("Account is pending approval"));
            }
            UserStatus::Inactive => {
                return Err(AppError::forbidden("Account has been deactivated"));
            }
        }

        if let Err(e) = self.users.touch_last_login(user.id).await {
            // Login still succeeds; the timestamp is advisory.
            warn!(user_id = %user.id, error = %e, "Failed to record login time");
        }

        let token = self.encoder.generate_token(&user)?;
        info!(user_id = %user.id, username = %user.username, "User logged in");
        Ok((user, token))
    }

    /// Registers a new account.
    ///
    /// Member accounts become active immediately; institution accounts
    /// start pending and must be approved by an admin before they can
    /// log in.
    pub async fn register(&self, params: RegisterParams) -> AppResult<User> {
        validate_registration(&params, self.config.password_min_length)?;

        let status = match params.kind {
            UserKind::Member => UserStatus::Active,
            UserKind::Institution => UserStatus::Pending,
        };

        let create = CreateUser {
            username: params.username.trim().to_string(),
            email: Some(params.email.trim().to_string()),
            password_hash: self.hasher.hash_password(&params.password)?,
            display_name: Some(params.display_name.trim().to_string()),
            role: UserRole::User,
            kind: params.kind,
            status,
        };

        let user = self.users.create(&create).await?;
        info!(
            user_id = %user.id,
            username = %user.username,
            kind = %user.kind,
            status = %user.status,
            "User registered"
        );
        Ok(user)
    }

    /// Fetches the user behind a token subject.
    pub async fn current_user(&self, user_id: Uuid) -> AppResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("Account no longer exists"))
    }
}

fn validate_registration(params: &RegisterParams, password_min_length: usize) -> AppResult<()> {
    let username = params.username.trim();
    if username.len() < 3 {
        return Err(AppError::validation(
            "Username must be at least 3 characters",
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(AppError::validation(
            "Username may only contain letters, digits, '-', '_', and '.'",
        ));
    }

    let email = params.email.trim();
    if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        return Err(AppError::validation("A valid email address is required"));
    }

    if params.password.chars().count() < password_min_length {
        return Err(AppError::validation(format!(
            "Password must be at least {password_min_length} characters"
        )));
    }

    if params.display_name.trim().is_empty() {
        return Err(AppError::validation("Display name is required"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use docvault_core::ErrorKind;

    fn params() -> RegisterParams {
        RegisterParams {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: "long enough password".into(),
            display_name: "Alice".into(),
            kind: UserKind::Member,
        }
    }

    #[test]
    fn test_valid_registration_passes() {
        assert!(validate_registration(&params(), 8).is_ok());
    }

    #[test]
    fn test_short_username_rejected() {
        let mut p = params();
        p.username = "ab".into();
        assert!(validate_registration(&p, 8).unwrap_err().is(ErrorKind::Validation));
    }

    #[test]
    fn test_username_charset_enforced() {
        let mut p = params();
        p.username = "alice smith".into();
        assert!(validate_registration(&p, 8).unwrap_err().is(ErrorKind::Validation));
    }

    #[test]
    fn test_bad_email_rejected() {
        for email in ["no-at-sign", "@leading", "trailing@"] {
            let mut p = params();
            p.email = email.into();
            assert!(validate_registration(&p, 8).unwrap_err().is(ErrorKind::Validation));
        }
    }

    #[test]
    fn test_short_password_rejected() {
        let mut p = params();
        p.password = "short".into();
        assert!(validate_registration(&p, 8).unwrap_err().is(ErrorKind::Validation));
    }

    #[test]
    fn test_blank_display_name_rejected() {
        let mut p = params();
        p.display_name = "  ".into();
        assert!(validate_registration(&p, 8).unwrap_err().is(ErrorKind::Validation));
    }
}
