//! User repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_core::types::pagination::{PageRequest, PageResponse};
use docvault_entity::user::{CreateUser, User, UserStatus};

/// Repository for user CRUD and query operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    /// Find a user by username (case-insensitive).
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(username) = LOWER($1)")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by username", e)
            })
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by email", e)
            })
    }

    /// Create a new user.
    ///
    /// Unique-constraint violations on username or email surface as
    /// conflict errors rather than opaque database failures.
    pub async fn create(&self, data: &CreateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username, email, password_hash, display_name, role, kind, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING *",
        )
        .bind(&data.username)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(&data.display_name)
        .bind(data.role)
        .bind(data.kind)
        .bind(data.status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("users_username_key") =>
            {
                AppError::conflict(format!("Username '{}' already exists", data.username))
            }
            sqlx::Error::Database(ref db_err) if db_err.constraint() == Some("users_email_key") => {
                AppError::conflict("Email already in use".to_string())
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create user", e),
        })
    }

    /// List all users with pagination, newest first.
    pub async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<User>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count users", e))?;

        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list users", e))?;

        Ok(PageResponse::new(
            users,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// List users filtered by status, newest first.
    pub async fn find_by_status(
        &self,
        status: UserStatus,
        page: &PageRequest,
    ) -> AppResult<PageResponse<User>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count users by status", e)
            })?;

        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE status = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(status)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list users by status", e)
        })?;

        Ok(PageResponse::new(
            users,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Change a user's status, returning the updated row.
    pub async fn set_status(&self, id: Uuid, status: UserStatus) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update user status", e))?
        .ok_or_else(|| AppError::not_found(format!("User {id} not found")))
    }

    /// Record a successful login time.
    pub async fn touch_last_login(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to record login time", e)
            })?;
        Ok(())
    }
}
