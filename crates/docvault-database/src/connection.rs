//! PostgreSQL pool lifecycle: connect, migrate, ping, close.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, warn};

use docvault_core::config::DatabaseConfig;
use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;

/// Shared PostgreSQL connection pool.
///
/// Cloning is cheap; all clones share the same underlying pool. The
/// repositories borrow it through [`DatabasePool::pool`]; the binary
/// owns the lifecycle (connect, migrate, close on shutdown).
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Open a pool against the configured database.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        info!(
            url = %redacted_url(&config.url),
            max_connections = config.max_connections,
            "Opening database pool"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect(&config.url)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Could not open database pool", e)
            })?;

        Ok(Self { pool })
    }

    /// Apply any pending migrations from the bundled `migrations/` set.
    pub async fn run_migrations(&self) -> AppResult<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Migration failed", e))?;
        info!("Database schema is up to date");
        Ok(())
    }

    /// The underlying sqlx pool, for repositories.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Whether the database currently answers queries.
    pub async fn ping(&self) -> bool {
        match sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
        {
            Ok(1) => true,
            Ok(_) => false,
            Err(e) => {
                warn!(error = %e, "Database ping failed");
                false
            }
        }
    }

    /// Drain and close every connection.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}

/// Replace any credential fragment of a connection URL with `****`
/// so the URL can be logged.
fn redacted_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let Some((credentials, host)) = rest.rsplit_once('@') else {
        return url.to_string();
    };
    match credentials.split_once(':') {
        Some((user, _password)) => format!("{scheme}://{user}:****@{host}"),
        None => format!("{scheme}://{credentials}@{host}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_is_redacted() {
        assert_eq!(
            redacted_url("postgres://docvault:s3cret@db:5432/docvault"),
            "postgres://docvault:****@db:5432/docvault"
        );
    }

    #[test]
    fn test_url_without_credentials_is_untouched() {
        assert_eq!(
            redacted_url("postgres://localhost:5432/docvault"),
            "postgres://localhost:5432/docvault"
        );
    }

    #[test]
    fn test_user_only_url_keeps_user() {
        assert_eq!(
            redacted_url("postgres://docvault@db/docvault"),
            "postgres://docvault@db/docvault"
        );
    }
}
