//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. The merged configuration is constructed once at process start
//! and passed explicitly into each component.

pub mod auth;
pub mod logging;
pub mod realtime;
pub mod server;
pub mod storage;
pub mod worker;

use serde::{Deserialize, Serialize};

pub use self::auth::AuthConfig;
pub use self::logging::LoggingConfig;
pub use self::realtime::RealtimeConfig;
pub use self::server::ServerConfig;
pub use self::storage::StorageConfig;
pub use self::worker::WorkerConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Blob storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Background worker settings.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Real-time WebSocket settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database connection pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Idle connection timeout in seconds.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `DOCVAULT__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("DOCVAULT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    2
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    300
}
