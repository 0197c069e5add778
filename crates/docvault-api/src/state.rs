//! Application state shared across all handlers.

use std::sync::Arc;

use docvault_auth::jwt::JwtDecoder;
use docvault_core::config::AppConfig;
use docvault_database::DatabasePool;
use docvault_realtime::ConnectionHub;
use docvault_service::auth::AuthService;
use docvault_service::record::{ExportService, RecordQueryService, RecordService};
use docvault_service::user::UserService;
use docvault_storage::BlobStore;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. All fields are
/// `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Database pool, used directly only by the health endpoint.
    pub db: DatabasePool,
    /// Blob store, used directly only by the health endpoint.
    pub blobs: Arc<BlobStore>,
    /// JWT validator.
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Login/registration service.
    pub auth_service: Arc<AuthService>,
    /// Record write lifecycle service.
    pub record_service: Arc<RecordService>,
    /// Record listing/statistics service.
    pub query_service: Arc<RecordQueryService>,
    /// Export archive service.
    pub export_service: Arc<ExportService>,
    /// User administration service.
    pub user_service: Arc<UserService>,
    /// WebSocket connection hub.
    pub hub: Arc<ConnectionHub>,
}
