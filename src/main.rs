//! DocVault Server — document archive with realtime updates.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use docvault_api::state::AppState;
use docvault_core::config::AppConfig;
use docvault_core::error::AppError;
use docvault_database::repositories::{RecordRepository, UserRepository};
use docvault_database::DatabasePool;
use docvault_realtime::{ConnectionHub, RealtimeNotifier};
use docvault_service::auth::AuthService;
use docvault_service::record::{ExportService, RecordQueryService, RecordService};
use docvault_service::user::UserService;
use docvault_storage::BlobStore;
use docvault_worker::{OrphanSweeper, WorkerScheduler};

#[tokio::main]
async fn main() {
    let env = std::env::var("DOCVAULT_ENV").unwrap_or_else(|_| "default".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting DocVault v{}", env!("CARGO_PKG_VERSION"));

    // ── Database connection + migrations ─────────────────────────
    let db = DatabasePool::connect(&config.database).await?;
    db.run_migrations().await?;

    // ── Blob storage ─────────────────────────────────────────────
    let blobs = Arc::new(BlobStore::new(&config.storage.uploads_dir).await?);
    tracing::info!(root = %config.storage.uploads_dir, "Blob store ready");

    // ── Repositories ─────────────────────────────────────────────
    let records = Arc::new(RecordRepository::new(db.pool().clone()));
    let users = Arc::new(UserRepository::new(db.pool().clone()));

    // ── Realtime hub + change notifier ───────────────────────────
    let hub = Arc::new(ConnectionHub::new(&config.realtime));
    let notifier = Arc::new(RealtimeNotifier::new(Arc::clone(&hub)));

    // ── Services ─────────────────────────────────────────────────
    let jwt_decoder = Arc::new(docvault_auth::jwt::JwtDecoder::new(&config.auth));
    let auth_service = Arc::new(AuthService::new(Arc::clone(&users), config.auth.clone()));
    let record_service = Arc::new(RecordService::new(
        Arc::clone(&records),
        Arc::clone(&blobs),
        notifier,
        config.storage.clone(),
    ));
    let query_service = Arc::new(RecordQueryService::new(Arc::clone(&records)));
    let export_service = Arc::new(ExportService::new(
        Arc::clone(&records),
        Arc::clone(&blobs),
        config.storage.clone(),
    ));
    let user_service = Arc::new(UserService::new(Arc::clone(&users)));

    // ── Background worker ────────────────────────────────────────
    let mut scheduler = if config.worker.enabled {
        let scheduler = WorkerScheduler::new(config.worker.clone()).await?;
        let sweeper = Arc::new(OrphanSweeper::new(
            Arc::clone(&records),
            Arc::clone(&blobs),
            config.worker.sweep_grace_minutes,
        ));
        scheduler.register_orphan_sweep(sweeper).await?;
        scheduler.start().await?;
        tracing::info!(schedule = %config.worker.sweep_schedule, "Orphan sweep scheduled");
        Some(scheduler)
    } else {
        tracing::info!("Background worker disabled");
        None
    };

    // ── HTTP server ──────────────────────────────────────────────
    let state = AppState {
        config: Arc::new(config.clone()),
        db: db.clone(),
        blobs,
        jwt_decoder,
        auth_service,
        record_service,
        query_service,
        export_service,
        user_service,
        hub,
    };

    let app = docvault_api::router::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("DocVault server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Teardown ─────────────────────────────────────────────────
    if let Some(scheduler) = scheduler.as_mut() {
        if let Err(e) = scheduler.shutdown().await {
            tracing::warn!("Scheduler shutdown failed: {e}");
        }
    }
    db.close().await;

    tracing::info!("DocVault server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to install SIGTERM handler: {e}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
