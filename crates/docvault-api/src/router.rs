//! Route definitions for the DocVault HTTP API.
//!
//! All JSON routes are mounted under `/api`; the WebSocket upgrade and
//! the health endpoint live at the root.

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::handlers;
use crate::state::AppState;

/// Multipart framing overhead allowed on top of the file size limit.
const BODY_LIMIT_SLACK: usize = 64 * 1024;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_body = state.config.storage.max_upload_size_bytes as usize + BODY_LIMIT_SLACK;

    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(record_routes())
        .merge(user_routes());

    let cors = build_cors_layer(&state);

    Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(handlers::ws::upgrade))
        .route("/health", get(handlers::health::health))
        .layer(DefaultBodyLimit::max(max_body))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Auth endpoints: login, register, me.
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/me", get(handlers::auth::me))
}

/// Record CRUD, stats, export, download.
fn record_routes() -> Router<AppState> {
    Router::new()
        .route("/files", get(handlers::record::list))
        .route("/files", post(handlers::record::upload))
        .route("/files/stats", get(handlers::record::stats))
        .route("/files/export", get(handlers::record::export))
        .route("/files/{id}", get(handlers::record::get))
        .route("/files/{id}", put(handlers::record::update))
        .route("/files/{id}", delete(handlers::record::delete))
        .route("/files/{id}/download", get(handlers::record::download))
}

/// Admin user management.
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(handlers::user::list))
        .route("/users/{id}/approve", put(handlers::user::approve))
        .route("/users/{id}/activate", put(handlers::user::activate))
        .route("/users/{id}/deactivate", put(handlers::user::deactivate))
}

/// CORS from configuration. `*` means any origin; anything else is an
/// explicit allow-list.
fn build_cors_layer(state: &AppState) -> CorsLayer {
    let origins = &state.config.server.cors.allowed_origins;

    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(parsed)
}
