//! Health endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::dto::response::HealthResponse;
use crate::state::AppState;

/// GET /health
///
/// Unauthenticated; returns 503 when a dependency is down so load
/// balancers can take the instance out of rotation.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = state.db.ping().await;
    let storage = state.blobs.health_check().await;

    let healthy = database && storage;
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if healthy { "ok" } else { "degraded" }.to_string(),
            database,
            storage,
        }),
    )
}
