//! Auth handlers: login, register, me.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use validator::Validate;

use docvault_core::error::AppError;
use docvault_service::auth::RegisterParams;

use crate::dto::request::{LoginRequest, RegisterRequest};
use crate::dto::response::{ApiResponse, LoginResponse, UserResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let (user, issued) = state.auth_service.login(&req.username, &req.password).await?;

    Ok(Json(ApiResponse::ok(LoginResponse {
        token: issued.token,
        expires_at: issued.expires_at,
        user: user.into(),
    })))
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let user = state
        .auth_service
        .register(RegisterParams {
            username: req.username,
            email: req.email,
            password: req.password,
            display_name: req.display_name,
            kind: req.kind,
        })
        .await?;

    let message = match user.status {
        docvault_entity::user::UserStatus::Pending => {
            "Registration received, awaiting admin approval"
        }
        _ => "Registration complete",
    };
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(message, user.into())),
    ))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state.auth_service.current_user(auth.user_id).await?;
    Ok(Json(ApiResponse::ok(user.into())))
}
