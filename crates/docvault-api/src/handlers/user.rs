//! Admin user-management handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use docvault_core::error::AppError;
use docvault_core::types::pagination::{PageRequest, PageResponse};
use docvault_entity::user::UserStatus;

use crate::dto::response::{ApiResponse, UserResponse};
use crate::error::ApiError;
use crate::extractors::AdminUser;
use crate::state::AppState;

/// Query parameters for the user listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
    /// Page number.
    pub page: Option<u64>,
    /// Page size.
    pub page_size: Option<u64>,
    /// Filter by status: `active`, `inactive`, or `pending`.
    pub status: Option<String>,
}

/// GET /api/users
pub async fn list(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<UserListQuery>,
) -> Result<Json<ApiResponse<PageResponse<UserResponse>>>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(|s| {
            s.parse::<UserStatus>()
                .map_err(|_| AppError::validation(format!("Invalid status filter: '{s}'")))
        })
        .transpose()?;

    let page = PageRequest::new(
        query.page.unwrap_or(1),
        query.page_size.unwrap_or(PageRequest::default().page_size),
    );

    let users = state.user_service.list(status, &page).await?;
    Ok(Json(ApiResponse::ok(users.map(UserResponse::from))))
}

/// PUT /api/users/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state.user_service.approve(&admin, id).await?;
    Ok(Json(ApiResponse::ok(user.into())))
}

/// PUT /api/users/{id}/activate
pub async fn activate(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state.user_service.activate(&admin, id).await?;
    Ok(Json(ApiResponse::ok(user.into())))
}

/// PUT /api/users/{id}/deactivate
pub async fn deactivate(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state.user_service.deactivate(&admin, id).await?;
    Ok(Json(ApiResponse::ok(user.into())))
}
