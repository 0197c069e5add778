//! `AuthUser` extractor: pulls the JWT from the request, validates it,
//! and injects a `RequestContext` into the handler.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use docvault_core::error::AppError;
use docvault_service::context::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Extracted authenticated user context.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Authenticated user that must also be an admin.
#[derive(Debug, Clone)]
pub struct AdminUser(pub RequestContext);

impl std::ops::Deref for AdminUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Pull the token from `Authorization: Bearer ...` or, failing that,
/// from a `token` cookie set by the browser client.
fn extract_token(parts: &Parts) -> Result<String, AppError> {
    if let Some(header) = parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
    {
        return header
            .strip_prefix("Bearer ")
            .map(str::to_string)
            .ok_or_else(|| AppError::unauthorized("Invalid Authorization header format"));
    }

    parts
        .headers
        .get("cookie")
        .and_then(|v| v.to_str().ok())
        .and_then(find_token_cookie)
        .ok_or_else(|| AppError::unauthorized("Authentication required"))
}

fn find_token_cookie(cookie_header: &str) -> Option<String> {
    cookie_header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == "token" && !value.is_empty()).then(|| value.to_string())
    })
}

async fn authenticate(parts: &Parts, state: &AppState) -> Result<RequestContext, AppError> {
    let token = extract_token(parts)?;
    let claims = state.jwt_decoder.decode_token(&token)?;

    // Re-check the account on every request: deactivation takes effect
    // immediately, not at token expiry.
    let user = state.auth_service.current_user(claims.user_id()).await?;
    if !user.status.can_login() {
        return Err(AppError::forbidden("Account is not active"));
    }

    Ok(RequestContext::new(
        user.id,
        user.role,
        user.kind,
        user.username,
    ))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ctx = authenticate(parts, state).await?;
        Ok(AuthUser(ctx))
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ctx = authenticate(parts, state).await?;
        if !ctx.is_admin() {
            return Err(AppError::forbidden("Administrator access required").into());
        }
        Ok(AdminUser(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_token_cookie() {
        assert_eq!(
            find_token_cookie("session=abc; token=xyz; theme=dark"),
            Some("xyz".to_string())
        );
        assert_eq!(find_token_cookie("token="), None);
        assert_eq!(find_token_cookie("other=value"), None);
    }
}
