//! Admin-side user management: listing, approval, deactivation.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::types::pagination::{PageRequest, PageResponse};
use docvault_database::repositories::UserRepository;
use docvault_entity::user::{User, UserStatus};

use crate::context::RequestContext;

/// Admin operations on user accounts.
#[derive(Debug, Clone)]
pub struct UserService {
    users: Arc<UserRepository>,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(users: Arc<UserRepository>) -> Self {
        Self { users }
    }

    /// Lists users, optionally filtered by status.
    pub async fn list(
        &self,
        status: Option<UserStatus>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<User>> {
        match status {
            Some(status) => self.users.find_by_status(status, page).await,
            None => self.users.find_all(page).await,
        }
    }

    /// Approves a pending account.
    pub async fn approve(&self, ctx: &RequestContext, id: Uuid) -> AppResult<User> {
        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;

        if user.status != UserStatus::Pending {
            return Err(AppError::conflict(format!(
                "User '{}' is not pending approval",
                user.username
            )));
        }

        let user = self.users.set_status(id, UserStatus::Active).await?;
        info!(admin = %ctx.user_id, user_id = %id, "User approved");
        Ok(user)
    }

    /// Deactivates an account. Admins cannot deactivate themselves.
    pub async fn deactivate(&self, ctx: &RequestContext, id: Uuid) -> AppResult<User> {
        if ctx.user_id == id {
            return Err(AppError::validation("Cannot deactivate your own account"));
        }

        let user = self.users.set_status(id, UserStatus::Inactive).await?;
        info!(admin = %ctx.user_id, user_id = %id, "User deactivated");
        Ok(user)
    }

    /// Reactivates a deactivated account.
    pub async fn activate(&self, ctx: &RequestContext, id: Uuid) -> AppResult<User> {
        let user = self.users.set_status(id, UserStatus::Active).await?;
        info!(admin = %ctx.user_id, user_id = %id, "User activated");
        Ok(user)
    }
}
