//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use docvault_entity::user::UserKind;

/// Login request body.
///
/// The browser client historically sends the username under `userId`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username.
    #[serde(rename = "userId")]
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Registration request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Username.
    #[validate(length(min = 3, max = 64))]
    pub username: String,
    /// Contact email.
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Display name.
    #[validate(length(min = 1, max = 128, message = "Display name is required"))]
    pub display_name: String,
    /// Identity kind; defaults to an individual member account.
    #[serde(default)]
    pub kind: UserKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_uses_user_id_field() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"userId":"alice","password":"pw"}"#).unwrap();
        assert_eq!(req.username, "alice");
    }

    #[test]
    fn test_register_kind_defaults_to_member() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"username":"lib1","email":"a@b.c","password":"longpassword","displayName":"Lib"}"#,
        )
        .unwrap();
        assert_eq!(req.kind, UserKind::Member);
    }

    #[test]
    fn test_register_accepts_institution() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"username":"lib1","email":"a@b.c","password":"longpassword",
                "displayName":"Lib","kind":"institution"}"#,
        )
        .unwrap();
        assert_eq!(req.kind, UserKind::Institution);
    }
}
