//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The flat two-level role model: admins manage accounts, everyone else
/// works with records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Full administrator: account approval and deactivation.
    Admin,
    /// Regular user: record upload, edit, delete, export.
    User,
}

impl UserRole {
    /// Check if this role is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = docvault_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            _ => Err(docvault_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: admin, user"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!("USER".parse::<UserRole>().unwrap(), UserRole::User);
        assert!("manager".parse::<UserRole>().is_err());
    }
}
