//! User identity kind enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The two identity kinds served by one credential store.
///
/// Members are provisioned directly by an administrator and start active;
/// institutions self-register and stay pending until approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserKind {
    /// Staff/member account, admin-provisioned.
    Member,
    /// Institutional account, self-registered with approval gate.
    Institution,
}

impl Default for UserKind {
    fn default() -> Self {
        Self::Member
    }
}

impl UserKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Institution => "institution",
        }
    }
}

impl fmt::Display for UserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
