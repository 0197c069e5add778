//! User entity and account enums.

pub mod kind;
pub mod model;
pub mod role;
pub mod status;

pub use kind::UserKind;
pub use model::{CreateUser, User};
pub use role::UserRole;
pub use status::UserStatus;
