//! Custom Axum extractors.

pub mod auth;
pub mod params;

pub use auth::{AdminUser, AuthUser};
pub use params::ListParams;
