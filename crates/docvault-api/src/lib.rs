//! # docvault-api
//!
//! The HTTP and WebSocket surface. Handlers stay thin: extract, call a
//! service, wrap the result. All domain errors flow through
//! [`error::ApiError`] into consistent JSON responses.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
