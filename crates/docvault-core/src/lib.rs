//! # docvault-core
//!
//! Configuration, shared types, and the unified error model for DocVault.
//! Every other crate in the workspace maps its failures into [`AppError`]
//! and propagates them with the `?` operator.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
