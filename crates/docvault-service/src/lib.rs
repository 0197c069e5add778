//! # docvault-service
//!
//! Business logic for DocVault: authentication, record lifecycle,
//! listing/statistics, export, and user administration. Services own
//! the ordering rules between blob storage and the database; handlers
//! above and repositories below stay thin.

pub mod auth;
pub mod context;
pub mod record;
pub mod user;

pub use context::RequestContext;
