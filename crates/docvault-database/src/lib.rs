//! # docvault-database
//!
//! PostgreSQL connection management, migrations, and repositories.
//! Repositories return entities from `docvault-entity` and map every
//! sqlx failure into `AppError`.

pub mod connection;
pub mod filter;
pub mod repositories;

pub use connection::DatabasePool;
pub use filter::RecordFilter;
