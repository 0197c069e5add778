//! Repository implementations for database access.

pub mod record;
pub mod user;

pub use record::{FileTypeCount, RecordRepository, RecordStats};
pub use user::UserRepository;
