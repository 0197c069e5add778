//! File record entity and classification.

pub mod file_type;
pub mod model;

pub use file_type::{classify, FileType};
pub use model::{CreateRecord, FileRecord};
