//! Shared value types used by the query layer and the API.

pub mod pagination;
pub mod sorting;

pub use pagination::{PageRequest, PageResponse};
pub use sorting::{SortDirection, SortKey, SortSpec};
