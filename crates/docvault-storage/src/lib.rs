//! # docvault-storage
//!
//! Local filesystem blob storage. Records in the database reference
//! blobs by relative path; this crate owns the directory those paths
//! resolve into and the naming scheme that keeps stored files unique.

pub mod blob;
pub mod naming;

pub use blob::{BlobMeta, BlobStore, ByteStream};
pub use naming::generate_stored_name;
