//! Record lifecycle, querying, and export services.

pub mod export;
pub mod query;
pub mod service;

pub use export::ExportService;
pub use query::RecordQueryService;
pub use service::{RecordService, ReplacementFile, UpdateParams, UploadParams};
