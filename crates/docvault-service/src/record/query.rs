//! Record listing and statistics.

use std::sync::Arc;

use docvault_core::result::AppResult;
use docvault_core::types::pagination::{PageRequest, PageResponse};
use docvault_core::types::sorting::SortSpec;
use docvault_database::repositories::{RecordRepository, RecordStats};
use docvault_database::RecordFilter;
use docvault_entity::record::FileRecord;

/// Read-side service for record listings.
#[derive(Debug, Clone)]
pub struct RecordQueryService {
    records: Arc<RecordRepository>,
}

impl RecordQueryService {
    /// Creates a new query service.
    pub fn new(records: Arc<RecordRepository>) -> Self {
        Self { records }
    }

    /// Lists records matching a filter, sorted and paginated.
    pub async fn list(
        &self,
        filter: &RecordFilter,
        sort: SortSpec,
        page: &PageRequest,
    ) -> AppResult<PageResponse<FileRecord>> {
        self.records.list(filter, sort, page).await
    }

    /// Aggregate statistics over all records.
    pub async fn stats(&self) -> AppResult<RecordStats> {
        self.records.stats().await
    }
}
