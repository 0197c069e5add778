//! File record repository implementation.

use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_core::types::pagination::{PageRequest, PageResponse};
use docvault_core::types::sorting::SortSpec;
use docvault_entity::record::{CreateRecord, FileRecord, FileType};

use crate::filter::RecordFilter;

/// Per-type record count used in statistics.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FileTypeCount {
    /// The file type.
    #[serde(rename = "type")]
    pub file_type: FileType,
    /// Number of records of this type.
    pub count: i64,
    /// Sum of record sizes of this type in bytes.
    pub total_size: i64,
}

/// Aggregate statistics over all file records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordStats {
    /// Total number of records.
    pub total_records: i64,
    /// Sum of record sizes in bytes.
    pub total_size_bytes: i64,
    /// Record counts per type, most common first.
    pub by_type: Vec<FileTypeCount>,
}

/// Repository for file record CRUD and query operations.
#[derive(Debug, Clone)]
pub struct RecordRepository {
    pool: PgPool,
}

impl RecordRepository {
    /// Create a new record repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new file record.
    pub async fn create(&self, record: &CreateRecord) -> AppResult<FileRecord> {
        sqlx::query_as::<_, FileRecord>(
            r#"
            INSERT INTO file_records
                (description, stored_name, original_name, storage_path, file_type,
                 file_size_bytes, mime_type, file_date, reference_number, uploaded_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&record.description)
        .bind(&record.stored_name)
        .bind(&record.original_name)
        .bind(&record.storage_path)
        .bind(record.file_type)
        .bind(record.file_size_bytes)
        .bind(&record.mime_type)
        .bind(record.file_date)
        .bind(&record.reference_number)
        .bind(record.uploaded_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert record", e))
    }

    /// Find a record by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<FileRecord>> {
        sqlx::query_as::<_, FileRecord>("SELECT * FROM file_records WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find record", e))
    }

    /// Update a record's mutable columns, returning the updated row.
    pub async fn update(&self, record: &FileRecord) -> AppResult<Option<FileRecord>> {
        sqlx::query_as::<_, FileRecord>(
            r#"
            UPDATE file_records SET
                description = $2,
                stored_name = $3,
                original_name = $4,
                storage_path = $5,
                file_type = $6,
                file_size_bytes = $7,
                mime_type = $8,
                file_date = $9,
                reference_number = $10
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(record.id)
        .bind(&record.description)
        .bind(&record.stored_name)
        .bind(&record.original_name)
        .bind(&record.storage_path)
        .bind(record.file_type)
        .bind(record.file_size_bytes)
        .bind(&record.mime_type)
        .bind(record.file_date)
        .bind(&record.reference_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update record", e))
    }

    /// Delete a record by ID. Returns whether a row was removed.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM file_records WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete record", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// List records matching a filter, sorted and paginated.
    ///
    /// The count and the page fetch run through the same
    /// [`RecordFilter::apply`] call so the reported total always matches
    /// the rows being paged.
    pub async fn list(
        &self,
        filter: &RecordFilter,
        sort: SortSpec,
        page: &PageRequest,
    ) -> AppResult<PageResponse<FileRecord>> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM file_records");
        filter.apply(&mut count_qb);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count records", e))?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM file_records");
        filter.apply(&mut qb);
        push_order_by(&mut qb, sort);
        qb.push(" LIMIT ");
        qb.push_bind(page.limit() as i64);
        qb.push(" OFFSET ");
        qb.push_bind(page.offset() as i64);

        let records = qb
            .build_query_as::<FileRecord>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list records", e))?;

        Ok(PageResponse::new(
            records,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Fetch every record matching a filter, without pagination.
    ///
    /// Used by export; `limit` caps the result to keep archive builds
    /// bounded.
    pub async fn list_all(
        &self,
        filter: &RecordFilter,
        sort: SortSpec,
        limit: u64,
    ) -> AppResult<Vec<FileRecord>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM file_records");
        filter.apply(&mut qb);
        push_order_by(&mut qb, sort);
        qb.push(" LIMIT ");
        qb.push_bind(limit as i64);

        qb.build_query_as::<FileRecord>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to fetch records", e))
    }

    /// Count records matching a filter.
    pub async fn count(&self, filter: &RecordFilter) -> AppResult<i64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM file_records");
        filter.apply(&mut qb);
        qb.build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count records", e))
    }

    /// Aggregate statistics over all records.
    pub async fn stats(&self) -> AppResult<RecordStats> {
        let (total_records, total_size_bytes): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(file_size_bytes), 0)::BIGINT FROM file_records",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to compute totals", e))?;

        let by_type = sqlx::query_as::<_, FileTypeCount>(
            r#"
            SELECT file_type,
                   COUNT(*) AS count,
                   COALESCE(SUM(file_size_bytes), 0)::BIGINT AS total_size
            FROM file_records
            GROUP BY file_type
            ORDER BY count DESC, file_type ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to group by type", e))?;

        Ok(RecordStats {
            total_records,
            total_size_bytes,
            by_type,
        })
    }

    /// All storage paths currently referenced by records.
    ///
    /// Used by the orphan sweep to tell live blobs from leftovers.
    pub async fn all_storage_paths(&self) -> AppResult<Vec<String>> {
        sqlx::query_scalar::<_, String>("SELECT storage_path FROM file_records")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to fetch paths", e))
    }
}

/// Append `ORDER BY` for a validated sort spec.
///
/// `SortKey::column` only yields known column names, so pushing it as raw
/// SQL is safe. The ID tiebreaker keeps paging deterministic when the sort
/// column has duplicate values.
fn push_order_by(qb: &mut QueryBuilder<'_, Postgres>, sort: SortSpec) {
    qb.push(" ORDER BY ");
    qb.push(sort.key.column());
    qb.push(" ");
    qb.push(sort.direction.as_sql());
    qb.push(", id DESC");
}

#[cfg(test)]
mod tests {
    use super::*;
    use docvault_core::types::sorting::{SortDirection, SortKey};

    #[test]
    fn test_order_by_uses_validated_column_names() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM file_records");
        push_order_by(
            &mut qb,
            SortSpec {
                key: SortKey::FileDate,
                direction: SortDirection::Asc,
            },
        );
        assert_eq!(
            qb.sql(),
            "SELECT * FROM file_records ORDER BY file_date ASC, id DESC"
        );
    }
}
