//! Dynamic filter predicate for record queries.
//!
//! Listing, counting, exporting, and stats must all agree on which rows
//! match, so there is exactly one place that turns filter parameters into
//! SQL: [`RecordFilter::apply`]. Both the count query and the page fetch
//! push their `WHERE` clause through it, which makes totals and pages
//! impossible to desynchronize.

use chrono::{NaiveDate, NaiveTime};
use sqlx::{Postgres, QueryBuilder};

use docvault_entity::record::FileType;

/// Optional filters applied to a record listing or export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    /// Case-insensitive substring match against `description`.
    pub search: Option<String>,
    /// Exact file-type match.
    pub file_type: Option<FileType>,
    /// Inclusive lower bound on `uploaded_at`, at start of this day.
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on `uploaded_at`, at end of this day.
    pub end_date: Option<NaiveDate>,
}

impl RecordFilter {
    /// Whether no filter is set at all.
    pub fn is_empty(&self) -> bool {
        self.search.is_none()
            && self.file_type.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }

    /// Push this filter's `WHERE` clause onto a query builder.
    ///
    /// The end-date bound is expressed as `uploaded_at < <next midnight>`
    /// so a record uploaded at 23:59:59.999 of the end date is included
    /// and one uploaded at 00:00:00.000 of the following day is not.
    pub fn apply(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        let mut prefix = " WHERE ";

        if let Some(search) = &self.search {
            qb.push(prefix);
            qb.push("description ILIKE ");
            qb.push_bind(format!("%{}%", escape_like(search)));
            qb.push(" ESCAPE '\\'");
            prefix = " AND ";
        }

        if let Some(file_type) = self.file_type {
            qb.push(prefix);
            qb.push("file_type = ");
            qb.push_bind(file_type);
            prefix = " AND ";
        }

        if let Some(start) = self.start_date {
            qb.push(prefix);
            qb.push("uploaded_at >= ");
            qb.push_bind(start.and_time(NaiveTime::MIN).and_utc());
            prefix = " AND ";
        }

        if let Some(end) = self.end_date {
            if let Some(next_day) = end.succ_opt() {
                qb.push(prefix);
                qb.push("uploaded_at < ");
                qb.push_bind(next_day.and_time(NaiveTime::MIN).and_utc());
            }
        }
    }
}

/// Escape `LIKE` wildcards so a search term matches literally.
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sql_for(filter: &RecordFilter, head: &str) -> String {
        let mut qb = QueryBuilder::<Postgres>::new(head);
        filter.apply(&mut qb);
        qb.sql().to_string()
    }

    #[test]
    fn test_empty_filter_adds_no_predicate() {
        let sql = sql_for(&RecordFilter::default(), "SELECT * FROM file_records");
        assert_eq!(sql, "SELECT * FROM file_records");
    }

    #[test]
    fn test_all_filters_combine_with_and() {
        let filter = RecordFilter {
            search: Some("invoice".into()),
            file_type: Some(FileType::Pdf),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 31),
        };
        let sql = sql_for(&filter, "SELECT * FROM file_records");
        assert!(sql.contains("description ILIKE $1"));
        assert!(sql.contains(" AND file_type = $2"));
        assert!(sql.contains(" AND uploaded_at >= $3"));
        assert!(sql.contains(" AND uploaded_at < $4"));
        assert_eq!(sql.matches(" WHERE ").count(), 1);
    }

    #[test]
    fn test_count_and_fetch_share_identical_predicate() {
        let filter = RecordFilter {
            search: Some("report".into()),
            file_type: Some(FileType::Image),
            start_date: NaiveDate::from_ymd_opt(2024, 6, 1),
            end_date: None,
        };
        let count_sql = sql_for(&filter, "SELECT COUNT(*) FROM file_records");
        let fetch_sql = sql_for(&filter, "SELECT * FROM file_records");

        let count_predicate = count_sql.split(" WHERE ").nth(1).unwrap();
        let fetch_predicate = fetch_sql.split(" WHERE ").nth(1).unwrap();
        assert_eq!(count_predicate, fetch_predicate);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%_done"), "100\\%\\_done");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like("plain"), "plain");
    }
}
