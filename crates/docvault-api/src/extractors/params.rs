//! Listing query-parameter extractor.
//!
//! One extractor backs the list and export endpoints, so both see the
//! exact same filter for the same query string. Sort and pagination
//! parameters are lenient (bad values fall back to defaults); filter
//! values are strict because silently dropping a filter would return
//! the wrong rows.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use chrono::NaiveDate;
use serde::Deserialize;

use docvault_core::error::AppError;
use docvault_core::types::pagination::PageRequest;
use docvault_core::types::sorting::{SortDirection, SortKey, SortSpec};
use docvault_database::RecordFilter;

use crate::error::ApiError;
use crate::state::AppState;

/// Raw query string fields for record listings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawListParams {
    page: Option<String>,
    limit: Option<String>,
    search: Option<String>,
    file_type: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    sort_by: Option<String>,
    sort_order: Option<String>,
}

/// Parsed listing parameters: filter, sort, and pagination.
#[derive(Debug, Clone)]
pub struct ListParams {
    /// Record filter.
    pub filter: RecordFilter,
    /// Sort specification.
    pub sort: SortSpec,
    /// Page request.
    pub page: PageRequest,
}

impl ListParams {
    fn from_raw(raw: RawListParams) -> Result<Self, AppError> {
        let search = raw
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let file_type = raw
            .file_type
            .as_deref()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .transpose()?;

        let start_date = parse_date(raw.start_date.as_deref(), "startDate")?;
        let end_date = parse_date(raw.end_date.as_deref(), "endDate")?;
        if let (Some(start), Some(end)) = (start_date, end_date) {
            if start > end {
                return Err(AppError::validation("startDate must not be after endDate"));
            }
        }

        Ok(Self {
            filter: RecordFilter {
                search,
                file_type,
                start_date,
                end_date,
            },
            sort: SortSpec::new(
                SortKey::parse_lenient(raw.sort_by.as_deref()),
                SortDirection::parse_lenient(raw.sort_order.as_deref()),
            ),
            page: PageRequest::new(
                parse_lenient_number(raw.page.as_deref(), 1),
                parse_lenient_number(raw.limit.as_deref(), PageRequest::default().page_size),
            ),
        })
    }
}

/// Pagination values coerce rather than reject: a non-numeric or zero
/// `page`/`limit` falls back to the default, like the sort parameters.
fn parse_lenient_number(value: Option<&str>, default: u64) -> u64 {
    value
        .map(str::trim)
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|&n| n >= 1)
        .unwrap_or(default)
}

fn parse_date(value: Option<&str>, field: &str) -> Result<Option<NaiveDate>, AppError> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| {
            AppError::validation(format!("Invalid {field}: '{value}', expected YYYY-MM-DD"))
        })
}

impl FromRequestParts<AppState> for ListParams {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Query(raw): Query<RawListParams> = Query::try_from_uri(&parts.uri)
            .map_err(|e| AppError::validation(format!("Invalid query parameters: {e}")))?;
        Ok(Self::from_raw(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docvault_core::ErrorKind;
    use docvault_entity::record::FileType;

    #[test]
    fn test_defaults() {
        let params = ListParams::from_raw(RawListParams::default()).unwrap();
        assert!(params.filter.is_empty());
        assert_eq!(params.sort.key, SortKey::UploadedAt);
        assert_eq!(params.sort.direction, SortDirection::Desc);
        assert_eq!(params.page.page, 1);
        assert_eq!(params.page.page_size, 10);
    }

    #[test]
    fn test_full_parse() {
        let raw = RawListParams {
            page: Some("3".into()),
            limit: Some("25".into()),
            search: Some("  invoice  ".into()),
            file_type: Some("pdf".into()),
            start_date: Some("2024-01-01".into()),
            end_date: Some("2024-06-30".into()),
            sort_by: Some("fileDate".into()),
            sort_order: Some("asc".into()),
        };
        let params = ListParams::from_raw(raw).unwrap();
        assert_eq!(params.filter.search.as_deref(), Some("invoice"));
        assert_eq!(params.filter.file_type, Some(FileType::Pdf));
        assert_eq!(params.filter.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(params.sort.key, SortKey::FileDate);
        assert_eq!(params.sort.direction, SortDirection::Asc);
        assert_eq!(params.page.page, 3);
        assert_eq!(params.page.page_size, 25);
    }

    #[test]
    fn test_nonnumeric_pagination_defaults() {
        let raw = RawListParams {
            page: Some("abc".into()),
            limit: Some("xyz".into()),
            ..Default::default()
        };
        let params = ListParams::from_raw(raw).unwrap();
        assert_eq!(params.page.page, 1);
        assert_eq!(params.page.page_size, 10);
    }

    #[test]
    fn test_nonnumeric_pagination_survives_query_extraction() {
        let uri: axum::http::Uri = "/api/files?page=abc&limit=xyz".parse().unwrap();
        let Query(raw): Query<RawListParams> = Query::try_from_uri(&uri).unwrap();
        let params = ListParams::from_raw(raw).unwrap();
        assert_eq!(params.page.page, 1);
        assert_eq!(params.page.page_size, 10);
    }

    #[test]
    fn test_zero_and_negative_pagination_default() {
        let raw = RawListParams {
            page: Some("0".into()),
            limit: Some("-5".into()),
            ..Default::default()
        };
        let params = ListParams::from_raw(raw).unwrap();
        assert_eq!(params.page.page, 1);
        assert_eq!(params.page.page_size, 10);
    }

    #[test]
    fn test_bad_date_rejected() {
        let raw = RawListParams {
            start_date: Some("01/15/2024".into()),
            ..Default::default()
        };
        let err = ListParams::from_raw(raw).unwrap_err();
        assert!(err.is(ErrorKind::Validation));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let raw = RawListParams {
            start_date: Some("2024-06-30".into()),
            end_date: Some("2024-01-01".into()),
            ..Default::default()
        };
        assert!(ListParams::from_raw(raw).is_err());
    }

    #[test]
    fn test_unknown_file_type_rejected() {
        let raw = RawListParams {
            file_type: Some("video".into()),
            ..Default::default()
        };
        assert!(ListParams::from_raw(raw).is_err());
    }

    #[test]
    fn test_blank_search_becomes_none() {
        let raw = RawListParams {
            search: Some("   ".into()),
            ..Default::default()
        };
        let params = ListParams::from_raw(raw).unwrap();
        assert!(params.filter.search.is_none());
    }
}
