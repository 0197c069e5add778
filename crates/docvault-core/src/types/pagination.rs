//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};

/// Default page size.
const DEFAULT_PAGE_SIZE: u64 = 10;
/// Maximum page size.
const MAX_PAGE_SIZE: u64 = 100;

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-based).
    pub page: u64,
    /// Number of items per page.
    pub page_size: u64,
}

impl PageRequest {
    /// Create a new page request, coercing out-of-range values.
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Calculate the SQL `OFFSET` value.
    pub fn offset(&self) -> u64 {
        (self.page.saturating_sub(1)) * self.page_size
    }

    /// Return the SQL `LIMIT` value.
    pub fn limit(&self) -> u64 {
        self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Paginated response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T: Serialize> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Current page number (1-based).
    pub page: u64,
    /// Number of items per page.
    pub page_size: u64,
    /// Total number of items across all pages.
    pub total_items: u64,
    /// Total number of pages (0 when there are no items).
    pub total_pages: u64,
    /// Whether there is a next page.
    pub has_next: bool,
    /// Whether there is a previous page.
    pub has_previous: bool,
}

impl<T: Serialize> PageResponse<T> {
    /// Create a new paginated response.
    pub fn new(items: Vec<T>, page: u64, page_size: u64, total_items: u64) -> Self {
        let total_pages = total_items.div_ceil(page_size);
        Self {
            items,
            page,
            page_size,
            total_items,
            total_pages,
            has_next: page < total_pages,
            has_previous: page > 1 && total_pages > 0,
        }
    }

    /// Map the item type while preserving pagination metadata.
    pub fn map<U: Serialize>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_and_limit() {
        let page = PageRequest::new(3, 10);
        assert_eq!(page.offset(), 20);
        assert_eq!(page.limit(), 10);
    }

    #[test]
    fn test_coercion() {
        let page = PageRequest::new(0, 0);
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 1);

        let page = PageRequest::new(1, 10_000);
        assert_eq!(page.page_size, 100);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let resp: PageResponse<u32> = PageResponse::new(vec![1, 2, 3], 1, 10, 23);
        assert_eq!(resp.total_pages, 3);
        assert!(resp.has_next);
        assert!(!resp.has_previous);
    }

    #[test]
    fn test_empty_result_has_zero_pages() {
        let resp: PageResponse<u32> = PageResponse::new(Vec::new(), 1, 10, 0);
        assert_eq!(resp.total_pages, 0);
        assert!(!resp.has_next);
        assert!(!resp.has_previous);
    }

    #[test]
    fn test_last_page_flags() {
        let resp: PageResponse<u32> = PageResponse::new(vec![1], 3, 10, 21);
        assert!(!resp.has_next);
        assert!(resp.has_previous);
    }
}
