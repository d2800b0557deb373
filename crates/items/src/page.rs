//! Offset-based pagination vocabulary.

use serde::{Deserialize, Serialize};

use catalog_core::{CatalogError, CatalogResult};

/// Page size used when the caller does not supply one.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Validated paging parameters.
///
/// `page_size` is at least 1; `page_index` is zero-based. There is no upper
/// bound on either: an index past the end simply yields an empty page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page_size: u64,
    page_index: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page_index: 0,
        }
    }
}

impl PageRequest {
    pub fn new(page_size: u64, page_index: u64) -> CatalogResult<Self> {
        if page_size == 0 {
            return Err(CatalogError::invalid_argument("pageSize must be at least 1"));
        }
        Ok(Self {
            page_size,
            page_index,
        })
    }

    /// Build from optional, signed query values, applying defaults (10, 0).
    pub fn from_query(page_size: Option<i64>, page_index: Option<i64>) -> CatalogResult<Self> {
        let size = page_size.unwrap_or(DEFAULT_PAGE_SIZE as i64);
        let index = page_index.unwrap_or(0);
        if size < 1 {
            return Err(CatalogError::invalid_argument(format!(
                "pageSize must be at least 1, got {size}"
            )));
        }
        if index < 0 {
            return Err(CatalogError::invalid_argument(format!(
                "pageIndex must not be negative, got {index}"
            )));
        }
        Self::new(size as u64, index as u64)
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn page_index(&self) -> u64 {
        self.page_index
    }

    /// `page_size * page_index`, saturating instead of wrapping.
    pub fn offset(&self) -> u64 {
        self.page_size.saturating_mul(self.page_index)
    }

    pub fn limit(&self) -> u64 {
        self.page_size
    }
}

/// Paginated response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedItems<T> {
    pub page_index: u64,
    pub page_size: u64,
    /// Total number of matches across all pages.
    pub count: u64,
    pub data: Vec<T>,
}

impl<T> PaginatedItems<T> {
    pub fn new(page: PageRequest, count: u64, data: Vec<T>) -> Self {
        Self {
            page_index: page.page_index(),
            page_size: page.page_size(),
            count,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn defaults_are_ten_and_zero() {
        let page = PageRequest::from_query(None, None).unwrap();
        assert_eq!(page, PageRequest::default());
        assert_eq!(page.page_size(), 10);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn zero_or_negative_size_is_invalid() {
        assert!(matches!(PageRequest::new(0, 0), Err(CatalogError::InvalidArgument(_))));
        assert!(matches!(
            PageRequest::from_query(Some(-5), None),
            Err(CatalogError::InvalidArgument(_))
        ));
    }

    #[test]
    fn negative_index_is_invalid() {
        assert!(matches!(
            PageRequest::from_query(Some(5), Some(-1)),
            Err(CatalogError::InvalidArgument(_))
        ));
    }

    #[test]
    fn offset_saturates() {
        let page = PageRequest::new(u64::MAX, 2).unwrap();
        assert_eq!(page.offset(), u64::MAX);
    }

    #[test]
    fn envelope_serializes_with_wire_names() {
        let page = PageRequest::new(2, 1).unwrap();
        let env = PaginatedItems::new(page, 3, vec!["Cherry"]);
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"pageIndex": 1, "pageSize": 2, "count": 3, "data": ["Cherry"]})
        );
    }

    proptest! {
        #[test]
        fn offset_is_size_times_index(size in 1u64..10_000, index in 0u64..10_000) {
            let page = PageRequest::new(size, index).unwrap();
            prop_assert_eq!(page.offset(), size * index);
            prop_assert_eq!(page.limit(), size);
        }
    }
}
