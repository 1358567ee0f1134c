//! Shared Types
//!
//! Common types used across the application

use serde::{Deserialize, Serialize};

/// Largest page a client may request
pub const MAX_PAGE_SIZE: u32 = 100;

/// Pagination query parameters
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u32,

    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    20
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl PaginationParams {
    /// Page number, never below 1
    pub fn page(&self) -> u32 {
        self.page.max(1)
    }

    /// Get limit for SQL queries (clamped to 1..=MAX_PAGE_SIZE)
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size.clamp(1, MAX_PAGE_SIZE))
    }

    /// Calculate offset for SQL queries
    pub fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * self.limit()
    }
}

/// One page of results
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub page_size: i64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, params: &PaginationParams) -> Self {
        Self {
            items,
            total,
            page: params.page(),
            page_size: params.limit(),
        }
    }
}

/// Response for delete operations
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_clamps_bad_input() {
        let p = PaginationParams { page: 0, page_size: 500 };
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), i64::from(MAX_PAGE_SIZE));
        assert_eq!(p.offset(), 0);

        let p = PaginationParams { page: 3, page_size: 20 };
        assert_eq!(p.offset(), 40);

        let p = PaginationParams { page: 2, page_size: 0 };
        assert_eq!(p.limit(), 1);
        assert_eq!(p.offset(), 1);
    }
}
