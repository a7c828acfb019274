// ABOUTME: Pagination utilities for list endpoints
// ABOUTME: Standardized query parameters and response wrappers

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;
pub const MIN_PAGE: i64 = 1;

/// Query parameters for pagination (1-indexed pages).
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    MIN_PAGE
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: MIN_PAGE,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PaginationParams {
    /// Normalized (limit, offset) for SQL queries.
    pub fn validate(&self) -> (i64, i64) {
        let page = self.page.max(MIN_PAGE);
        let limit = self.limit.clamp(1, MAX_PAGE_SIZE);
        (limit, (page - 1) * limit)
    }

    pub fn limit(&self) -> i64 {
        self.validate().0
    }

    pub fn offset(&self) -> i64 {
        self.validate().1
    }

    pub fn page(&self) -> i64 {
        self.page.max(MIN_PAGE)
    }
}

#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, params: &PaginationParams, total: i64) -> Self {
        let limit = params.limit();
        Self {
            items,
            page: params.page(),
            limit,
            total,
            total_pages: (total + limit - 1) / limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_validate_clamps_inputs() {
        let params = PaginationParams { page: 0, limit: 500 };
        assert_eq!(params.validate(), (MAX_PAGE_SIZE, 0));

        let params = PaginationParams { page: 3, limit: 10 };
        assert_eq!(params.validate(), (10, 20));
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let params = PaginationParams { page: 1, limit: 10 };
        let response = PaginatedResponse::new(vec![1, 2, 3], &params, 21);
        assert_eq!(response.total_pages, 3);
    }
}
