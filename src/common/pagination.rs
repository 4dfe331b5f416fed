// src/common/pagination.rs
//! Page-number pagination shared by the admin listings

use serde::{Deserialize, Serialize};

use super::{ValidationResult, Validator};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// `?page=&limit=&full_name=` query parameters
#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub full_name: Option<String>,
}

impl PageQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        self.checked_offset().unwrap_or(i64::MAX)
    }

    fn checked_offset(&self) -> Option<i64> {
        self.page().checked_sub(1)?.checked_mul(self.limit())
    }

    /// Name filter as a `LIKE` pattern, or `None` when no filter was given
    pub fn name_pattern(&self) -> Option<String> {
        self.full_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s.to_lowercase()))
    }
}

pub struct PageQueryValidator;

impl Validator<PageQuery> for PageQueryValidator {
    fn validate(&self, data: &PageQuery) -> ValidationResult {
        let mut result = ValidationResult::new();
        if data.page() < 1 {
            result.add_error("page", "Page must be greater than 0");
        } else if data.checked_offset().is_none() {
            result.add_error("page", "Page is out of range");
        }
        if data.limit() < 1 || data.limit() > MAX_PAGE_SIZE {
            result.add_error("limit", "Limit must be between 1 and 100");
        }
        result
    }
}

/// Envelope returned by paginated listings
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub total_count: i64,
    pub total_pages: i64,
    pub page: i64,
    pub page_size: i64,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_count: i64, query: &PageQuery) -> Self {
        let page_size = query.limit();
        Self {
            total_count,
            total_pages: (total_count + page_size - 1) / page_size,
            page: query.page(),
            page_size,
            items,
        }
    }
}
