//! List pagination
//!
//! Every list endpoint accepts `page` (1-based) and `page_size` query
//! parameters and answers with the total count alongside the page of
//! results.

use serde::{Deserialize, Serialize};

/// Default page size when the caller does not ask for one
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound on page size; larger requests are capped, not rejected
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl PageQuery {
    /// Translate to SQL LIMIT/OFFSET
    pub fn limit_offset(&self) -> (i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let size = self
            .page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let offset = (page as i64 - 1) * size as i64;
        (size as i64, offset)
    }
}

/// A page of results plus the total number of matching rows
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub results: Vec<T>,
}
