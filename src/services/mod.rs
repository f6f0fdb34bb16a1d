//! Business services. Each service owns a connection pool handle and
//! exposes the operations for one aggregate; handlers stay thin.

pub mod categories;
pub mod orders;
pub mod products;
pub mod reports;
pub mod suppliers;

use serde::{Deserialize, Serialize};

/// Pagination metadata returned alongside every list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub pages: u64,
}

impl Pagination {
    pub fn new(page: u64, limit: u64, total: u64) -> Self {
        let pages = if limit == 0 {
            0
        } else {
            total.div_ceil(limit)
        };
        Self {
            page,
            limit,
            total,
            pages,
        }
    }
}

/// Page/limit query parameters shared by the list endpoints.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl PageParams {
    /// Normalized (page, limit) with the documented defaults of 1 / 10.
    pub fn resolve(&self) -> (u64, u64) {
        let page = self.page.filter(|p| *p >= 1).unwrap_or(1);
        let limit = self.limit.filter(|l| *l >= 1).unwrap_or(10);
        (page, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_rounds_pages_up() {
        let p = Pagination::new(1, 10, 25);
        assert_eq!(p.pages, 3);
        assert_eq!(Pagination::new(1, 10, 0).pages, 0);
        assert_eq!(Pagination::new(1, 10, 10).pages, 1);
    }

    #[test]
    fn page_params_default_to_first_page_of_ten() {
        let params = PageParams::default();
        assert_eq!(params.resolve(), (1, 10));

        let params = PageParams {
            page: Some(0),
            limit: Some(0),
        };
        assert_eq!(params.resolve(), (1, 10));

        let params = PageParams {
            page: Some(3),
            limit: Some(25),
        };
        assert_eq!(params.resolve(), (3, 25));
    }
}
