//! Offset pagination for collection reads.

use crate::error::{DomainError, FieldErrors};

pub const DEFAULT_PER_PAGE: u64 = 15;
pub const MAX_PER_PAGE: u64 = 100;

/// Largest row offset a SQL `OFFSET` (a signed 64-bit value) can express.
const MAX_OFFSET: u64 = i64::MAX as u64;

/// A validated, 1-based page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    /// Build from raw query values. Missing values take defaults and
    /// `per_page` is clamped to [`MAX_PER_PAGE`]. A page whose offset does
    /// not fit a SQL `OFFSET` is rejected.
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Result<Self, DomainError> {
        let mut errors = FieldErrors::new();

        let page = match page {
            None => 1,
            Some(p) if p >= 1 => p as u64,
            Some(_) => {
                errors.add("page", "The page must be at least 1.");
                1
            }
        };

        let per_page = match per_page {
            None => DEFAULT_PER_PAGE,
            Some(n) if n >= 1 => (n as u64).min(MAX_PER_PAGE),
            Some(_) => {
                errors.add("per_page", "The per page must be at least 1.");
                DEFAULT_PER_PAGE
            }
        };

        errors.into_result()?;

        let reachable = (page - 1)
            .checked_mul(per_page)
            .is_some_and(|offset| offset <= MAX_OFFSET);
        if !reachable {
            return Err(DomainError::Validation(FieldErrors::single(
                "page",
                "The page is out of range.",
            )));
        }

        Ok(Self { page, per_page })
    }

    /// Number of rows skipped before this page.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// One page of results together with the collection size.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub request: PageRequest,
}

impl<T> Page<T> {
    /// Last page number; an empty collection still has page 1.
    pub fn last_page(&self) -> u64 {
        self.total.div_ceil(self.request.per_page).max(1)
    }
}
