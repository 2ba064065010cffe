//! Fixed-size, 1-indexed pagination over the filtered result.

use core::ops::Range;

use bookstore_core::{DomainError, DomainResult};

/// Books per page in the storefront grid.
pub const DEFAULT_PAGE_SIZE: usize = 16;

/// Current page and page size.
///
/// Invariant: `page` is always within `1..=total_pages(len)` for the length
/// it was last clamped against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    page: usize,
    page_size: usize,
}

impl Default for PageCursor {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageCursor {
    pub fn new(page_size: usize) -> DomainResult<Self> {
        if page_size == 0 {
            return Err(DomainError::validation("page size must be at least 1"));
        }
        Ok(Self { page: 1, page_size })
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// `ceil(len / page_size)`, never less than 1.
    pub fn total_pages(&self, len: usize) -> usize {
        len.div_ceil(self.page_size).max(1)
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// Move to `page`, clamped to `[1, total_pages(len)]`.
    pub fn set_page(&mut self, page: usize, len: usize) {
        self.page = page.clamp(1, self.total_pages(len));
    }

    /// Re-clamp after the result length changed.
    pub fn clamp(&mut self, len: usize) {
        self.set_page(self.page, len);
    }

    /// Index range of the current page within a result of length `len`.
    pub fn range(&self, len: usize) -> Range<usize> {
        let start = ((self.page - 1) * self.page_size).min(len);
        let end = (self.page * self.page_size).min(len);
        start..end
    }
}
