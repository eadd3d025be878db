//! Pagination windows.
//!
//! A [`Window`] is an optional skip plus an optional take, validated when it
//! is built. [`Page`] is the page-number form most callers start from.
//!
//! A window over an unordered result is not stable across calls. Attach a
//! deterministic sort chain when paging.

use crate::error::{Result, SpecError};

/// Skip/take applied after filtering and sorting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Window {
    skip: Option<usize>,
    take: Option<usize>,
}

impl Window {
    /// Builds a window. `take` must be at least 1 when set.
    pub fn new(skip: Option<usize>, take: Option<usize>) -> Result<Self> {
        if take == Some(0) {
            return Err(SpecError::InvalidPagination {
                reason: "take must be at least 1",
            });
        }
        Ok(Window { skip, take })
    }

    /// The window covering `page`.
    pub fn from_page(page: Page) -> Self {
        Window {
            skip: Some(page.offset()),
            take: Some(page.size()),
        }
    }

    /// Returns the number of items to skip, if set.
    pub fn skip(&self) -> Option<usize> {
        self.skip
    }

    /// Returns the maximum number of items to return, if set.
    pub fn take(&self) -> Option<usize> {
        self.take
    }

    /// Returns `true` if neither skip nor take is set.
    pub fn is_unbounded(&self) -> bool {
        self.skip.is_none() && self.take.is_none()
    }

    /// Returns a copy with `skip` set.
    pub fn with_skip(self, skip: usize) -> Self {
        Window {
            skip: Some(skip),
            ..self
        }
    }

    /// Returns a copy with `take` set. Fails if `take` is zero.
    pub fn with_take(self, take: usize) -> Result<Self> {
        Window::new(self.skip, Some(take))
    }
}

/// A 1-based page number and a page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Page {
    number: usize,
    size: usize,
}

impl Page {
    /// Both `number` and `size` must be at least 1.
    pub fn new(number: usize, size: usize) -> Result<Self> {
        if number < 1 {
            return Err(SpecError::InvalidPagination {
                reason: "page number must be at least 1",
            });
        }
        if size < 1 {
            return Err(SpecError::InvalidPagination {
                reason: "page size must be at least 1",
            });
        }
        if (number - 1).checked_mul(size).is_none() {
            return Err(SpecError::InvalidPagination {
                reason: "page offset overflows",
            });
        }
        Ok(Page { number, size })
    }

    /// Returns the 1-based page number.
    pub fn number(&self) -> usize {
        self.number
    }

    /// Returns the number of items per page.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Items skipped before this page.
    pub fn offset(&self) -> usize {
        (self.number - 1) * self.size
    }
}
