//! Page arithmetic for email listings.

use serde::Serialize;

use crate::entity::{Email, MessageId};
use crate::{Error, Result};

/// Largest page size a listing accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A validated page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page_size: u32,
    page: u32,
}

impl PageRequest {
    /// Validates `page_size` and coerces a zero `page` to the first page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPageSize`] unless `1 <= page_size <= 100`.
    pub fn new(page_size: u32, page: u32) -> Result<Self> {
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(Error::InvalidPageSize(page_size));
        }
        Ok(Self {
            page_size,
            page: page.max(1),
        })
    }

    /// Rows per page.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Rows to skip before this page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    /// Pages needed for `total` rows. An empty listing still has one page.
    #[must_use]
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.page_size)).max(1)
    }
}

/// One page of an account's emails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaginatedEmails {
    /// Emails on this page, newest received first.
    pub emails: Vec<Email>,
    /// Messages the account owns in total.
    pub total_count: u64,
    /// One-based page number actually served.
    pub page: u32,
    /// Requested page size.
    pub page_size: u32,
    /// Pages available at this page size (at least 1).
    pub total_pages: u64,
    /// Messages in the window that were left out because their recipients
    /// or attachments could not be loaded.
    pub skipped: Vec<MessageId>,
}

impl PaginatedEmails {
    /// Whether some messages in the window were left out.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.skipped.is_empty()
    }
}
