//! Page identifier, size constants and the common page header.

mod header;

pub(crate) use header::{PAGE_HEADER_SIZE, PageHeader};
#[cfg(test)]
pub(crate) use header::{PAGE_VERSION, PageType};

/// 8KB page size.
pub const PAGE_SIZE: usize = 8192;

/// Unique identifier for a page within a storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub u64);

impl PageId {
    /// Creates a new PageId from a page number.
    pub const fn new(page_num: u64) -> Self {
        Self(page_num)
    }

    /// Returns the page number.
    pub const fn page_num(&self) -> u64 {
        self.0
    }

    /// Byte offset of this page inside a storage file.
    pub const fn byte_offset(&self) -> u64 {
        self.0 * PAGE_SIZE as u64
    }
}
