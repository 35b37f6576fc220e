//! Page I/O backend implementations.
//!
//! This module provides the `Storage` trait for page-based I/O operations,
//! along with MemoryStorage and FileStorage implementations.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use std::sync::Arc;

use super::page::PageId;
use crate::storage::error::StorageError;

/// Page I/O backend trait for page-based storage.
///
/// Reads and writes 8KB pages through caller-owned buffers. All calls are
/// blocking; a join issues them one at a time and never overlaps two scans.
///
/// Pages are handed out by `allocate_page` and returned with
/// `deallocate_page`. Ephemeral relations return every page they own when
/// dropped, so `page_count` observes leaks directly.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a backend can be shared between
/// relations through an `Arc`.
pub trait Storage: Send + Sync {
    /// Reads a page into caller-provided buffer.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::PageNotFound` if the page is not allocated.
    /// Returns `StorageError::InvalidBufferSize` if `buf.len() != PAGE_SIZE`.
    fn read_page(&self, page_id: PageId, buf: &mut [u8]) -> Result<(), StorageError>;

    /// Writes a page from caller-provided buffer.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::PageNotFound` if the page is not allocated.
    /// Returns `StorageError::InvalidBufferSize` if `buf.len() != PAGE_SIZE`.
    fn write_page(&self, page_id: PageId, buf: &[u8]) -> Result<(), StorageError>;

    /// Allocates a new zeroed page and returns its PageId.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::StorageFull` if storage limit is reached.
    fn allocate_page(&self) -> Result<PageId, StorageError>;

    /// Returns a page to the backend. The id may be reused by later
    /// allocations.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::PageNotFound` if the page is not allocated.
    fn deallocate_page(&self, page_id: PageId) -> Result<(), StorageError>;

    /// Returns the number of currently allocated pages.
    fn page_count(&self) -> usize;

    /// Flushes pending writes to durable media (no-op for memory).
    fn sync_all(&self) -> Result<(), StorageError>;
}

impl<S: Storage + ?Sized> Storage for Arc<S> {
    fn read_page(&self, page_id: PageId, buf: &mut [u8]) -> Result<(), StorageError> {
        (**self).read_page(page_id, buf)
    }

    fn write_page(&self, page_id: PageId, buf: &[u8]) -> Result<(), StorageError> {
        (**self).write_page(page_id, buf)
    }

    fn allocate_page(&self) -> Result<PageId, StorageError> {
        (**self).allocate_page()
    }

    fn deallocate_page(&self, page_id: PageId) -> Result<(), StorageError> {
        (**self).deallocate_page(page_id)
    }

    fn page_count(&self) -> usize {
        (**self).page_count()
    }

    fn sync_all(&self) -> Result<(), StorageError> {
        (**self).sync_all()
    }
}
