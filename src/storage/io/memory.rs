//! In-memory page storage implementation.

use std::collections::HashMap;

use parking_lot::Mutex;

use super::Storage;
use crate::storage::error::StorageError;
use crate::storage::page::{PAGE_SIZE, PageId};

/// In-memory page storage.
///
/// Pages live in a `HashMap<PageId, Box<[u8; PAGE_SIZE]>>` behind a
/// `parking_lot::Mutex`. Page ids are never reused, which makes stale record
/// ids fail loudly instead of aliasing a newer page.
pub struct MemoryStorage {
    inner: Mutex<MemoryInner>,
    /// Optional limit on live pages (for testing storage full scenarios).
    max_pages: Option<usize>,
}

struct MemoryInner {
    pages: HashMap<PageId, Box<[u8; PAGE_SIZE]>>,
    next_page_id: u64,
}

impl MemoryStorage {
    /// Creates a new empty memory storage.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MemoryInner {
                pages: HashMap::new(),
                next_page_id: 0,
            }),
            max_pages: None,
        }
    }

    /// Creates a new memory storage that holds at most `max_pages` live pages.
    ///
    /// Allocations beyond the limit fail with `StorageError::StorageFull`.
    pub fn with_max_pages(max_pages: usize) -> Self {
        Self {
            max_pages: Some(max_pages),
            ..Self::new()
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemoryStorage {
    fn read_page(&self, page_id: PageId, buf: &mut [u8]) -> Result<(), StorageError> {
        if buf.len() != PAGE_SIZE {
            return Err(StorageError::InvalidBufferSize {
                expected: PAGE_SIZE,
                actual: buf.len(),
            });
        }

        let inner = self.inner.lock();
        let page = inner
            .pages
            .get(&page_id)
            .ok_or(StorageError::PageNotFound(page_id))?;

        buf.copy_from_slice(&page[..]);
        Ok(())
    }

    fn write_page(&self, page_id: PageId, buf: &[u8]) -> Result<(), StorageError> {
        if buf.len() != PAGE_SIZE {
            return Err(StorageError::InvalidBufferSize {
                expected: PAGE_SIZE,
                actual: buf.len(),
            });
        }

        let mut inner = self.inner.lock();
        let page = inner
            .pages
            .get_mut(&page_id)
            .ok_or(StorageError::PageNotFound(page_id))?;

        page.copy_from_slice(buf);
        Ok(())
    }

    fn allocate_page(&self) -> Result<PageId, StorageError> {
        let mut inner = self.inner.lock();

        if let Some(max) = self.max_pages
            && inner.pages.len() >= max
        {
            return Err(StorageError::StorageFull);
        }

        let page_id = PageId::new(inner.next_page_id);
        inner.next_page_id += 1;
        inner.pages.insert(page_id, Box::new([0u8; PAGE_SIZE]));

        Ok(page_id)
    }

    fn deallocate_page(&self, page_id: PageId) -> Result<(), StorageError> {
        self.inner
            .lock()
            .pages
            .remove(&page_id)
            .map(|_| ())
            .ok_or(StorageError::PageNotFound(page_id))
    }

    fn page_count(&self) -> usize {
        self.inner.lock().pages.len()
    }

    fn sync_all(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
