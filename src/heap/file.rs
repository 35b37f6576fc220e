//! Heap files: relations stored as a chain of slotted pages.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;

use super::error::HeapError;
use super::page::{HeapPage, RecordId};
use super::scan::HeapScan;
use crate::relation::Relation;
use crate::storage::{PAGE_SIZE, PageId, Storage, StorageError};

/// A relation stored as an append-only chain of heap pages.
///
/// The last page of the chain (the tail) is mirrored in memory and written
/// through on every insert. All pages are returned to the storage backend when
/// the file is dropped, so a heap file is always an ephemeral relation: its
/// lifetime is the lifetime of the value.
pub struct HeapFile<S: Storage> {
    storage: Arc<S>,
    /// Pages in scan order.
    pages: Vec<PageId>,
    /// Position of each page in `pages`.
    positions: HashMap<PageId, usize>,
    tail_page: PageId,
    tail: Box<[u8; PAGE_SIZE]>,
    /// Most recently fetched non-tail page.
    fetch_cache: Mutex<PageCache>,
    len: usize,
}

struct PageCache {
    page_id: Option<PageId>,
    data: Box<[u8; PAGE_SIZE]>,
}

impl<S: Storage> HeapFile<S> {
    /// Creates an empty heap file with one initialized page.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::StorageFull` (or an I/O error) if the first
    /// page cannot be allocated and written.
    pub fn create(storage: Arc<S>) -> Result<Self, StorageError> {
        let page_id = storage.allocate_page()?;

        let mut tail = Box::new([0u8; PAGE_SIZE]);
        HeapPage::new(&mut tail[..]).init();

        let file = Self {
            storage,
            pages: vec![page_id],
            positions: HashMap::from([(page_id, 0)]),
            tail_page: page_id,
            tail,
            fetch_cache: Mutex::new(PageCache {
                page_id: None,
                data: Box::new([0u8; PAGE_SIZE]),
            }),
            len: 0,
        };
        // On failure `file` is dropped and releases the page again.
        file.storage.write_page(page_id, &file.tail[..])?;
        Ok(file)
    }

    /// Returns the storage backend this file allocates from.
    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    /// Returns the page ids of this file in scan order.
    pub fn page_ids(&self) -> &[PageId] {
        &self.pages
    }

    /// Opens a cursor positioned before the first tuple.
    pub fn scan(&self) -> HeapScan<'_, S> {
        HeapScan::new(self)
    }

    /// Appends a tuple, growing the file by one page when the tail is full.
    ///
    /// # Errors
    ///
    /// Returns `HeapError::RecordTooLarge` (wrapped) if the tuple can never
    /// fit on a page, or the backend's error if a page cannot be allocated
    /// or written.
    pub fn insert(&mut self, tuple: &[u8]) -> Result<RecordId, StorageError> {
        let inserted = HeapPage::new(&mut self.tail[..]).insert(tuple);
        let slot_id = match inserted {
            Ok(slot_id) => slot_id,
            Err(HeapError::PageFull { .. }) => {
                let page_id = self.storage.allocate_page()?;
                self.positions.insert(page_id, self.pages.len());
                self.pages.push(page_id);
                self.tail_page = page_id;

                let mut page = HeapPage::new(&mut self.tail[..]);
                page.init();
                page.insert(tuple)?
            }
            Err(err) => return Err(err.into()),
        };

        self.storage.write_page(self.tail_page, &self.tail[..])?;
        self.len += 1;
        Ok(RecordId::new(self.tail_page, slot_id))
    }

    /// Copies the tuple at `rid` into `buf`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::RecordNotFound` if `rid` does not belong to this
    /// file, `StorageError::TupleLengthMismatch` if `buf` has the wrong size.
    pub fn fetch(&self, rid: RecordId, buf: &mut [u8]) -> Result<(), StorageError> {
        if !self.positions.contains_key(&rid.page_id) {
            return Err(StorageError::RecordNotFound(rid));
        }

        if rid.page_id == self.tail_page {
            return copy_record(&self.tail[..], rid, buf);
        }

        let mut cache = self.fetch_cache.lock();
        if cache.page_id != Some(rid.page_id) {
            cache.page_id = None;
            self.storage.read_page(rid.page_id, &mut cache.data[..])?;
            cache.page_id = Some(rid.page_id);
        }
        copy_record(&cache.data[..], rid, buf)
    }

    /// Returns the position of `page_id` in scan order.
    pub(crate) fn position(&self, page_id: PageId) -> Option<usize> {
        self.positions.get(&page_id).copied()
    }

    /// Reads the page at scan position `index` into `buf`.
    pub(crate) fn read_page_at(&self, index: usize, buf: &mut [u8]) -> Result<(), StorageError> {
        let page_id = self.pages[index];
        if page_id == self.tail_page {
            buf.copy_from_slice(&self.tail[..]);
            return Ok(());
        }
        self.storage.read_page(page_id, buf)
    }

    /// Returns the number of tuples in the file.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the file holds no tuples.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

fn copy_record(page: &[u8], rid: RecordId, buf: &mut [u8]) -> Result<(), StorageError> {
    let page = HeapPage::new(page);
    let record = page
        .read(rid.slot_id)
        .ok_or(StorageError::RecordNotFound(rid))?;
    if record.len() != buf.len() {
        return Err(StorageError::TupleLengthMismatch {
            expected: buf.len(),
            actual: record.len(),
        });
    }
    buf.copy_from_slice(record);
    Ok(())
}

impl<S: Storage> Drop for HeapFile<S> {
    fn drop(&mut self) {
        for &page_id in &self.pages {
            if let Err(err) = self.storage.deallocate_page(page_id) {
                warn!(?page_id, error = %err, "failed to release heap page");
            }
        }
    }
}

impl<S: Storage> Relation for HeapFile<S> {
    type Cursor<'a>
        = HeapScan<'a, S>
    where
        Self: 'a;

    fn create_ephemeral(&self) -> Result<Self, StorageError> {
        HeapFile::create(Arc::clone(&self.storage))
    }

    fn open_cursor(&self) -> Result<Self::Cursor<'_>, StorageError> {
        Ok(self.scan())
    }

    fn fetch(&self, rid: RecordId, buf: &mut [u8]) -> Result<(), StorageError> {
        HeapFile::fetch(self, rid, buf)
    }

    fn insert(&mut self, tuple: &[u8]) -> Result<RecordId, StorageError> {
        HeapFile::insert(self, tuple)
    }

    fn len(&self) -> usize {
        self.len
    }
}
