//! File-backed storage implementation.

use std::collections::BTreeSet;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use super::Storage;
use crate::storage::error::StorageError;
use crate::storage::page::{PAGE_SIZE, PageId};

/// File-backed storage implementation.
///
/// Stores pages as contiguous 8KB blocks in a single file, which lets large
/// ephemeral relations (sorted copies, join outputs) spill out of memory.
///
/// ```text
/// +------------------+------------------+------------------+
/// | Page 0 (8KB)     | Page 1 (8KB)     | Page 2 (8KB)     | ...
/// +------------------+------------------+------------------+
/// ^ offset 0         ^ offset 8192      ^ offset 16384
/// ```
///
/// Deallocated pages go onto an in-memory free list and are handed out again
/// (lowest id first) before the file grows. The free list is not persisted:
/// reopening a file treats every page as allocated.
pub struct FileStorage {
    path: PathBuf,
    inner: Mutex<FileInner>,
}

struct FileInner<F = File> {
    file: F,
    /// Number of pages in the file, including freed ones.
    page_count: u64,
    free_pages: BTreeSet<PageId>,
}

impl<F> FileInner<F> {
    fn check_allocated(&self, page_id: PageId) -> Result<(), StorageError> {
        if page_id.page_num() >= self.page_count || self.free_pages.contains(&page_id) {
            return Err(StorageError::PageNotFound(page_id));
        }
        Ok(())
    }
}

impl<F: Write + Seek> FileInner<F> {
    /// Zeroes the lowest free page (or a new page at the end of the file) and
    /// only then records it as allocated.
    fn allocate(&mut self) -> Result<PageId, StorageError> {
        let reused = self.free_pages.first().copied();
        let page_id = reused.unwrap_or(PageId::new(self.page_count));

        self.file.seek(SeekFrom::Start(page_id.byte_offset()))?;
        self.file.write_all(&[0u8; PAGE_SIZE])?;

        match reused {
            Some(page_id) => {
                self.free_pages.remove(&page_id);
            }
            None => self.page_count += 1,
        }
        Ok(page_id)
    }
}

impl FileStorage {
    /// Opens or creates a storage file at the given path.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Corrupted` if the file size is not a multiple
    /// of PAGE_SIZE.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let file_size = file.metadata()?.len();
        if file_size % PAGE_SIZE as u64 != 0 {
            return Err(StorageError::Corrupted(format!(
                "file size {} is not a multiple of page size {}",
                file_size, PAGE_SIZE
            )));
        }

        Ok(Self {
            path,
            inner: Mutex::new(FileInner {
                file,
                page_count: file_size / PAGE_SIZE as u64,
                free_pages: BTreeSet::new(),
            }),
        })
    }

    /// Returns the path to the storage file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for FileStorage {
    fn read_page(&self, page_id: PageId, buf: &mut [u8]) -> Result<(), StorageError> {
        if buf.len() != PAGE_SIZE {
            return Err(StorageError::InvalidBufferSize {
                expected: PAGE_SIZE,
                actual: buf.len(),
            });
        }

        let mut inner = self.inner.lock();
        inner.check_allocated(page_id)?;
        inner.file.seek(SeekFrom::Start(page_id.byte_offset()))?;
        inner.file.read_exact(buf)?;

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
        inner.check_allocated(page_id)?;
        inner.file.seek(SeekFrom::Start(page_id.byte_offset()))?;
        inner.file.write_all(buf)?;

        Ok(())
    }

    fn allocate_page(&self) -> Result<PageId, StorageError> {
        self.inner.lock().allocate()
    }

    fn deallocate_page(&self, page_id: PageId) -> Result<(), StorageError> {
        let mut inner = self.inner.lock();
        inner.check_allocated(page_id)?;
        inner.free_pages.insert(page_id);
        Ok(())
    }

    fn page_count(&self) -> usize {
        let inner = self.inner.lock();
        (inner.page_count as usize) - inner.free_pages.len()
    }

    fn sync_all(&self) -> Result<(), StorageError> {
        self.inner.lock().file.sync_all()?;
        Ok(())
    }
}
