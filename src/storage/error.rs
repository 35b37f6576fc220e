//! Storage layer errors.

use thiserror::Error;

use crate::heap::{HeapError, RecordId};
use crate::storage::PageId;

/// Errors reported by storage backends, relations, cursors and indexes.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Page not allocated (or already returned to the backend).
    #[error("page not found: {0:?}")]
    PageNotFound(PageId),

    /// Page buffers must be exactly PAGE_SIZE bytes.
    #[error("invalid buffer size: expected {expected}, got {actual}")]
    InvalidBufferSize { expected: usize, actual: usize },

    /// I/O error from the underlying file system.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend refuses to allocate another page.
    #[error("storage is full")]
    StorageFull,

    /// The storage file has an invalid format or size.
    #[error("data corruption: {0}")]
    Corrupted(String),

    /// The record id does not name a live tuple of the relation.
    #[error("record not found: {0:?}")]
    RecordNotFound(RecordId),

    /// A stored tuple does not have the length the caller expects.
    #[error("tuple length mismatch: expected {expected} bytes, got {actual}")]
    TupleLengthMismatch { expected: usize, actual: usize },

    /// An index with this name is still alive.
    #[error("index \"{0}\" already exists")]
    IndexExists(String),

    /// The index was never created or has already been destroyed.
    #[error("index \"{0}\" does not exist")]
    IndexNotFound(String),

    /// Page-level failure inside a heap file.
    #[error(transparent)]
    Heap(#[from] HeapError),
}
