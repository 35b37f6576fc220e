//! Relation and cursor capabilities consumed by the join strategies.
//!
//! The strategies never name a concrete storage type. Anything that can
//! create a sibling relation, open a forward cursor, fetch by id and append
//! tuples can take part in a join; [`HeapFile`](crate::heap::HeapFile) is the
//! implementation shipped with the crate.

use crate::heap::RecordId;
use crate::storage::StorageError;

/// A sequential, forward-only iterator over a relation's tuples.
///
/// Tuples are copied into caller-owned staging buffers whose length must
/// equal the relation's tuple length.
pub trait Cursor {
    /// Copies the next tuple into `buf` and returns its id, or `None` at the
    /// end of the relation.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::TupleLengthMismatch` if `buf` does not have the
    /// stored tuple's length, or the backend's error on failed page reads.
    fn read_next(&mut self, buf: &mut [u8]) -> Result<Option<RecordId>, StorageError>;

    /// Repositions the cursor so that the next `read_next` returns the tuple
    /// at `rid`. `rid` must have been observed on this relation.
    fn move_to(&mut self, rid: RecordId) -> Result<(), StorageError>;

    /// Repositions the cursor before the first tuple.
    fn rewind(&mut self) -> Result<(), StorageError>;
}

/// A collection of fixed-length tuples.
pub trait Relation: Sized {
    /// Cursor type borrowing the relation for the duration of a scan.
    type Cursor<'a>: Cursor
    where
        Self: 'a;

    /// Creates a new, empty relation on the same backend. It is released when
    /// dropped.
    fn create_ephemeral(&self) -> Result<Self, StorageError>;

    /// Opens a cursor positioned before the first tuple.
    fn open_cursor(&self) -> Result<Self::Cursor<'_>, StorageError>;

    /// Copies the tuple identified by `rid` into `buf`.
    fn fetch(&self, rid: RecordId, buf: &mut [u8]) -> Result<(), StorageError>;

    /// Appends a tuple and returns its id.
    fn insert(&mut self, tuple: &[u8]) -> Result<RecordId, StorageError>;

    /// Returns the number of tuples.
    fn len(&self) -> usize;

    /// Returns true if the relation holds no tuples.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
