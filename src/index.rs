//! Ephemeral secondary indexes keyed by encoded join attributes.
//!
//! An index maps string keys to tuple ids and allows several ids under the
//! same key. Keys compare byte-wise, so callers that need numeric range
//! semantics must encode numbers order-preservingly (see
//! [`encode_key`](crate::join::encode_key)).

mod btree;

pub use btree::{BTreeIndex, BTreeIndexProvider, BTreeIndexScan};

use crate::heap::RecordId;
use crate::storage::StorageError;

/// A secondary index supporting duplicate keys and inclusive range probes.
pub trait SecondaryIndex {
    /// Iterator over the ids matching a probe.
    type Scan<'a>: Iterator<Item = RecordId>
    where
        Self: 'a;

    /// Returns the name the index was created under.
    fn name(&self) -> &str;

    /// Adds an entry. Inserting an existing key appends another id.
    fn insert(&mut self, key: &str, rid: RecordId) -> Result<(), StorageError>;

    /// Returns every id whose key lies in `low..=high`, in key order; ids
    /// under one key come back in insertion order.
    fn range_scan<'a>(&'a self, low: &str, high: &str) -> Result<Self::Scan<'a>, StorageError>;

    /// Destroys the index and releases its name.
    fn destroy(self) -> Result<(), StorageError>;
}

/// Creates secondary indexes.
pub trait IndexProvider {
    /// Index type handed out by this provider.
    type Index: SecondaryIndex;

    /// Creates an empty index named `name`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::IndexExists` if an index with this name is
    /// still alive.
    fn create_index(&self, name: &str) -> Result<Self::Index, StorageError>;
}
