//! In-memory ordered index built on `BTreeMap`.

use std::collections::btree_map;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;
use std::slice;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;

use super::{IndexProvider, SecondaryIndex};
use crate::heap::RecordId;
use crate::storage::StorageError;

type Registry = Arc<Mutex<BTreeSet<String>>>;

/// Hands out [`BTreeIndex`]es and tracks which of them are still alive.
///
/// An index name stays registered until the index is destroyed or dropped.
/// Dropping an index without [`SecondaryIndex::destroy`] still releases its
/// name but logs a warning.
#[derive(Clone, Default)]
pub struct BTreeIndexProvider {
    registry: Registry,
}

impl BTreeIndexProvider {
    /// Creates a provider with no live indexes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the names of all indexes that have not been destroyed.
    pub fn live_indexes(&self) -> Vec<String> {
        self.registry.lock().iter().cloned().collect()
    }
}

impl IndexProvider for BTreeIndexProvider {
    type Index = BTreeIndex;

    fn create_index(&self, name: &str) -> Result<BTreeIndex, StorageError> {
        if !self.registry.lock().insert(name.to_string()) {
            return Err(StorageError::IndexExists(name.to_string()));
        }
        Ok(BTreeIndex {
            name: name.to_string(),
            entries: BTreeMap::new(),
            len: 0,
            registry: Arc::clone(&self.registry),
            registered: true,
        })
    }
}

/// Ordered in-memory secondary index.
///
/// Duplicate keys share one map entry holding their ids in insertion order.
pub struct BTreeIndex {
    name: String,
    entries: BTreeMap<String, Vec<RecordId>>,
    len: usize,
    registry: Registry,
    /// Cleared by `destroy`; otherwise `Drop` releases the name.
    registered: bool,
}

impl BTreeIndex {
    /// Returns the number of (key, id) entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the index has no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of distinct keys.
    pub fn distinct_keys(&self) -> usize {
        self.entries.len()
    }
}

impl SecondaryIndex for BTreeIndex {
    type Scan<'a> = BTreeIndexScan<'a>;

    fn name(&self) -> &str {
        &self.name
    }

    fn insert(&mut self, key: &str, rid: RecordId) -> Result<(), StorageError> {
        match self.entries.get_mut(key) {
            Some(rids) => rids.push(rid),
            None => {
                self.entries.insert(key.to_string(), vec![rid]);
            }
        }
        self.len += 1;
        Ok(())
    }

    fn range_scan<'a>(&'a self, low: &str, high: &str) -> Result<BTreeIndexScan<'a>, StorageError> {
        // BTreeMap::range panics on an inverted range; an inverted probe
        // simply matches nothing.
        let range = (low <= high).then(|| {
            self.entries
                .range::<str, _>((Bound::Included(low), Bound::Included(high)))
        });
        Ok(BTreeIndexScan {
            range,
            current: [].iter(),
        })
    }

    fn destroy(mut self) -> Result<(), StorageError> {
        self.registered = false;
        if self.registry.lock().remove(&self.name) {
            Ok(())
        } else {
            Err(StorageError::IndexNotFound(self.name.clone()))
        }
    }
}

impl Drop for BTreeIndex {
    fn drop(&mut self) {
        if self.registered && self.registry.lock().remove(&self.name) {
            warn!(index = %self.name, "index dropped without being destroyed");
        }
    }
}

/// Iterator over the ids returned by [`BTreeIndex::range_scan`].
pub struct BTreeIndexScan<'a> {
    range: Option<btree_map::Range<'a, String, Vec<RecordId>>>,
    current: slice::Iter<'a, RecordId>,
}

impl Iterator for BTreeIndexScan<'_> {
    type Item = RecordId;

    fn next(&mut self) -> Option<RecordId> {
        loop {
            if let Some(rid) = self.current.next() {
                return Some(*rid);
            }
            let (_, rids) = self.range.as_mut()?.next()?;
            self.current = rids.iter();
        }
    }
}
