//! Fixtures shared by the strategy unit tests.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::heap::{HeapFile, HeapScan, RecordId};
use crate::relation::{Cursor, Relation};
use crate::storage::{MemoryStorage, StorageError};

/// Test tuples: a little-endian `i32` key followed by a little-endian `u32`
/// tag that identifies the tuple.
pub(crate) const TUPLE_LEN: usize = 8;

pub(crate) fn tuple(key: i32, tag: u32) -> [u8; TUPLE_LEN] {
    let mut buf = [0u8; TUPLE_LEN];
    buf[..4].copy_from_slice(&key.to_le_bytes());
    buf[4..].copy_from_slice(&tag.to_le_bytes());
    buf
}

pub(crate) fn relation(storage: &Arc<MemoryStorage>, rows: &[(i32, u32)]) -> HeapFile<MemoryStorage> {
    let mut file = HeapFile::create(Arc::clone(storage)).unwrap();
    for &(key, tag) in rows {
        file.insert(&tuple(key, tag)).unwrap();
    }
    file
}

fn decode(chunk: &[u8]) -> (i32, u32) {
    (
        i32::from_le_bytes(chunk[..4].try_into().unwrap()),
        u32::from_le_bytes(chunk[4..8].try_into().unwrap()),
    )
}

/// Reads back `(key, tag)` pairs of a relation of test tuples in scan order.
pub(crate) fn keys_of(file: &HeapFile<MemoryStorage>) -> Vec<(i32, u32)> {
    let mut cursor = file.open_cursor().unwrap();
    let mut buf = [0u8; TUPLE_LEN];
    let mut rows = Vec::new();
    while cursor.read_next(&mut buf).unwrap().is_some() {
        rows.push(decode(&buf));
    }
    rows
}

/// Multiset of `(left, right)` pairs of a join over two relations of test
/// tuples.
pub(crate) fn pairs_of(file: &HeapFile<MemoryStorage>) -> BTreeMap<((i32, u32), (i32, u32)), usize> {
    let mut cursor = file.open_cursor().unwrap();
    let mut buf = [0u8; 2 * TUPLE_LEN];
    let mut pairs = BTreeMap::new();
    while cursor.read_next(&mut buf).unwrap().is_some() {
        let pair = (decode(&buf[..TUPLE_LEN]), decode(&buf[TUPLE_LEN..]));
        *pairs.entry(pair).or_insert(0) += 1;
    }
    pairs
}

/// Nested-loop reference result.
pub(crate) fn expected_pairs(
    left: &[(i32, u32)],
    right: &[(i32, u32)],
) -> BTreeMap<((i32, u32), (i32, u32)), usize> {
    let mut pairs = BTreeMap::new();
    for &l in left {
        for &r in right {
            if l.0 == r.0 {
                *pairs.entry((l, r)).or_insert(0) += 1;
            }
        }
    }
    pairs
}

fn injected(what: &str) -> StorageError {
    StorageError::Corrupted(format!("injected {what} failure"))
}

/// Heap file wrapper that fails on demand.
///
/// Relations created from it with `create_ephemeral` carry no faults, so
/// outputs and sorted copies behave normally.
pub(crate) struct FaultyRelation {
    inner: HeapFile<MemoryStorage>,
    fail_open: bool,
    fail_read_at: Option<usize>,
    fail_fetch_at: Option<usize>,
    fetches: Cell<usize>,
}

impl FaultyRelation {
    pub(crate) fn new(storage: &Arc<MemoryStorage>, rows: &[(i32, u32)]) -> Self {
        Self::wrap(relation(storage, rows))
    }

    fn wrap(inner: HeapFile<MemoryStorage>) -> Self {
        Self {
            inner,
            fail_open: false,
            fail_read_at: None,
            fail_fetch_at: None,
            fetches: Cell::new(0),
        }
    }

    /// Every `open_cursor` fails.
    pub(crate) fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// The `n`-th `read_next` (1-based) of each cursor fails.
    pub(crate) fn failing_read_at(mut self, n: usize) -> Self {
        self.fail_read_at = Some(n);
        self
    }

    /// The `n`-th `fetch` (1-based) fails.
    pub(crate) fn failing_fetch_at(mut self, n: usize) -> Self {
        self.fail_fetch_at = Some(n);
        self
    }
}

pub(crate) struct FaultyCursor<'a> {
    inner: HeapScan<'a, MemoryStorage>,
    fail_read_at: Option<usize>,
    reads: usize,
}

impl Cursor for FaultyCursor<'_> {
    fn read_next(&mut self, buf: &mut [u8]) -> Result<Option<RecordId>, StorageError> {
        self.reads += 1;
        if Some(self.reads) == self.fail_read_at {
            return Err(injected("read"));
        }
        self.inner.read_next(buf)
    }

    fn move_to(&mut self, rid: RecordId) -> Result<(), StorageError> {
        self.inner.move_to(rid)
    }

    fn rewind(&mut self) -> Result<(), StorageError> {
        self.inner.rewind()
    }
}

impl Relation for FaultyRelation {
    type Cursor<'a>
        = FaultyCursor<'a>
    where
        Self: 'a;

    fn create_ephemeral(&self) -> Result<Self, StorageError> {
        Ok(Self::wrap(self.inner.create_ephemeral()?))
    }

    fn open_cursor(&self) -> Result<FaultyCursor<'_>, StorageError> {
        if self.fail_open {
            return Err(injected("open"));
        }
        Ok(FaultyCursor {
            inner: self.inner.scan(),
            fail_read_at: self.fail_read_at,
            reads: 0,
        })
    }

    fn fetch(&self, rid: RecordId, buf: &mut [u8]) -> Result<(), StorageError> {
        let n = self.fetches.get() + 1;
        self.fetches.set(n);
        if Some(n) == self.fail_fetch_at {
            return Err(injected("fetch"));
        }
        self.inner.fetch(rid, buf)
    }

    fn insert(&mut self, tuple: &[u8]) -> Result<RecordId, StorageError> {
        self.inner.insert(tuple)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}
