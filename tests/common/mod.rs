//! Shared helpers for the join integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use equijoin::heap::HeapFile;
use equijoin::index::BTreeIndexProvider;
use equijoin::join::{
    BlockNestedLoopJoin, IndexNestedLoopJoin, JoinError, JoinMethod, JoinOutput, JoinSpec,
    SortMergeJoin,
};
use equijoin::relation::{Cursor, Relation};
use equijoin::storage::Storage;
use tracing_subscriber::EnvFilter;

/// Routes `tracing` output through the test harness. Set `RUST_LOG=debug`
/// to see join events.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Builds a tuple of `len` bytes carrying `key` at `key_offset` and `fill`
/// everywhere else.
pub fn tuple(len: usize, key_offset: usize, key: i32, fill: u8) -> Vec<u8> {
    let mut buf = vec![fill; len];
    buf[key_offset..key_offset + 4].copy_from_slice(&key.to_le_bytes());
    buf
}

pub fn heap_file<S: Storage>(storage: &Arc<S>, tuples: &[Vec<u8>]) -> HeapFile<S> {
    let mut file = HeapFile::create(Arc::clone(storage)).unwrap();
    for t in tuples {
        file.insert(t).unwrap();
    }
    file
}

/// All tuples of a relation, sorted so that outputs compare as multisets.
pub fn sorted_tuples<R: Relation>(relation: &R, tuple_len: usize) -> Vec<Vec<u8>> {
    let mut cursor = relation.open_cursor().unwrap();
    let mut buf = vec![0u8; tuple_len];
    let mut tuples = Vec::new();
    while cursor.read_next(&mut buf).unwrap().is_some() {
        tuples.push(buf.clone());
    }
    tuples.sort();
    tuples
}

pub fn output_tuples<R: Relation>(output: &JoinOutput<R>) -> Vec<Vec<u8>> {
    sorted_tuples(output.relation(), output.tuple_len())
}

/// Nested-loop reference join over plain vectors.
pub fn reference_join(
    left: &[Vec<u8>],
    left_offset: usize,
    right: &[Vec<u8>],
    right_offset: usize,
) -> Vec<Vec<u8>> {
    let key = |t: &[u8], off: usize| i32::from_le_bytes(t[off..off + 4].try_into().unwrap());
    let mut out = Vec::new();
    for l in left {
        for r in right {
            if key(l, left_offset) == key(r, right_offset) {
                out.push([l.as_slice(), r.as_slice()].concat());
            }
        }
    }
    out.sort();
    out
}

/// Runs every strategy (block nested loop with several block sizes) and
/// returns `(label, sorted output)` pairs.
pub fn run_all<R: Relation>(
    left: &JoinSpec<'_, R>,
    right: &JoinSpec<'_, R>,
) -> Vec<(String, Vec<Vec<u8>>)> {
    let mut results = Vec::new();
    let left_len = left.relation().len();
    for block_size in [1, 2, left_len.max(1), left_len + 100] {
        let join = BlockNestedLoopJoin::new(block_size).unwrap();
        let output = join.execute(left, right).unwrap();
        results.push((format!("bnl/{block_size}"), output_tuples(&output)));
    }

    let provider = BTreeIndexProvider::new();
    let output = IndexNestedLoopJoin::new(provider.clone())
        .execute(left, right)
        .unwrap();
    assert!(provider.live_indexes().is_empty());
    results.push(("inl".to_string(), output_tuples(&output)));

    let output = SortMergeJoin::new().execute(left, right).unwrap();
    results.push(("smj".to_string(), output_tuples(&output)));
    results
}

/// Runs one strategy by name, for failure-path tests.
pub fn run_one<R: Relation>(
    strategy: &str,
    provider: &BTreeIndexProvider,
    left: &JoinSpec<'_, R>,
    right: &JoinSpec<'_, R>,
) -> Result<JoinOutput<R>, JoinError> {
    match strategy {
        "bnl" => BlockNestedLoopJoin::default().execute(left, right),
        "inl" => IndexNestedLoopJoin::new(provider.clone()).execute(left, right),
        "smj" => SortMergeJoin::new().execute(left, right),
        other => panic!("unknown strategy {other}"),
    }
}
