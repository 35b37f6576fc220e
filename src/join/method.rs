//! The strategy trait and the utilities the strategies share.

use tracing::{debug, error};

use super::error::JoinError;
use super::spec::{JoinOutput, JoinSpec, JoinStats};
use crate::relation::{Cursor, Relation};

/// An equi-join strategy.
///
/// Every strategy produces the same multiset of `left ++ right` tuples for
/// the same inputs; they differ only in access pattern and cost. The output
/// is created on the left relation's backend and returned fully
/// materialized.
pub trait JoinMethod {
    /// Short name used in log events.
    fn name(&self) -> &'static str;

    /// Runs the join without logging.
    fn join<R: Relation>(
        &self,
        left: &JoinSpec<'_, R>,
        right: &JoinSpec<'_, R>,
    ) -> Result<JoinOutput<R>, JoinError>;

    /// Joins `left` with `right` on equal join attributes.
    ///
    /// # Errors
    ///
    /// Any failure of the backend or the ephemeral index aborts the join. No
    /// output is returned and every ephemeral resource has been released.
    fn execute<R: Relation>(
        &self,
        left: &JoinSpec<'_, R>,
        right: &JoinSpec<'_, R>,
    ) -> Result<JoinOutput<R>, JoinError> {
        let strategy = self.name();
        debug!(
            strategy,
            left_tuple_len = left.tuple_len(),
            right_tuple_len = right.tuple_len(),
            left_len = left.relation().len(),
            right_len = right.relation().len(),
            "join started"
        );
        let output = self
            .join(left, right)
            .inspect_err(|err| error!(strategy, error = %err, "join failed"))?;
        debug!(strategy, stats = ?output.stats(), "join finished");
        Ok(output)
    }
}

/// Writes `left` followed by `right` into `out`.
///
/// # Panics
///
/// Panics if `out.len() != left.len() + right.len()`.
pub fn concatenate(left: &[u8], right: &[u8], out: &mut [u8]) {
    let (head, tail) = out.split_at_mut(left.len());
    head.copy_from_slice(left);
    tail.copy_from_slice(right);
}

/// Encodes a join attribute as a fixed-width index key.
///
/// The key is the value with its sign bit flipped, as 8 lowercase hex digits,
/// so byte-wise comparison of keys agrees with numeric comparison over the
/// whole `i32` range.
pub fn encode_key(value: i32) -> String {
    format!("{:08x}", (value as u32) ^ 0x8000_0000)
}

/// Inverse of [`encode_key`]. Returns `None` for strings it cannot produce.
pub fn decode_key(key: &str) -> Option<i32> {
    if key.len() != 8 || !key.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
        return None;
    }
    let raw = u32::from_str_radix(key, 16).ok()?;
    Some((raw ^ 0x8000_0000) as i32)
}

/// Copies the tuples of `spec` into a new relation ordered by join attribute.
///
/// Tuples with equal keys keep their scan order. The copy is created on the
/// same backend as the input and released when dropped.
///
/// # Errors
///
/// Returns `JoinError::CursorOpenFailed` or `JoinError::IoFailure` if the
/// input cannot be read, `JoinError::ResourceAllocationFailed` if the copy
/// cannot be created.
pub fn sorted_copy<R: Relation>(spec: &JoinSpec<'_, R>) -> Result<R, JoinError> {
    let layout = spec.layout();
    let tuple_len = layout.tuple_len();

    let mut cursor = spec
        .relation()
        .open_cursor()
        .map_err(|source| JoinError::CursorOpenFailed {
            relation: "sort input",
            source,
        })?;
    let mut tuples = Vec::with_capacity(spec.relation().len() * tuple_len);
    let mut buf = vec![0u8; tuple_len];
    while cursor.read_next(&mut buf)?.is_some() {
        tuples.extend_from_slice(&buf);
    }

    let mut rows: Vec<&[u8]> = tuples.chunks_exact(tuple_len).collect();
    rows.sort_by_key(|row| layout.key(row));

    let mut sorted = spec
        .relation()
        .create_ephemeral()
        .map_err(|source| JoinError::ResourceAllocationFailed {
            resource: "sorted copy",
            source,
        })?;
    for row in rows {
        sorted.insert(row)?;
    }
    Ok(sorted)
}

/// Output relation of a running join plus its staging buffer.
pub(crate) struct OutputWriter<R> {
    relation: R,
    buf: Vec<u8>,
    emitted: usize,
}

impl<R: Relation> OutputWriter<R> {
    /// Creates an empty output relation next to the left input.
    pub(crate) fn create(left: &JoinSpec<'_, R>, right: &JoinSpec<'_, R>) -> Result<Self, JoinError> {
        let relation = left
            .relation()
            .create_ephemeral()
            .map_err(|source| JoinError::ResourceAllocationFailed {
                resource: "output relation",
                source,
            })?;
        Ok(Self {
            relation,
            buf: vec![0u8; left.tuple_len() + right.tuple_len()],
            emitted: 0,
        })
    }

    pub(crate) fn emit(&mut self, left: &[u8], right: &[u8]) -> Result<(), JoinError> {
        concatenate(left, right, &mut self.buf);
        self.relation.insert(&self.buf)?;
        self.emitted += 1;
        Ok(())
    }

    pub(crate) fn finish(self, mut stats: JoinStats) -> JoinOutput<R> {
        stats.emitted = self.emitted;
        JoinOutput::new(self.relation, self.buf.len(), stats)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::join::testing::{TUPLE_LEN, keys_of, relation};
    use crate::storage::{MemoryStorage, Storage};

    #[test]
    fn test_concatenate() {
        let mut out = [0u8; 5];
        concatenate(&[1, 2], &[3, 4, 5], &mut out);
        assert_eq!(out, [1, 2, 3, 4, 5]);

        let mut empty_right = [0u8; 2];
        concatenate(&[7, 8], &[], &mut empty_right);
        assert_eq!(empty_right, [7, 8]);
    }

    #[test]
    #[should_panic]
    fn test_concatenate_rejects_wrong_length() {
        let mut out = [0u8; 4];
        concatenate(&[1, 2], &[3, 4, 5], &mut out);
    }

    #[test]
    fn test_encode_key_examples() {
        assert_eq!(encode_key(i32::MIN), "00000000");
        assert_eq!(encode_key(-1), "7fffffff");
        assert_eq!(encode_key(0), "80000000");
        assert_eq!(encode_key(1), "80000001");
        assert_eq!(encode_key(i32::MAX), "ffffffff");
    }

    #[test]
    fn test_encode_key_preserves_order() {
        let values = [
            i32::MIN,
            i32::MIN + 1,
            -65_536,
            -256,
            -255,
            -16,
            -1,
            0,
            1,
            15,
            16,
            255,
            65_536,
            i32::MAX - 1,
            i32::MAX,
        ];
        for a in values {
            for b in values {
                assert_eq!(a.cmp(&b), encode_key(a).cmp(&encode_key(b)), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn test_decode_key() {
        for value in [i32::MIN, -42, 0, 42, i32::MAX] {
            assert_eq!(decode_key(&encode_key(value)), Some(value));
        }
        assert_eq!(decode_key("8000000"), None);
        assert_eq!(decode_key("8000000A"), None);
        assert_eq!(decode_key("+8000000"), None);
    }

    #[test]
    fn test_sorted_copy_orders_by_key() {
        let storage = Arc::new(MemoryStorage::new());
        let input = relation(&storage, &[(5, 0), (-3, 1), (5, 2), (0, 3), (-3, 4)]);
        let spec = JoinSpec::new(&input, TUPLE_LEN, 0).unwrap();

        let sorted = sorted_copy(&spec).unwrap();
        assert_eq!(sorted.len(), 5);
        assert_eq!(keys_of(&sorted), vec![(-3, 1), (-3, 4), (0, 3), (5, 0), (5, 2)]);
        // Input untouched.
        assert_eq!(keys_of(&input), vec![(5, 0), (-3, 1), (5, 2), (0, 3), (-3, 4)]);
    }

    #[test]
    fn test_sorted_copy_is_released_on_drop() {
        let storage = Arc::new(MemoryStorage::new());
        let input = relation(&storage, &[(2, 0), (1, 1)]);
        let baseline = storage.page_count();

        let spec = JoinSpec::new(&input, TUPLE_LEN, 0).unwrap();
        let sorted = sorted_copy(&spec).unwrap();
        assert!(storage.page_count() > baseline);
        drop(sorted);
        assert_eq!(storage.page_count(), baseline);
    }

    #[test]
    fn test_sorted_copy_allocation_failure() {
        let storage = Arc::new(MemoryStorage::with_max_pages(1));
        let input = relation(&storage, &[(2, 0), (1, 1)]);
        let spec = JoinSpec::new(&input, TUPLE_LEN, 0).unwrap();

        assert!(matches!(
            sorted_copy(&spec),
            Err(JoinError::ResourceAllocationFailed {
                resource: "sorted copy",
                ..
            })
        ));
        assert_eq!(storage.page_count(), 1);
    }
}
