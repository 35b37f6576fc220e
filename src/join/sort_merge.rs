//! Sort-merge join.

use tracing::trace;

use super::error::JoinError;
use super::layout::TupleLayout;
use super::method::{JoinMethod, OutputWriter, sorted_copy};
use super::spec::{JoinOutput, JoinSpec, JoinStats};
use crate::heap::RecordId;
use crate::relation::{Cursor, Relation};

/// Joins by sorting both inputs on the join attribute and merging them.
///
/// Every left tuple of a key group is matched against the whole right group
/// of the same key, so duplicate keys on both sides yield their full cross
/// product. The sorted copies are released when the join returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortMergeJoin;

impl SortMergeJoin {
    pub fn new() -> Self {
        Self
    }
}

impl JoinMethod for SortMergeJoin {
    fn name(&self) -> &'static str {
        "sort_merge"
    }

    fn join<R: Relation>(
        &self,
        left: &JoinSpec<'_, R>,
        right: &JoinSpec<'_, R>,
    ) -> Result<JoinOutput<R>, JoinError> {
        let mut out = OutputWriter::create(left, right)?;
        let left_sorted = sorted_copy(left)?;
        let right_sorted = sorted_copy(right)?;
        let stats = JoinStats {
            left_tuples: left_sorted.len(),
            right_tuples: right_sorted.len(),
            ..JoinStats::default()
        };

        merge(
            &left_sorted,
            left.layout(),
            &right_sorted,
            right.layout(),
            &mut out,
        )?;
        Ok(out.finish(stats))
    }
}

fn open<'r, R: Relation>(relation: &'r R, side: &'static str) -> Result<R::Cursor<'r>, JoinError> {
    relation
        .open_cursor()
        .map_err(|source| JoinError::CursorOpenFailed {
            relation: side,
            source,
        })
}

/// Merges two relations already sorted on their join attributes.
///
/// `s` walks the left side, `g` marks the first tuple of the current right
/// group and `t` replays that group once per matching left tuple.
fn merge<R: Relation>(
    left: &R,
    left_layout: TupleLayout,
    right: &R,
    right_layout: TupleLayout,
    out: &mut OutputWriter<R>,
) -> Result<(), JoinError> {
    let mut s = open(left, "left")?;
    let mut g = open(right, "right")?;
    let mut t = open(right, "right")?;

    let mut s_buf = vec![0u8; left_layout.tuple_len()];
    let mut g_buf = vec![0u8; right_layout.tuple_len()];
    let mut t_buf = vec![0u8; right_layout.tuple_len()];

    if s.read_next(&mut s_buf)?.is_none() {
        return Ok(());
    }
    let Some(mut group_start) = g.read_next(&mut g_buf)? else {
        return Ok(());
    };
    let mut s_key = left_layout.key(&s_buf);
    let mut g_key = right_layout.key(&g_buf);

    loop {
        while s_key < g_key {
            if s.read_next(&mut s_buf)?.is_none() {
                return Ok(());
            }
            s_key = left_layout.key(&s_buf);
        }
        while g_key < s_key {
            let Some(rid) = g.read_next(&mut g_buf)? else {
                return Ok(());
            };
            group_start = rid;
            g_key = right_layout.key(&g_buf);
        }
        if s_key != g_key {
            // G overshot S; resume advancing S.
            continue;
        }

        let group_key = s_key;
        let mut next_group: Option<RecordId>;
        let mut left_exhausted = false;
        let mut left_in_group = 0usize;
        loop {
            left_in_group += 1;
            t.move_to(group_start)?;
            next_group = None;
            while let Some(rid) = t.read_next(&mut t_buf)? {
                if right_layout.key(&t_buf) != group_key {
                    next_group = Some(rid);
                    break;
                }
                out.emit(&s_buf, &t_buf)?;
            }

            if s.read_next(&mut s_buf)?.is_none() {
                left_exhausted = true;
                break;
            }
            s_key = left_layout.key(&s_buf);
            if s_key != group_key {
                break;
            }
        }
        trace!(key = group_key, left_in_group, "merged group");

        if left_exhausted {
            return Ok(());
        }
        let Some(rid) = next_group else {
            return Ok(());
        };
        g.move_to(rid)?;
        let Some(rid) = g.read_next(&mut g_buf)? else {
            return Ok(());
        };
        group_start = rid;
        g_key = right_layout.key(&g_buf);
    }
}
