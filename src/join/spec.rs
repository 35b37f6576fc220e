//! Join inputs and results.

use super::error::JoinError;
use super::layout::TupleLayout;
use crate::relation::Relation;

/// One input of a join: a relation plus the shape of its tuples.
pub struct JoinSpec<'a, R> {
    relation: &'a R,
    layout: TupleLayout,
}

impl<'a, R: Relation> JoinSpec<'a, R> {
    /// Describes `relation` as holding `tuple_len`-byte tuples whose join
    /// attribute starts at `key_offset`.
    ///
    /// # Errors
    ///
    /// Returns `JoinError::InvalidLayout` if the attribute does not fit.
    pub fn new(relation: &'a R, tuple_len: usize, key_offset: usize) -> Result<Self, JoinError> {
        Ok(Self::with_layout(relation, TupleLayout::new(tuple_len, key_offset)?))
    }

    pub fn with_layout(relation: &'a R, layout: TupleLayout) -> Self {
        Self { relation, layout }
    }

    pub fn relation(&self) -> &'a R {
        self.relation
    }

    pub fn layout(&self) -> TupleLayout {
        self.layout
    }

    pub fn tuple_len(&self) -> usize {
        self.layout.tuple_len()
    }
}

/// Per-invocation counters of a join.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinStats {
    /// Tuples read from the left input.
    pub left_tuples: usize,
    /// Tuples read from the right input (counted once, however often it is
    /// rescanned).
    pub right_tuples: usize,
    /// Left blocks processed by the block-nested-loop join.
    pub blocks: usize,
    /// Equality probes issued against the ephemeral index.
    pub index_probes: usize,
    /// Concatenated tuples written to the output.
    pub emitted: usize,
}

/// The materialized result of a join.
///
/// Every tuple of `relation` is a left tuple followed by the right tuple it
/// matched, so its length is the sum of the input tuple lengths.
pub struct JoinOutput<R> {
    relation: R,
    tuple_len: usize,
    stats: JoinStats,
}

impl<R: Relation> JoinOutput<R> {
    pub(crate) fn new(relation: R, tuple_len: usize, stats: JoinStats) -> Self {
        Self {
            relation,
            tuple_len,
            stats,
        }
    }

    pub fn relation(&self) -> &R {
        &self.relation
    }

    pub fn tuple_len(&self) -> usize {
        self.tuple_len
    }

    pub fn stats(&self) -> JoinStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.relation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relation.is_empty()
    }

    /// Describes the output as an input of a further join, keyed at
    /// `key_offset` within the concatenated tuple.
    pub fn spec(&self, key_offset: usize) -> Result<JoinSpec<'_, R>, JoinError> {
        JoinSpec::new(&self.relation, self.tuple_len, key_offset)
    }

    pub fn into_relation(self) -> R {
        self.relation
    }
}
