//! Block-nested-loop join.

use tracing::trace;

use super::error::JoinError;
use super::method::{JoinMethod, OutputWriter};
use super::spec::{JoinOutput, JoinSpec, JoinStats};
use crate::config::{DEFAULT_BLOCK_SIZE, JoinConfig};
use crate::relation::{Cursor, Relation};

/// Joins by buffering blocks of left tuples and scanning the right relation
/// once per block.
///
/// Needs no index and no order on either input. Costs
/// `ceil(|left| / block_size) * |right|` right-tuple reads, so callers should
/// pass the smaller relation as `left`; the result is the same either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockNestedLoopJoin {
    block_size: usize,
}

impl BlockNestedLoopJoin {
    /// Creates a join buffering `block_size` left tuples per pass.
    ///
    /// # Errors
    ///
    /// Returns `JoinError::InvalidConfig` if `block_size` is zero.
    pub fn new(block_size: usize) -> Result<Self, JoinError> {
        if block_size == 0 {
            return Err(JoinError::InvalidConfig(
                "block size must be at least 1".to_string(),
            ));
        }
        Ok(Self { block_size })
    }

    pub fn from_config(config: &JoinConfig) -> Result<Self, JoinError> {
        config.validate()?;
        Self::new(config.block_size)
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }
}

impl Default for BlockNestedLoopJoin {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl JoinMethod for BlockNestedLoopJoin {
    fn name(&self) -> &'static str {
        "block_nested_loop"
    }

    fn join<R: Relation>(
        &self,
        left: &JoinSpec<'_, R>,
        right: &JoinSpec<'_, R>,
    ) -> Result<JoinOutput<R>, JoinError> {
        let left_layout = left.layout();
        let right_layout = right.layout();
        let left_len = left_layout.tuple_len();

        let mut out = OutputWriter::create(left, right)?;
        let mut stats = JoinStats::default();

        let mut outer = left
            .relation()
            .open_cursor()
            .map_err(|source| JoinError::CursorOpenFailed {
                relation: "left",
                source,
            })?;
        let mut inner = right
            .relation()
            .open_cursor()
            .map_err(|source| JoinError::CursorOpenFailed {
                relation: "right",
                source,
            })?;

        // A block never needs more slots than the left relation has tuples.
        let capacity = self.block_size.min(left.relation().len().max(1));
        let mut block = vec![0u8; capacity * left_len];
        let mut keys = Vec::with_capacity(capacity);
        let mut right_buf = vec![0u8; right.tuple_len()];

        loop {
            keys.clear();
            for slot in block.chunks_exact_mut(left_len) {
                if outer.read_next(slot)?.is_none() {
                    break;
                }
                keys.push(left_layout.key(slot));
            }
            if keys.is_empty() {
                break;
            }
            stats.blocks += 1;
            stats.left_tuples += keys.len();
            trace!(block = stats.blocks, tuples = keys.len(), "scanning right relation");

            while inner.read_next(&mut right_buf)?.is_some() {
                if stats.blocks == 1 {
                    stats.right_tuples += 1;
                }
                let right_key = right_layout.key(&right_buf);
                for (i, &left_key) in keys.iter().enumerate() {
                    if left_key == right_key {
                        let start = i * left_len;
                        out.emit(&block[start..start + left_len], &right_buf)?;
                    }
                }
            }

            // A short block means the left relation is exhausted.
            if keys.len() < self.block_size {
                break;
            }
            inner.rewind()?;
        }

        Ok(out.finish(stats))
    }
}
