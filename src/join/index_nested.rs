//! Index-nested-loop join.

use tracing::{trace, warn};

use super::error::JoinError;
use super::method::{JoinMethod, OutputWriter, encode_key};
use super::spec::{JoinOutput, JoinSpec, JoinStats};
use crate::config::{DEFAULT_INDEX_NAME, JoinConfig};
use crate::index::{IndexProvider, SecondaryIndex};
use crate::relation::{Cursor, Relation};

/// Joins by indexing the right relation on the join attribute and probing
/// the index once per left tuple.
///
/// The index is created from `provider` for the duration of one join and
/// destroyed before `execute` returns, whether the join succeeded or not.
pub struct IndexNestedLoopJoin<P> {
    provider: P,
    index_name: String,
}

impl<P: IndexProvider> IndexNestedLoopJoin<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            index_name: DEFAULT_INDEX_NAME.to_string(),
        }
    }

    pub fn from_config(provider: P, config: &JoinConfig) -> Result<Self, JoinError> {
        config.validate()?;
        Ok(Self::new(provider).with_index_name(config.index_name.clone()))
    }

    pub fn with_index_name(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = index_name.into();
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    fn build_and_probe<R: Relation>(
        &self,
        left: &JoinSpec<'_, R>,
        right: &JoinSpec<'_, R>,
        index: &mut P::Index,
        out: &mut OutputWriter<R>,
        stats: &mut JoinStats,
    ) -> Result<(), JoinError> {
        let right_layout = right.layout();
        let mut right_buf = vec![0u8; right.tuple_len()];
        let mut inner = right
            .relation()
            .open_cursor()
            .map_err(|source| JoinError::CursorOpenFailed {
                relation: "right",
                source,
            })?;
        while let Some(rid) = inner.read_next(&mut right_buf)? {
            index
                .insert(&encode_key(right_layout.key(&right_buf)), rid)
                .map_err(JoinError::IndexOperationFailed)?;
            stats.right_tuples += 1;
        }
        trace!(index = index.name(), entries = stats.right_tuples, "index built");

        let left_layout = left.layout();
        let mut left_buf = vec![0u8; left.tuple_len()];
        let mut outer = left
            .relation()
            .open_cursor()
            .map_err(|source| JoinError::CursorOpenFailed {
                relation: "left",
                source,
            })?;
        while outer.read_next(&mut left_buf)?.is_some() {
            stats.left_tuples += 1;
            let key = encode_key(left_layout.key(&left_buf));
            stats.index_probes += 1;
            let matches = index
                .range_scan(&key, &key)
                .map_err(JoinError::IndexOperationFailed)?;
            for rid in matches {
                right.relation().fetch(rid, &mut right_buf)?;
                out.emit(&left_buf, &right_buf)?;
            }
        }
        Ok(())
    }
}

impl<P: IndexProvider> JoinMethod for IndexNestedLoopJoin<P> {
    fn name(&self) -> &'static str {
        "index_nested_loop"
    }

    fn join<R: Relation>(
        &self,
        left: &JoinSpec<'_, R>,
        right: &JoinSpec<'_, R>,
    ) -> Result<JoinOutput<R>, JoinError> {
        let mut out = OutputWriter::create(left, right)?;
        let mut index = self
            .provider
            .create_index(&self.index_name)
            .map_err(|source| JoinError::ResourceAllocationFailed {
                resource: "secondary index",
                source,
            })?;

        let mut stats = JoinStats::default();
        let joined = self.build_and_probe(left, right, &mut index, &mut out, &mut stats);
        let destroyed = index.destroy();

        match (joined, destroyed) {
            (Ok(()), Ok(())) => Ok(out.finish(stats)),
            (Ok(()), Err(err)) => Err(JoinError::IndexOperationFailed(err)),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(destroy_err)) => {
                warn!(
                    index = %self.index_name,
                    error = %destroy_err,
                    "failed to destroy index after join failure"
                );
                Err(err)
            }
        }
    }
}
