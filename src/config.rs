//! Join configuration.

use crate::join::JoinError;

/// Default number of left tuples held in memory per block.
pub const DEFAULT_BLOCK_SIZE: usize = 64;

/// Default name of the ephemeral index built by the index-nested-loop join.
pub const DEFAULT_INDEX_NAME: &str = "join_index";

/// Tuning knobs of the join strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinConfig {
    /// Number of left tuples the block-nested-loop join buffers before each
    /// pass over the right relation. Memory use is `block_size` times the
    /// left tuple length.
    pub block_size: usize,

    /// Name under which the index-nested-loop join creates its ephemeral
    /// index. Concurrent joins sharing one index provider need distinct
    /// names.
    pub index_name: String,
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            index_name: DEFAULT_INDEX_NAME.to_string(),
        }
    }
}

impl JoinConfig {
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_index_name(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = index_name.into();
        self
    }

    /// Checks that the configuration can drive a join.
    ///
    /// # Errors
    ///
    /// Returns `JoinError::InvalidConfig` for a zero block size or an empty
    /// index name.
    pub fn validate(&self) -> Result<(), JoinError> {
        if self.block_size == 0 {
            return Err(JoinError::InvalidConfig(
                "block size must be at least 1".to_string(),
            ));
        }
        if self.index_name.is_empty() {
            return Err(JoinError::InvalidConfig(
                "index name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
