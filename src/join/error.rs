//! Join errors.

use thiserror::Error;

use crate::storage::StorageError;

/// Errors returned by the join strategies.
///
/// A failed join hands back no output: the partially filled output relation
/// is dropped before the error reaches the caller.
#[derive(Debug, Error)]
pub enum JoinError {
    /// The join attribute does not fit inside the tuple.
    #[error("invalid tuple layout: 4-byte key at offset {key_offset} exceeds tuple length {tuple_len}")]
    InvalidLayout { tuple_len: usize, key_offset: usize },

    /// A strategy was configured with unusable parameters.
    #[error("invalid join configuration: {0}")]
    InvalidConfig(String),

    /// The output relation, a sorted copy or the ephemeral index could not
    /// be created.
    #[error("failed to allocate {resource}")]
    ResourceAllocationFailed {
        resource: &'static str,
        #[source]
        source: StorageError,
    },

    /// A cursor could not be opened on one of the relations.
    #[error("failed to open cursor on {relation} relation")]
    CursorOpenFailed {
        relation: &'static str,
        #[source]
        source: StorageError,
    },

    /// Inserting into, probing or destroying the ephemeral index failed.
    #[error("index operation failed")]
    IndexOperationFailed(#[source] StorageError),

    /// A read, fetch or insert failed in the middle of a scan.
    #[error("I/O failure during join")]
    IoFailure(#[from] StorageError),
}
