//! Equi-join strategies over fixed-length tuple relations.
//!
//! Three interchangeable strategies implement [`JoinMethod`]:
//!
//! - [`BlockNestedLoopJoin`] buffers blocks of left tuples and rescans the
//!   right relation per block. Needs nothing from either input.
//! - [`IndexNestedLoopJoin`] builds an ephemeral [`SecondaryIndex`] over the
//!   right relation and probes it once per left tuple.
//! - [`SortMergeJoin`] sorts copies of both inputs and merges them group by
//!   group.
//!
//! All three emit the same multiset of `left ++ right` tuples into a new
//! relation created next to the left input. Order within the output is
//! strategy-specific.
//!
//! [`SecondaryIndex`]: crate::index::SecondaryIndex
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use equijoin::heap::HeapFile;
//! use equijoin::join::{JoinMethod, JoinSpec, SortMergeJoin};
//! use equijoin::storage::MemoryStorage;
//!
//! let storage = Arc::new(MemoryStorage::new());
//! let mut users = HeapFile::create(storage.clone()).unwrap();
//! let mut orders = HeapFile::create(storage.clone()).unwrap();
//! users.insert(&[1, 0, 0, 0]).unwrap();
//! orders.insert(&[9, 1, 0, 0, 0]).unwrap();
//! orders.insert(&[8, 2, 0, 0, 0]).unwrap();
//!
//! let output = SortMergeJoin::new()
//!     .execute(
//!         &JoinSpec::new(&users, 4, 0).unwrap(),
//!         &JoinSpec::new(&orders, 5, 1).unwrap(),
//!     )
//!     .unwrap();
//! assert_eq!(output.len(), 1);
//! assert_eq!(output.tuple_len(), 9);
//! ```

mod block_nested;
mod error;
mod index_nested;
mod layout;
mod method;
mod sort_merge;
mod spec;
#[cfg(test)]
mod testing;

pub use block_nested::BlockNestedLoopJoin;
pub use error::JoinError;
pub use index_nested::IndexNestedLoopJoin;
pub use layout::{KEY_SIZE, TupleLayout};
pub use method::{JoinMethod, concatenate, decode_key, encode_key, sorted_copy};
pub use sort_merge::SortMergeJoin;
pub use spec::{JoinOutput, JoinSpec, JoinStats};
