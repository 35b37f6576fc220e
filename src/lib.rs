//! Equi-joins over slotted heap files.
//!
//! The crate is layered bottom-up:
//!
//! - [`storage`]: fixed-size pages behind the [`Storage`](storage::Storage)
//!   trait, in memory or in a file.
//! - [`heap`]: slotted heap pages and [`HeapFile`](heap::HeapFile)
//!   relations of fixed-length tuples.
//! - [`relation`]: the capabilities a join needs from a relation and its
//!   cursors.
//! - [`index`]: ephemeral secondary indexes with duplicate keys.
//! - [`join`]: block-nested-loop, index-nested-loop and sort-merge joins.
//! - [`config`]: tuning knobs for the joins.

pub mod config;
pub mod heap;
pub mod index;
pub mod join;
pub mod relation;
pub mod storage;
