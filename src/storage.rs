//! Storage layer for page-based I/O.
//!
//! Relations, sorted copies and join outputs all live in 8KB pages handed out
//! by a [`Storage`] backend. The layer only moves raw page bytes; page formats
//! are interpreted by the heap module.
//!
//! ```text
//! +-------------------+
//! | HeapFile          |  <- heap
//! +-------------------+
//!          |
//!          v
//! +-------------------+
//! | Storage Trait     |  <- io
//! +-------------------+
//!       /      \
//!      v        v
//! +--------------+ +-------------+
//! | MemoryStorage| | FileStorage |
//! +--------------+ +-------------+
//! ```

pub mod error;
pub mod io;
pub mod page;

pub use error::StorageError;
pub use io::{FileStorage, MemoryStorage, Storage};
pub use page::{PAGE_SIZE, PageId};
pub(crate) use page::{PAGE_HEADER_SIZE, PageHeader};
#[cfg(test)]
pub(crate) use page::{PAGE_VERSION, PageType};
