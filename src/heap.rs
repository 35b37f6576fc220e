//! Heap storage for fixed-length tuples.
//!
//! A heap file is an unordered collection of tuples spread over slotted
//! pages. It is the relation type the join strategies read from and write
//! their results (and sorted copies) into.
//!
//! - [`HeapPage`]: Page-level tuple storage using a slotted page structure
//! - [`HeapFile`]: A relation made of a chain of heap pages
//! - [`HeapScan`]: Forward, repositionable cursor over a heap file

mod error;
mod file;
mod page;
mod scan;

pub use error::HeapError;
pub use file::HeapFile;
pub use page::{HeapPage, MAX_RECORD_SIZE, RecordId, SLOT_SIZE, SlotEntry, SlotId};
pub use scan::HeapScan;
