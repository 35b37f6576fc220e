//! Error types for the heap module.

use thiserror::Error;

use super::SlotId;

/// Errors from heap page operations.
#[derive(Debug, Error)]
pub enum HeapError {
    /// Page is full, cannot insert data.
    #[error("page full: need {required} bytes, have {available} available")]
    PageFull {
        /// Bytes required for the data and slot.
        required: usize,
        /// Bytes available in free space.
        available: usize,
    },

    /// Slot not found on the page.
    #[error("slot {0} not found")]
    SlotNotFound(SlotId),

    /// Record cannot fit on an empty page.
    #[error("record of {size} bytes exceeds the maximum of {max} bytes")]
    RecordTooLarge { size: usize, max: usize },
}
