//! Page header shared by every page format.
//!
//! The storage backends never look at this header; it is written and read by
//! the page formats built on top of them (currently only heap pages).

use super::PAGE_SIZE;

/// Size of the page header in bytes.
pub const PAGE_HEADER_SIZE: usize = 8;

/// Current page layout version.
pub const PAGE_VERSION: u8 = 1;

/// Page type identifiers.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    /// Uninitialized or free page.
    Free = 0,
    /// Slotted page holding tuples of a heap file.
    Heap = 1,
}

impl PageType {
    /// Creates a PageType from a raw u8 value.
    ///
    /// Returns `None` if the value doesn't match any known page type.
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(PageType::Free),
            1 => Some(PageType::Heap),
            _ => None,
        }
    }
}

/// Page header stored at the beginning of each page.
///
/// Layout (8 bytes total):
/// - `page_type`: u8
/// - `page_version`: u8
/// - `slot_count`: u16
/// - `free_start`: u16 (end of the slot array)
/// - `free_end`: u16 (start of the record area)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageHeader {
    /// Type of this page.
    pub page_type: PageType,
    /// Layout version number.
    pub page_version: u8,
    /// Number of slots in the slot array.
    pub slot_count: u16,
    /// Offset where free space starts.
    pub free_start: u16,
    /// Offset where free space ends.
    pub free_end: u16,
}

impl PageHeader {
    /// Creates a new header for an empty heap page.
    pub fn new_heap_page() -> Self {
        Self {
            page_type: PageType::Heap,
            page_version: PAGE_VERSION,
            slot_count: 0,
            free_start: PAGE_HEADER_SIZE as u16,
            free_end: PAGE_SIZE as u16,
        }
    }

    /// Returns the amount of contiguous free space available.
    pub fn free_space(&self) -> u16 {
        self.free_end.saturating_sub(self.free_start)
    }

    /// Reads a header from a page byte slice.
    pub fn read_from(data: &[u8]) -> Self {
        Self {
            page_type: PageType::from_u8(data[0]).unwrap_or(PageType::Free),
            page_version: data[1],
            slot_count: u16::from_le_bytes([data[2], data[3]]),
            free_start: u16::from_le_bytes([data[4], data[5]]),
            free_end: u16::from_le_bytes([data[6], data[7]]),
        }
    }

    /// Writes the header to a page byte slice.
    pub fn write_to(&self, data: &mut [u8]) {
        data[0] = self.page_type as u8;
        data[1] = self.page_version;
        data[2..4].copy_from_slice(&self.slot_count.to_le_bytes());
        data[4..6].copy_from_slice(&self.free_start.to_le_bytes());
        data[6..8].copy_from_slice(&self.free_end.to_le_bytes());
    }
}
