//! Heap page implementation using slotted page structure.
//!
//! ```text
//! +------------------+ offset 0
//! | PageHeader (8B)  |
//! +------------------+ offset 8
//! | Slot Array       | (grows downward)
//! +------------------+
//! | Free Space       |
//! +------------------+
//! | Records          | (grows upward from bottom)
//! +------------------+ offset 8192
//! ```
//!
//! Heap files only ever append, so slots are assigned densely and a slot id
//! doubles as the tuple's position within the page.

use super::error::HeapError;
use crate::storage::{PAGE_HEADER_SIZE, PAGE_SIZE, PageHeader, PageId};

/// Size of each slot entry in bytes.
pub const SLOT_SIZE: usize = 4;

/// Maximum record size that can fit in a single page.
pub const MAX_RECORD_SIZE: usize = PAGE_SIZE - PAGE_HEADER_SIZE - SLOT_SIZE;

/// Slot identifier within a page.
pub type SlotId = u16;

/// A slot entry in the slot array.
///
/// Layout (4 bytes):
/// - `offset`: u16 (offset to record data)
/// - `length`: u16 (record length)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotEntry {
    /// Offset to record data from start of page.
    pub offset: u16,
    /// Length of record in bytes.
    pub length: u16,
}

impl SlotEntry {
    /// Creates a slot entry for a record.
    pub const fn new(offset: u16, length: u16) -> Self {
        Self { offset, length }
    }

    /// Reads a slot entry from bytes.
    pub fn read_from(data: &[u8]) -> Self {
        Self {
            offset: u16::from_le_bytes([data[0], data[1]]),
            length: u16::from_le_bytes([data[2], data[3]]),
        }
    }

    /// Writes a slot entry to bytes.
    pub fn write_to(&self, data: &mut [u8]) {
        data[0..2].copy_from_slice(&self.offset.to_le_bytes());
        data[2..4].copy_from_slice(&self.length.to_le_bytes());
    }
}

/// Global identifier for a tuple (page + slot).
///
/// Ordered by page id, then slot, which is not necessarily scan order: a heap
/// file may chain pages with non-monotonic ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId {
    /// Page containing the record.
    pub page_id: PageId,
    /// Slot within the page.
    pub slot_id: SlotId,
}

impl RecordId {
    /// Creates a new record identifier.
    pub fn new(page_id: PageId, slot_id: SlotId) -> Self {
        Self { page_id, slot_id }
    }
}

/// A heap page view over a PAGE_SIZE buffer.
///
/// The type parameter `T` allows this to wrap `&[u8]` (read-only view),
/// `&mut [u8]` (mutable view) or an owned buffer.
///
/// ```
/// use equijoin::heap::HeapPage;
/// use equijoin::storage::PAGE_SIZE;
///
/// let mut data = vec![0u8; PAGE_SIZE];
/// let mut page = HeapPage::new(&mut data[..]);
/// page.init();
///
/// let slot_id = page.insert(b"hello world").unwrap();
/// assert_eq!(page.read(slot_id), Some(b"hello world".as_slice()));
/// ```
pub struct HeapPage<T> {
    data: T,
}

impl<T: AsRef<[u8]>> HeapPage<T> {
    /// Creates a new HeapPage view over the given data.
    ///
    /// # Panics
    ///
    /// Panics if `data.as_ref().len() != PAGE_SIZE`.
    pub fn new(data: T) -> Self {
        assert_eq!(
            data.as_ref().len(),
            PAGE_SIZE,
            "HeapPage requires exactly {} bytes, got {}",
            PAGE_SIZE,
            data.as_ref().len()
        );
        Self { data }
    }

    fn data(&self) -> &[u8] {
        self.data.as_ref()
    }

    /// Returns the page header.
    pub(crate) fn header(&self) -> PageHeader {
        PageHeader::read_from(&self.data()[..PAGE_HEADER_SIZE])
    }

    fn get_slot(&self, slot_id: SlotId) -> SlotEntry {
        let offset = PAGE_HEADER_SIZE + (slot_id as usize) * SLOT_SIZE;
        SlotEntry::read_from(&self.data()[offset..offset + SLOT_SIZE])
    }

    /// Returns the contiguous free space available for new records.
    pub fn free_space(&self) -> usize {
        self.header().free_space() as usize
    }

    /// Checks if a record of given size (plus its slot) can be inserted.
    pub fn can_insert(&self, record_size: usize) -> bool {
        self.free_space() >= record_size + SLOT_SIZE
    }

    /// Returns the number of slots in use.
    pub fn slot_count(&self) -> SlotId {
        self.header().slot_count
    }

    /// Reads a record by slot ID.
    ///
    /// Returns `None` if the slot is out of bounds.
    pub fn read(&self, slot_id: SlotId) -> Option<&[u8]> {
        if slot_id >= self.slot_count() {
            return None;
        }

        let slot = self.get_slot(slot_id);
        let start = slot.offset as usize;
        let end = start + slot.length as usize;
        self.data().get(start..end)
    }

    /// Returns an iterator over all records in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &[u8])> {
        (0..self.slot_count()).filter_map(move |slot_id| self.read(slot_id).map(|data| (slot_id, data)))
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> HeapPage<T> {
    fn data_mut(&mut self) -> &mut [u8] {
        self.data.as_mut()
    }

    /// Initializes this page as a new empty heap page.
    pub fn init(&mut self) {
        self.data_mut().fill(0);
        PageHeader::new_heap_page().write_to(&mut self.data_mut()[..PAGE_HEADER_SIZE]);
    }

    fn set_header(&mut self, header: &PageHeader) {
        header.write_to(&mut self.data_mut()[..PAGE_HEADER_SIZE]);
    }

    fn set_slot(&mut self, slot_id: SlotId, entry: &SlotEntry) {
        let offset = PAGE_HEADER_SIZE + (slot_id as usize) * SLOT_SIZE;
        entry.write_to(&mut self.data_mut()[offset..offset + SLOT_SIZE]);
    }

    /// Appends a record and returns its slot ID.
    ///
    /// # Errors
    ///
    /// Returns `HeapError::RecordTooLarge` if the record can never fit on a
    /// page, `HeapError::PageFull` if it does not fit on this one.
    pub fn insert(&mut self, record_data: &[u8]) -> Result<SlotId, HeapError> {
        let record_size = record_data.len();
        if record_size > MAX_RECORD_SIZE {
            return Err(HeapError::RecordTooLarge {
                size: record_size,
                max: MAX_RECORD_SIZE,
            });
        }
        if !self.can_insert(record_size) {
            return Err(HeapError::PageFull {
                required: record_size + SLOT_SIZE,
                available: self.free_space(),
            });
        }

        let mut header = self.header();
        let slot_id = header.slot_count;
        header.slot_count += 1;
        header.free_start += SLOT_SIZE as u16;

        // Records grow upward from the bottom of the page.
        header.free_end -= record_size as u16;
        let record_offset = header.free_end;

        let start = record_offset as usize;
        self.data_mut()[start..start + record_size].copy_from_slice(record_data);
        self.set_slot(slot_id, &SlotEntry::new(record_offset, record_size as u16));
        self.set_header(&header);

        Ok(slot_id)
    }
}
