//! Sequential heap file cursor.
//!
//! [`HeapScan`] walks the pages of a [`HeapFile`] in chain order and copies
//! each tuple into a caller-owned staging buffer. The current page is kept in
//! a private page buffer, so consecutive reads from one page cost a single
//! page read.

use super::file::HeapFile;
use super::page::{HeapPage, RecordId, SlotId};
use crate::relation::Cursor;
use crate::storage::{PAGE_SIZE, Storage, StorageError};

/// Forward, repositionable cursor over a heap file.
pub struct HeapScan<'a, S: Storage> {
    file: &'a HeapFile<S>,
    /// Scan position of the page holding the next tuple.
    page_idx: usize,
    /// Slot of the next tuple on that page.
    slot_id: SlotId,
    page: Box<[u8; PAGE_SIZE]>,
    /// Scan position of the page currently held in `page`.
    loaded: Option<usize>,
}

impl<'a, S: Storage> HeapScan<'a, S> {
    pub(crate) fn new(file: &'a HeapFile<S>) -> Self {
        Self {
            file,
            page_idx: 0,
            slot_id: 0,
            page: Box::new([0u8; PAGE_SIZE]),
            loaded: None,
        }
    }

    fn load(&mut self) -> Result<(), StorageError> {
        if self.loaded != Some(self.page_idx) {
            self.loaded = None;
            self.file.read_page_at(self.page_idx, &mut self.page[..])?;
            self.loaded = Some(self.page_idx);
        }
        Ok(())
    }
}

impl<S: Storage> Cursor for HeapScan<'_, S> {
    fn read_next(&mut self, buf: &mut [u8]) -> Result<Option<RecordId>, StorageError> {
        while self.page_idx < self.file.page_ids().len() {
            self.load()?;

            let page = HeapPage::new(&self.page[..]);
            if let Some(record) = page.read(self.slot_id) {
                if record.len() != buf.len() {
                    return Err(StorageError::TupleLengthMismatch {
                        expected: buf.len(),
                        actual: record.len(),
                    });
                }
                buf.copy_from_slice(record);

                let rid = RecordId::new(self.file.page_ids()[self.page_idx], self.slot_id);
                self.slot_id += 1;
                return Ok(Some(rid));
            }

            // Slots are dense, so the first missing slot ends the page.
            self.page_idx += 1;
            self.slot_id = 0;
        }
        Ok(None)
    }

    fn move_to(&mut self, rid: RecordId) -> Result<(), StorageError> {
        let page_idx = self
            .file
            .position(rid.page_id)
            .ok_or(StorageError::RecordNotFound(rid))?;

        self.page_idx = page_idx;
        self.slot_id = rid.slot_id;
        self.load()?;

        if HeapPage::new(&self.page[..]).read(rid.slot_id).is_none() {
            return Err(StorageError::RecordNotFound(rid));
        }
        Ok(())
    }

    fn rewind(&mut self) -> Result<(), StorageError> {
        self.page_idx = 0;
        self.slot_id = 0;
        Ok(())
    }
}
