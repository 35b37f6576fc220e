//! Bounds-checked access to the join attribute.

use super::error::JoinError;

/// Width of the join attribute in bytes.
pub const KEY_SIZE: usize = 4;

/// Shape of the tuples of one join input: their fixed length and where the
/// 4-byte little-endian join attribute sits.
///
/// The bounds are checked once in [`TupleLayout::new`]; reads through
/// [`TupleLayout::key`] can then never leave the tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TupleLayout {
    tuple_len: usize,
    key_offset: usize,
}

impl TupleLayout {
    /// Creates a layout for tuples of `tuple_len` bytes keyed at `key_offset`.
    ///
    /// # Errors
    ///
    /// Returns `JoinError::InvalidLayout` if `key_offset + 4 > tuple_len`.
    pub fn new(tuple_len: usize, key_offset: usize) -> Result<Self, JoinError> {
        match key_offset.checked_add(KEY_SIZE) {
            Some(end) if end <= tuple_len => Ok(Self {
                tuple_len,
                key_offset,
            }),
            _ => Err(JoinError::InvalidLayout {
                tuple_len,
                key_offset,
            }),
        }
    }

    pub fn tuple_len(&self) -> usize {
        self.tuple_len
    }

    pub fn key_offset(&self) -> usize {
        self.key_offset
    }

    /// Reads the join attribute of `tuple`.
    ///
    /// # Panics
    ///
    /// Panics if `tuple` is shorter than the layout's tuple length.
    pub fn key(&self, tuple: &[u8]) -> i32 {
        debug_assert_eq!(tuple.len(), self.tuple_len);
        let mut raw = [0u8; KEY_SIZE];
        raw.copy_from_slice(&tuple[self.key_offset..self.key_offset + KEY_SIZE]);
        i32::from_le_bytes(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_bounds() {
        assert!(TupleLayout::new(4, 0).is_ok());
        assert!(TupleLayout::new(12, 8).is_ok());
        assert!(matches!(
            TupleLayout::new(12, 9),
            Err(JoinError::InvalidLayout {
                tuple_len: 12,
                key_offset: 9
            })
        ));
        assert!(TupleLayout::new(3, 0).is_err());
        assert!(TupleLayout::new(8, usize::MAX).is_err());
    }

    #[test]
    fn test_key_reads_little_endian() {
        let layout = TupleLayout::new(10, 3).unwrap();
        let mut tuple = [0xffu8; 10];
        tuple[3..7].copy_from_slice(&(-123_456i32).to_le_bytes());
        assert_eq!(layout.key(&tuple), -123_456);
    }
}
