/// Sequential reader over an in-memory byte buffer
///
/// All multi-byte fields in the supported formats are little-endian.
/// Every read is bounds-checked: a read past the end of the buffer is a
/// hard `UnexpectedEndOfInput` error, never silent truncation.

use crate::error::{Result, SadError};

/// A fixed-format binary reader that advances through a borrowed buffer
#[derive(Debug)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Create a cursor at the start of a buffer
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current read offset in bytes
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of bytes left to read
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// True once every byte has been consumed
    pub fn is_at_end(&self) -> bool {
        self.pos == self.buf.len()
    }

    /// Read a fixed-length block of bytes
    pub fn bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(SadError::UnexpectedEndOfInput {
                offset: self.pos,
                wanted: len - self.remaining(),
            });
        }
        let block = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(block)
    }

    /// Read an unsigned 8-bit value
    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.bytes(1)?[0])
    }

    /// Read an unsigned 16-bit little-endian value
    pub fn u16_le(&mut self) -> Result<u16> {
        let b = self.bytes(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_advance_position() {
        let mut cursor = Cursor::new(&[0x01, 0x34, 0x12, 0xAA, 0xBB]);

        assert_eq!(cursor.u8().unwrap(), 0x01);
        assert_eq!(cursor.position(), 1);

        assert_eq!(cursor.u16_le().unwrap(), 0x1234);
        assert_eq!(cursor.position(), 3);

        assert_eq!(cursor.bytes(2).unwrap(), &[0xAA, 0xBB]);
        assert!(cursor.is_at_end());
    }

    #[test]
    fn test_underrun_reports_offset_and_shortfall() {
        let mut cursor = Cursor::new(&[0x01, 0x02]);
        cursor.u8().unwrap();

        let err = cursor.bytes(4).unwrap_err();
        assert!(matches!(
            err,
            SadError::UnexpectedEndOfInput {
                offset: 1,
                wanted: 3
            }
        ));

        // A failed read must not move the cursor
        assert_eq!(cursor.position(), 1);
        assert_eq!(cursor.u8().unwrap(), 0x02);
    }

    #[test]
    fn test_u16_underrun() {
        let mut cursor = Cursor::new(&[0x01]);
        assert!(matches!(
            cursor.u16_le(),
            Err(SadError::UnexpectedEndOfInput { offset: 0, wanted: 1 })
        ));
    }

    #[test]
    fn test_empty_buffer() {
        let mut cursor = Cursor::new(&[]);
        assert!(cursor.is_at_end());
        assert_eq!(cursor.remaining(), 0);
        assert!(cursor.u8().is_err());
    }
}
