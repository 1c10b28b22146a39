//! Bounds-checked big-endian byte access
//!
//! The disc metadata files are pointer tables: the header stores absolute
//! offsets of the sections, and records reference each other by absolute
//! position. `ByteReader` therefore exposes absolute accessors rather than a
//! cursor; every read past the end of the buffer is a `Truncated` error
//! carrying the offending offset.

use crate::error::{FormatError, Result};

#[derive(Debug, Clone, Copy)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Bytes available at and after `offset`.
    pub fn remaining(&self, offset: usize) -> usize {
        self.buf.len().saturating_sub(offset)
    }

    pub fn slice_at(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        let end = offset
            .checked_add(len)
            .ok_or(FormatError::Truncated { offset })?;
        self.buf
            .get(offset..end)
            .ok_or(FormatError::Truncated { offset })
    }

    pub fn u8_at(&self, offset: usize) -> Result<u8> {
        self.buf
            .get(offset)
            .copied()
            .ok_or(FormatError::Truncated { offset })
    }

    pub fn u16_at(&self, offset: usize) -> Result<u16> {
        let b = self.slice_at(offset, 2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn u32_at(&self, offset: usize) -> Result<u32> {
        let b = self.slice_at(offset, 4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn u64_at(&self, offset: usize) -> Result<u64> {
        let b = self.slice_at(offset, 8)?;
        Ok(u64::from_be_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    /// Reads `len` bytes as an ASCII identifier, replacing anything outside
    /// the printable range.
    pub fn ascii_at(&self, offset: usize, len: usize) -> Result<String> {
        let bytes = self.slice_at(offset, len)?;
        Ok(bytes
            .iter()
            .map(|&b| {
                if b.is_ascii_graphic() || b == b' ' {
                    b as char
                } else {
                    '\u{fffd}'
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn big_endian_reads() {
        let r = ByteReader::new(&[0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc, 0xde, 0xf0]);
        assert_eq!(r.u8_at(0).unwrap(), 0x12);
        assert_eq!(r.u16_at(0).unwrap(), 0x1234);
        assert_eq!(r.u32_at(0).unwrap(), 0x12345678);
        assert_eq!(r.u64_at(0).unwrap(), 0x123456789abcdef0);
        assert_eq!(r.u32_at(4).unwrap(), 0x9abcdef0);
    }

    #[test]
    fn out_of_range_is_truncated() {
        let r = ByteReader::new(&[0; 4]);
        assert_eq!(r.u32_at(1), Err(FormatError::Truncated { offset: 1 }));
        assert_eq!(r.u8_at(4), Err(FormatError::Truncated { offset: 4 }));
        assert!(r.u32_at(0).is_ok());
    }

    #[test]
    fn ascii_replaces_non_printable() {
        let r = ByteReader::new(b"AB\x00CD");
        assert_eq!(r.ascii_at(0, 5).unwrap(), "AB\u{fffd}CD");
    }

    #[test]
    fn remaining_counts_from_offset() {
        let r = ByteReader::new(&[0; 10]);
        assert_eq!(r.remaining(4), 6);
        assert_eq!(r.remaining(12), 0);
    }
}
