//! Stream reader for pak primitives.
//!
//! This module provides [`StreamReader`], a wrapper over any `Read + Seek`
//! source that decodes the primitive types used by pak archives: fixed-width
//! integers in a chosen byte order, variable-length quantities, and
//! length-prefixed strings.

use std::io::{self, Read, Seek, SeekFrom};

use crate::vlq::MAX_VLQ_BYTES;
use crate::{Error, Result};

/// Byte order of multi-byte values in a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Most significant byte first.
    Big,
    /// Least significant byte first.
    Little,
}

impl ByteOrder {
    /// The order used by every fixed-width integer in a pak archive.
    pub const ARCHIVE: ByteOrder = ByteOrder::Big;

    /// The byte order of the platform we are running on.
    #[inline]
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            ByteOrder::Big
        } else {
            ByteOrder::Little
        }
    }

    /// The opposite byte order.
    #[inline]
    pub const fn swapped(self) -> Self {
        match self {
            ByteOrder::Big => ByteOrder::Little,
            ByteOrder::Little => ByteOrder::Big,
        }
    }

    /// Whether bytes stored in this order must be reversed to be read natively.
    #[inline]
    pub fn needs_swap(self) -> bool {
        self != Self::native()
    }
}

/// A reader that decodes pak primitives from a seekable stream.
///
/// Every read advances the stream by exactly the number of bytes consumed.
/// When the stream ends early the read fails with [`Error::TruncatedStream`].
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use pakfs_common::{ByteOrder, StreamReader};
///
/// let data = [0x00, 0x00, 0x01, 0x02, 0x81, 0x00, 0x03, b'a', b'b', b'c'];
/// let mut reader = StreamReader::new(Cursor::new(&data[..]));
///
/// assert_eq!(reader.read_u32(ByteOrder::Big).unwrap(), 0x0102);
/// assert_eq!(reader.read_var_u64().unwrap(), 128);
/// assert_eq!(reader.read_string().unwrap(), "abc");
/// ```
#[derive(Debug)]
pub struct StreamReader<R> {
    inner: R,
}

impl<R> StreamReader<R> {
    /// Wrap a stream. The stream position is left where the caller put it.
    #[inline]
    pub const fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Borrow the underlying stream.
    #[inline]
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    #[inline]
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Unwrap the underlying stream.
    #[inline]
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Seek> StreamReader<R> {
    /// Seek to an absolute position from the start of the stream.
    #[inline]
    pub fn seek(&mut self, position: u64) -> Result<u64> {
        Ok(self.inner.seek(SeekFrom::Start(position))?)
    }

    /// Get the current position in the stream.
    #[inline]
    pub fn position(&mut self) -> Result<u64> {
        Ok(self.inner.stream_position()?)
    }
}

impl<R: Read> StreamReader<R> {
    /// Fill `buf` completely from the stream.
    pub fn read_exact_into(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(Error::TruncatedStream {
                        needed: buf.len() as u64,
                        available: filled as u64,
                    })
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Read exactly `count` bytes.
    ///
    /// The buffer grows with the data actually read, so a corrupt length
    /// prefix cannot force a huge allocation up front.
    pub fn read_bytes(&mut self, count: u64) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        let read = self.inner.by_ref().take(count).read_to_end(&mut bytes)?;
        if (read as u64) < count {
            return Err(Error::TruncatedStream {
                needed: count,
                available: read as u64,
            });
        }
        Ok(bytes)
    }

    /// Read a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        self.read_exact_into(&mut byte)?;
        Ok(byte[0])
    }

    /// Read `N` bytes stored in `order` and return them in native order.
    ///
    /// The bytes are reversed only when `order` differs from the platform's
    /// byte order.
    #[inline]
    pub fn read_fixed<const N: usize>(&mut self, order: ByteOrder) -> Result<[u8; N]> {
        let mut bytes = [0u8; N];
        self.read_exact_into(&mut bytes)?;
        if order.needs_swap() {
            bytes.reverse();
        }
        Ok(bytes)
    }

    /// Read a u16 stored in `order`.
    #[inline]
    pub fn read_u16(&mut self, order: ByteOrder) -> Result<u16> {
        self.read_fixed(order).map(u16::from_ne_bytes)
    }

    /// Read a u32 stored in `order`.
    #[inline]
    pub fn read_u32(&mut self, order: ByteOrder) -> Result<u32> {
        self.read_fixed(order).map(u32::from_ne_bytes)
    }

    /// Read a u64 stored in `order`.
    #[inline]
    pub fn read_u64(&mut self, order: ByteOrder) -> Result<u64> {
        self.read_fixed(order).map(u64::from_ne_bytes)
    }

    /// Read an IEEE-754 double stored in `order`.
    #[inline]
    pub fn read_f64(&mut self, order: ByteOrder) -> Result<f64> {
        self.read_fixed(order).map(f64::from_ne_bytes)
    }

    /// Read an unsigned VLQ.
    ///
    /// Groups of 7 bits are accumulated most significant first; a set top bit
    /// means another byte follows. Bits beyond 64 are discarded.
    pub fn read_var_u64(&mut self) -> Result<u64> {
        let mut value: u64 = 0;
        for _ in 0..MAX_VLQ_BYTES {
            let byte = self.read_u8()?;
            value = (value << 7) | u64::from(byte & 0x7F);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(Error::MalformedVarint)
    }

    /// Read a signed VLQ. The lowest bit of the unsigned value is the sign.
    pub fn read_var_i64(&mut self) -> Result<i64> {
        let value = self.read_var_u64()?;
        let magnitude = (value >> 1) as i64;
        if value & 1 == 1 {
            Ok(-magnitude - 1)
        } else {
            Ok(magnitude)
        }
    }

    /// Read a VLQ length followed by that many bytes of text.
    ///
    /// Invalid UTF-8 sequences are replaced rather than rejected.
    pub fn read_string(&mut self) -> Result<String> {
        let length = self.read_var_u64()?;
        let bytes = self.read_bytes(length)?;
        Ok(match String::from_utf8(bytes) {
            Ok(s) => s,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::vlq;

    fn reader(data: &[u8]) -> StreamReader<Cursor<&[u8]>> {
        StreamReader::new(Cursor::new(data))
    }

    #[test]
    fn test_read_fixed_native_order_is_untouched() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let mut r = reader(&data);
        assert_eq!(r.read_fixed::<4>(ByteOrder::native()).unwrap(), data);
    }

    #[test]
    fn test_read_fixed_foreign_order_is_reversed() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let mut r = reader(&data);
        assert_eq!(
            r.read_fixed::<4>(ByteOrder::native().swapped()).unwrap(),
            [0x04, 0x03, 0x02, 0x01]
        );
    }

    #[test]
    fn test_read_archive_order_integers() {
        let data = [
            0x12, 0x34, // u16
            0x00, 0x00, 0x01, 0x00, // u32
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x2A, // u64
        ];
        let mut r = reader(&data);
        assert_eq!(r.read_u16(ByteOrder::ARCHIVE).unwrap(), 0x1234);
        assert_eq!(r.read_u32(ByteOrder::ARCHIVE).unwrap(), 256);
        assert_eq!(r.read_u64(ByteOrder::ARCHIVE).unwrap(), 42);
        assert_eq!(r.position().unwrap(), data.len() as u64);
    }

    #[test]
    fn test_read_f64() {
        let data = 1.5f64.to_be_bytes();
        let mut r = reader(&data);
        assert_eq!(r.read_f64(ByteOrder::Big).unwrap(), 1.5);
    }

    #[test]
    fn test_read_var_u64() {
        let mut r = reader(&[0x00, 0x7F, 0x81, 0x00, 0x82, 0x80, 0x01]);
        assert_eq!(r.read_var_u64().unwrap(), 0);
        assert_eq!(r.read_var_u64().unwrap(), 127);
        assert_eq!(r.read_var_u64().unwrap(), 128);
        assert_eq!(r.read_var_u64().unwrap(), (2 << 14) | 1);
    }

    #[test]
    fn test_read_var_u64_unterminated() {
        let data = [0xFF; 11];
        let mut r = reader(&data);
        assert!(matches!(r.read_var_u64(), Err(Error::MalformedVarint)));
        // Exactly the bound was consumed.
        assert_eq!(r.position().unwrap(), 10);
    }

    #[test]
    fn test_read_var_u64_truncated() {
        let mut r = reader(&[0x80, 0x80]);
        let err = r.read_var_u64().unwrap_err();
        assert!(err.is_truncated());
    }

    #[test]
    fn test_read_var_i64_sign_bit() {
        let mut r = reader(&[0x00, 0x01, 0x02, 0x03]);
        assert_eq!(r.read_var_i64().unwrap(), 0);
        assert_eq!(r.read_var_i64().unwrap(), -1);
        assert_eq!(r.read_var_i64().unwrap(), 1);
        assert_eq!(r.read_var_i64().unwrap(), -2);
    }

    #[test]
    fn test_read_string() {
        let mut data = Vec::new();
        vlq::write_string("/items/sword.item", &mut data);
        vlq::write_string("", &mut data);
        let mut r = reader(&data);
        assert_eq!(r.read_string().unwrap(), "/items/sword.item");
        assert_eq!(r.read_string().unwrap(), "");
        assert_eq!(r.position().unwrap(), data.len() as u64);
    }

    #[test]
    fn test_read_string_truncated() {
        let mut r = reader(&[0x05, b'a', b'b']);
        match r.read_string() {
            Err(Error::TruncatedStream { needed, available }) => {
                assert_eq!(needed, 5);
                assert_eq!(available, 2);
            }
            other => panic!("expected truncation, got {other:?}"),
        }
    }

    #[test]
    fn test_read_string_huge_length_does_not_allocate() {
        let mut data = Vec::new();
        vlq::write_unsigned(u64::MAX >> 4, &mut data);
        data.extend_from_slice(b"xyz");
        let mut r = reader(&data);
        assert!(r.read_string().unwrap_err().is_truncated());
    }

    #[test]
    fn test_read_fixed_truncated() {
        let mut r = reader(&[0x01, 0x02, 0x03]);
        match r.read_u32(ByteOrder::ARCHIVE) {
            Err(Error::TruncatedStream { needed, available }) => {
                assert_eq!(needed, 4);
                assert_eq!(available, 3);
            }
            other => panic!("expected truncation, got {other:?}"),
        }
    }
}
