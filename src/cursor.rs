//! Bounds checked sequential reads over a byte buffer.
//!
//! Every read either consumes exactly the bytes it needs or fails and
//! leaves the cursor where it was.

use crate::util::get_split;
use std::borrow::Cow;
use std::fmt;

const MAX_VARINT_LEN: usize = 10;

#[inline]
fn eof(needed: usize, data: &[u8]) -> CursorErrorKind {
    CursorErrorKind::Eof {
        needed,
        remaining: data.len(),
    }
}

#[inline]
pub(crate) fn read_u8(data: &[u8]) -> Result<(u8, &[u8]), CursorErrorKind> {
    let (&first, rest) = data.split_first().ok_or_else(|| eof(1, data))?;
    Ok((first, rest))
}

#[inline]
pub(crate) fn read_u16(data: &[u8]) -> Result<(u16, &[u8]), CursorErrorKind> {
    let (head, rest) = get_split::<2>(data).ok_or_else(|| eof(2, data))?;
    Ok((u16::from_le_bytes(head), rest))
}

#[inline]
pub(crate) fn read_u32(data: &[u8]) -> Result<(u32, &[u8]), CursorErrorKind> {
    let (head, rest) = get_split::<4>(data).ok_or_else(|| eof(4, data))?;
    Ok((u32::from_le_bytes(head), rest))
}

#[inline]
pub(crate) fn read_i32(data: &[u8]) -> Result<(i32, &[u8]), CursorErrorKind> {
    let (head, rest) = get_split::<4>(data).ok_or_else(|| eof(4, data))?;
    Ok((i32::from_le_bytes(head), rest))
}

#[inline]
pub(crate) fn read_i64(data: &[u8]) -> Result<(i64, &[u8]), CursorErrorKind> {
    let (head, rest) = get_split::<8>(data).ok_or_else(|| eof(8, data))?;
    Ok((i64::from_le_bytes(head), rest))
}

#[inline]
pub(crate) fn read_f32(data: &[u8]) -> Result<(f32, &[u8]), CursorErrorKind> {
    let (head, rest) = get_split::<4>(data).ok_or_else(|| eof(4, data))?;
    Ok((f32::from_le_bytes(head), rest))
}

#[inline]
pub(crate) fn read_f64(data: &[u8]) -> Result<(f64, &[u8]), CursorErrorKind> {
    let (head, rest) = get_split::<8>(data).ok_or_else(|| eof(8, data))?;
    Ok((f64::from_le_bytes(head), rest))
}

/// Unsigned LEB128
#[inline]
pub(crate) fn read_varint(data: &[u8]) -> Result<(u64, &[u8]), CursorErrorKind> {
    let mut result = 0u64;
    for (i, &byte) in data.iter().take(MAX_VARINT_LEN).enumerate() {
        if i == MAX_VARINT_LEN - 1 && byte > 1 {
            return Err(CursorErrorKind::VarintOverflow);
        }

        result |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok((result, &data[i + 1..]));
        }
    }

    if data.len() >= MAX_VARINT_LEN {
        Err(CursorErrorKind::VarintOverflow)
    } else {
        Err(eof(data.len() + 1, data))
    }
}

#[inline]
pub(crate) fn read_bytes(data: &[u8], len: usize) -> Result<(&[u8], &[u8]), CursorErrorKind> {
    if len <= data.len() {
        Ok(data.split_at(len))
    } else {
        Err(eof(len, data))
    }
}

#[inline]
pub(crate) fn read_len_prefixed(data: &[u8]) -> Result<(&[u8], &[u8]), CursorErrorKind> {
    let (len, rest) = read_varint(data)?;
    let len = usize::try_from(len).unwrap_or(usize::MAX);
    read_bytes(rest, len)
}

/// The reason a cursor read failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorErrorKind {
    /// Fewer bytes remain than the read needs
    Eof { needed: usize, remaining: usize },

    /// A varint did not terminate within 10 bytes
    VarintOverflow,
}

impl CursorErrorKind {
    #[inline]
    #[must_use]
    pub fn at(self, position: usize) -> CursorError {
        CursorError {
            position,
            kind: self,
        }
    }
}

impl std::error::Error for CursorErrorKind {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

impl fmt::Display for CursorErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            CursorErrorKind::Eof { .. } => write!(f, "unexpected end of file"),
            CursorErrorKind::VarintOverflow => write!(f, "varint overflow"),
        }
    }
}

/// A failed read and where the cursor was when it failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorError {
    position: usize,
    kind: CursorErrorKind,
}

impl CursorError {
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn kind(&self) -> &CursorErrorKind {
        &self.kind
    }

    pub fn into_kind(self) -> CursorErrorKind {
        self.kind
    }
}

impl std::error::Error for CursorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

impl fmt::Display for CursorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            CursorErrorKind::Eof { needed, remaining } => write!(
                f,
                "not enough data to read {} bytes at {} ({} remaining)",
                needed, self.position, remaining
            ),
            CursorErrorKind::VarintOverflow => {
                write!(f, "varint overflow at {}", self.position)
            }
        }
    }
}

/// Sequential reader over a borrowed byte buffer.
///
/// ```
/// use raidsave::ByteCursor;
///
/// let mut cursor = ByteCursor::new(&[0x2a, 0x00, 0x00, 0x80, 0x3f]);
/// assert_eq!(cursor.read_u8().unwrap(), 42);
/// assert_eq!(cursor.read_f32().unwrap(), 1.0);
/// assert!(cursor.read_u8().is_err());
/// assert_eq!(cursor.position(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    original_length: usize,
}

impl<'a> ByteCursor<'a> {
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            original_length: data.len(),
        }
    }

    /// The bytes that have yet to be read
    #[inline]
    pub fn remainder(&self) -> &'a [u8] {
        self.data
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.original_length - self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    fn err_position(&self, err: CursorErrorKind) -> CursorError {
        err.at(self.position())
    }

    #[inline]
    pub fn peek_u8(&self) -> Option<u8> {
        self.data.first().copied()
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, CursorError> {
        let (result, rest) = read_u8(self.data).map_err(|e| self.err_position(e))?;
        self.data = rest;
        Ok(result)
    }

    #[inline]
    pub fn read_u16(&mut self) -> Result<u16, CursorError> {
        let (result, rest) = read_u16(self.data).map_err(|e| self.err_position(e))?;
        self.data = rest;
        Ok(result)
    }

    #[inline]
    pub fn read_u32(&mut self) -> Result<u32, CursorError> {
        let (result, rest) = read_u32(self.data).map_err(|e| self.err_position(e))?;
        self.data = rest;
        Ok(result)
    }

    #[inline]
    pub fn read_i32(&mut self) -> Result<i32, CursorError> {
        let (result, rest) = read_i32(self.data).map_err(|e| self.err_position(e))?;
        self.data = rest;
        Ok(result)
    }

    #[inline]
    pub fn read_i64(&mut self) -> Result<i64, CursorError> {
        let (result, rest) = read_i64(self.data).map_err(|e| self.err_position(e))?;
        self.data = rest;
        Ok(result)
    }

    #[inline]
    pub fn read_f32(&mut self) -> Result<f32, CursorError> {
        let (result, rest) = read_f32(self.data).map_err(|e| self.err_position(e))?;
        self.data = rest;
        Ok(result)
    }

    #[inline]
    pub fn read_f64(&mut self) -> Result<f64, CursorError> {
        let (result, rest) = read_f64(self.data).map_err(|e| self.err_position(e))?;
        self.data = rest;
        Ok(result)
    }

    #[inline]
    pub fn read_varint(&mut self) -> Result<u64, CursorError> {
        let (result, rest) = read_varint(self.data).map_err(|e| self.err_position(e))?;
        self.data = rest;
        Ok(result)
    }

    #[inline]
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], CursorError> {
        let (result, rest) = read_bytes(self.data, len).map_err(|e| self.err_position(e))?;
        self.data = rest;
        Ok(result)
    }

    /// Reads a varint length followed by that many bytes
    #[inline]
    pub fn read_len_prefixed(&mut self) -> Result<&'a [u8], CursorError> {
        let (result, rest) = read_len_prefixed(self.data).map_err(|e| self.err_position(e))?;
        self.data = rest;
        Ok(result)
    }

    /// Reads a length prefixed string. Invalid UTF-8 is replaced rather
    /// than rejected.
    #[inline]
    pub fn read_str(&mut self) -> Result<Cow<'a, str>, CursorError> {
        self.read_len_prefixed().map(String::from_utf8_lossy)
    }
}
