use std::{fmt::Debug, ops::Deref, sync::Arc};

use crate::ColumnarError;

#[derive(Clone)]
enum Repr<'a> {
    Borrowed(&'a [u8]),
    Shared(Arc<[u8]>),
}

/// An immutable byte region backing one part of a column.
///
/// A buffer either borrows memory owned by someone else (the zero-copy case,
/// tied to `'a`) or shares an owned allocation behind an [Arc], so cloning a
/// column never copies its payload.
#[derive(Clone)]
pub struct Buffer<'a> {
    repr: Repr<'a>,
}

impl<'a> Buffer<'a> {
    pub fn borrowed(bytes: &'a [u8]) -> Self {
        Self {
            repr: Repr::Borrowed(bytes),
        }
    }

    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self {
            repr: Repr::Shared(Arc::from(bytes)),
        }
    }

    pub fn empty() -> Self {
        Self::borrowed(&[])
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        match &self.repr {
            Repr::Borrowed(bytes) => bytes,
            Repr::Shared(bytes) => bytes,
        }
    }

    /// Whether this buffer aliases memory it does not own.
    pub fn is_borrowed(&self) -> bool {
        matches!(self.repr, Repr::Borrowed(_))
    }

    /// Copies borrowed bytes so the buffer no longer depends on `'a`.
    pub fn into_owned(self) -> Buffer<'static> {
        match self.repr {
            Repr::Borrowed(bytes) => Buffer::from_vec(bytes.to_vec()),
            Repr::Shared(bytes) => Buffer {
                repr: Repr::Shared(bytes),
            },
        }
    }

    /// Reads the `index`-th `N`-byte little-endian chunk.
    #[inline]
    pub(crate) fn chunk<const N: usize>(&self, index: usize) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.as_slice()[index * N..(index + 1) * N]);
        out
    }

    #[inline]
    pub(crate) fn u32_at(&self, index: usize) -> u32 {
        u32::from_le_bytes(self.chunk(index))
    }
}

impl Deref for Buffer<'_> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl PartialEq for Buffer<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for Buffer<'_> {}

impl Debug for Buffer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("len", &self.len())
            .field("borrowed", &self.is_borrowed())
            .finish()
    }
}

impl From<Vec<u8>> for Buffer<'_> {
    fn from(bytes: Vec<u8>) -> Self {
        Buffer::from_vec(bytes)
    }
}

impl<'a> From<&'a [u8]> for Buffer<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Buffer::borrowed(bytes)
    }
}

/// Validity bitmap, LSB first, a set bit marks a valid (non-null) row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap<'a> {
    bits: Buffer<'a>,
    len: usize,
}

impl<'a> Bitmap<'a> {
    pub fn try_new(bits: Buffer<'a>, len: usize) -> Result<Self, ColumnarError> {
        let expected = len.div_ceil(8);
        if bits.len() < expected {
            return Err(ColumnarError::InvalidColumn(format!(
                "validity bitmap too short: expected at least {} bytes, got {}",
                expected,
                bits.len()
            )));
        }
        Ok(Self { bits, len })
    }

    /// Panics when `index` is out of bounds.
    #[inline]
    pub fn is_set(&self, index: usize) -> bool {
        assert!(
            index < self.len,
            "bit index {} out of bounds for bitmap of length {}",
            index,
            self.len
        );
        (self.bits[index / 8] >> (index % 8)) & 1 == 1
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn buffer(&self) -> &Buffer<'a> {
        &self.bits
    }

    /// Number of unset bits among the first `len` bits.
    pub fn count_unset(&self) -> usize {
        let full = self.len / 8;
        let mut set: usize = self.bits[..full]
            .iter()
            .map(|b| b.count_ones() as usize)
            .sum();
        let rest = self.len % 8;
        if rest > 0 {
            let mask = (1u8 << rest) - 1;
            set += (self.bits[full] & mask).count_ones() as usize;
        }
        self.len - set
    }

    pub fn into_owned(self) -> Bitmap<'static> {
        Bitmap {
            bits: self.bits.into_owned(),
            len: self.len,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub(crate) struct BitmapBuilder {
    bytes: Vec<u8>,
    len: usize,
}

impl BitmapBuilder {
    pub(crate) fn with_capacity(bits: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bits.div_ceil(8)),
            len: 0,
        }
    }

    #[inline]
    pub(crate) fn push(&mut self, value: bool) {
        if self.len % 8 == 0 {
            self.bytes.push(0);
        }
        if value {
            let last = self.bytes.len() - 1;
            self.bytes[last] |= 1 << (self.len % 8);
        }
        self.len += 1;
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub(crate) fn finish(self) -> Bitmap<'static> {
        Bitmap {
            len: self.len,
            bits: Buffer::from_vec(self.bytes),
        }
    }
}
