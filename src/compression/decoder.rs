use super::{CompressionError, CompressionErrorKind};
use crate::{util::le_uint, varint::read_varint};
use std::ops::{Bound, RangeBounds};

const TAG_LITERAL: u8 = 0b00;
const TAG_COPY_1: u8 = 0b01;
const TAG_COPY_2: u8 = 0b10;

/// On demand expansion of a snappy compressed stream.
///
/// Nothing is decompressed at construction beyond the length preamble. Each
/// request decodes chunks only until the requested amount of output exists,
/// and later requests resume from where the previous one stopped. The
/// identity of a schematic, for instance, lives in the first 8 bytes and can
/// be read without expanding the rest of the file.
///
/// ```rust
/// use tcsave::compression::{compress_literal, Decompressor};
/// let stream = compress_literal(b"hello world");
/// let mut decompressor = Decompressor::new(&stream)?;
/// assert_eq!(decompressor.uncompressed_len(), 11);
/// assert_eq!(decompressor.slice(..5)?, b"hello");
/// assert_eq!(decompressor.byte(6)?, b'w');
/// assert_eq!(decompressor.slice(6..100)?, b"world");
/// # Ok::<(), tcsave::compression::CompressionError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Decompressor<'a> {
    input: &'a [u8],
    position: usize,
    declared: usize,
    output: Vec<u8>,
}

impl<'a> Decompressor<'a> {
    /// Read the uncompressed length preamble of a stream
    pub fn new(input: &'a [u8]) -> Result<Self, CompressionError> {
        let (declared, position) =
            read_varint(input, 0).ok_or(CompressionErrorKind::InvalidHeader.at(0))?;
        let declared =
            usize::try_from(declared).map_err(|_| CompressionErrorKind::InvalidHeader.at(0))?;

        // Don't trust the preamble for the allocation. Snappy never expands
        // more than a copy of 64 bytes per 2 input bytes.
        let capacity = declared.min(input.len().saturating_mul(32));
        Ok(Decompressor {
            input,
            position,
            declared,
            output: Vec::with_capacity(capacity),
        })
    }

    /// The length the stream claims to expand to
    #[inline]
    pub fn uncompressed_len(&self) -> usize {
        self.declared
    }

    /// Number of compressed input bytes consumed so far, preamble included
    #[inline]
    pub fn consumed(&self) -> usize {
        self.position
    }

    /// The output produced so far
    #[inline]
    pub fn decompressed(&self) -> &[u8] {
        &self.output
    }

    /// Returns true once every chunk of the input has been decoded
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Expand until at least `len` bytes of output exist (clamped to the
    /// declared length) and return the output produced so far.
    pub fn fill_to(&mut self, len: usize) -> Result<&[u8], CompressionError> {
        let len = len.min(self.declared);
        while self.output.len() < len && !self.is_exhausted() {
            self.decode_chunk()?;
        }

        if self.output.len() < len {
            return Err(CompressionErrorKind::UnexpectedEof {
                needed: len,
                available: self.output.len(),
            }
            .at(self.position));
        }

        Ok(&self.output)
    }

    /// Return a single decompressed byte
    pub fn byte(&mut self, index: usize) -> Result<u8, CompressionError> {
        if index >= self.declared {
            return Err(CompressionErrorKind::UnexpectedEof {
                needed: index.saturating_add(1),
                available: self.declared,
            }
            .at(self.position));
        }

        let data = self.fill_to(index + 1)?;
        Ok(data[index])
    }

    /// Return a range of decompressed data. Both bounds are clamped to the
    /// declared length, so a range that starts past the end is empty.
    pub fn slice<R>(&mut self, range: R) -> Result<&[u8], CompressionError>
    where
        R: RangeBounds<usize>,
    {
        let start = match range.start_bound() {
            Bound::Included(&x) => x,
            Bound::Excluded(&x) => x.saturating_add(1),
            Bound::Unbounded => 0,
        };

        let end = match range.end_bound() {
            Bound::Included(&x) => x.saturating_add(1),
            Bound::Excluded(&x) => x,
            Bound::Unbounded => self.declared,
        };

        let end = end.min(self.declared);
        let start = start.min(end);
        let data = self.fill_to(end)?;
        Ok(&data[start..end])
    }

    /// Expand the entire stream and take ownership of the output.
    ///
    /// Trailing chunks past the declared length are an error, as is a stream
    /// that ends short of it.
    pub fn into_vec(mut self) -> Result<Vec<u8>, CompressionError> {
        self.fill_to(self.declared)?;
        if !self.is_exhausted() {
            return Err(CompressionErrorKind::Overrun {
                declared: self.declared,
            }
            .at(self.position));
        }
        Ok(self.output)
    }

    fn decode_chunk(&mut self) -> Result<(), CompressionError> {
        let start = self.position;
        let tag = self.input[start];
        self.position += 1;
        let (offset_width, length) = match tag & 0b11 {
            TAG_LITERAL => return self.decode_literal(tag, start),
            TAG_COPY_1 => (1, usize::from((tag >> 2) & 0b111) + 4),
            TAG_COPY_2 => (2, usize::from(tag >> 2) + 1),
            _ => (4, usize::from(tag >> 2) + 1),
        };

        let offset = self.take(offset_width).ok_or_else(|| {
            CompressionErrorKind::UnexpectedEof {
                needed: self.output.len() + length,
                available: self.output.len(),
            }
            .at(start)
        })?;

        let offset = if tag & 0b11 == TAG_COPY_1 {
            (usize::from(tag & 0b1110_0000) << 3) | offset
        } else {
            offset
        };

        self.copy(offset, length, start)
    }

    fn decode_literal(&mut self, tag: u8, start: usize) -> Result<(), CompressionError> {
        let length = usize::from(tag >> 2);
        let length = if length >= 60 {
            self.take(length - 59)
                .ok_or(CompressionErrorKind::InvalidLiteral.at(start))?
        } else {
            length
        };

        let length = length
            .checked_add(1)
            .ok_or(CompressionErrorKind::InvalidLiteral.at(start))?;

        let end = self
            .position
            .checked_add(length)
            .filter(|&end| end <= self.input.len())
            .ok_or(CompressionErrorKind::InvalidLiteral.at(start))?;

        self.reserve(length, start)?;
        self.output.extend_from_slice(&self.input[self.position..end]);
        self.position = end;
        Ok(())
    }

    fn copy(&mut self, offset: usize, length: usize, start: usize) -> Result<(), CompressionError> {
        let available = self.output.len();
        if offset == 0 || offset > available {
            return Err(CompressionErrorKind::InvalidOffset { offset, available }.at(start));
        }

        self.reserve(length, start)?;

        // The source may overlap what is being written when offset < length,
        // so bytes must be appended one at a time.
        let source = available - offset;
        for i in 0..length {
            let byte = self.output[source + i];
            self.output.push(byte);
        }
        Ok(())
    }

    /// Read a little endian integer of `width` bytes from the input
    fn take(&mut self, width: usize) -> Option<usize> {
        let bytes = self.input.get(self.position..self.position + width)?;
        self.position += width;
        usize::try_from(le_uint(bytes)).ok()
    }

    fn reserve(&self, length: usize, start: usize) -> Result<(), CompressionError> {
        match self.output.len().checked_add(length) {
            Some(end) if end <= self.declared => Ok(()),
            _ => Err(CompressionErrorKind::Overrun {
                declared: self.declared,
            }
            .at(start)),
        }
    }
}
