use std::fmt;

/// One level of the path that was being processed when a record failed to
/// decode or encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// A named field of a record
    Field {
        record: &'static str,
        field: &'static str,
        offset: usize,
    },

    /// An element of a sequence
    Element { index: usize, offset: usize },

    /// The length prefix of a sequence or text
    Length { offset: usize },

    /// First half of a pair
    Left { offset: usize },

    /// Second half of a pair
    Right { offset: usize },
}

impl Frame {
    /// Byte offset where this level started
    pub fn offset(&self) -> usize {
        match *self {
            Frame::Field { offset, .. }
            | Frame::Element { offset, .. }
            | Frame::Length { offset }
            | Frame::Left { offset }
            | Frame::Right { offset } => offset,
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Frame::Field {
                record,
                field,
                offset,
            } => write!(f, "field {}.{} at 0x{:X}", record, field, offset),
            Frame::Element { index, offset } => write!(f, "element {} at 0x{:X}", index, offset),
            Frame::Length { offset } => write!(f, "length at 0x{:X}", offset),
            Frame::Left { offset } => write!(f, "left side at 0x{:X}", offset),
            Frame::Right { offset } => write!(f, "right side at 0x{:X}", offset),
        }
    }
}

/// Specific reason a record could not be decoded or encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordErrorKind {
    /// The buffer ended before a value, or the elements a sequence count
    /// promises, could fit
    Truncated { needed: usize, available: usize },

    /// Text that is not valid UTF-8
    InvalidText,

    /// A length prefix that is negative or not an integer
    InvalidLength { length: i128 },

    /// An integer codec declared with a width outside of 1 to 8 bytes
    InvalidWidth { width: usize },

    /// An integer that does not fit in its field's width
    OutOfRange { value: i128, width: usize },

    /// A value of the wrong shape for its codec
    Mismatch { expected: &'static str },

    /// A field the schema requires is absent from the record
    MissingField,
}

/// An error decoding or encoding a record, with the trail of fields that
/// were being processed.
///
/// The trail is ordered innermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordError {
    kind: RecordErrorKind,
    offset: usize,
    trail: Vec<Frame>,
}

impl RecordError {
    #[inline]
    pub(crate) fn new(kind: RecordErrorKind, offset: usize) -> Self {
        RecordError {
            kind,
            offset,
            trail: Vec::new(),
        }
    }

    /// Record that the error happened while processing `frame`
    #[inline]
    #[must_use]
    pub(crate) fn within(mut self, frame: Frame) -> Self {
        self.trail.push(frame);
        self
    }

    pub fn kind(&self) -> &RecordErrorKind {
        &self.kind
    }

    /// Byte offset where the failure was detected
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn trail(&self) -> &[Frame] {
        &self.trail
    }

    /// Dotted path of the field names in the trail, outermost first
    ///
    /// Sequence elements are rendered as indices.
    pub fn path(&self) -> String {
        let mut out = String::new();
        for frame in self.trail.iter().rev() {
            match frame {
                Frame::Field { field, .. } => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(field);
                }
                Frame::Element { index, .. } => {
                    out.push('[');
                    out.push_str(&index.to_string());
                    out.push(']');
                }
                Frame::Length { .. } | Frame::Left { .. } | Frame::Right { .. } => {}
            }
        }
        out
    }
}

impl std::error::Error for RecordError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            RecordErrorKind::Truncated { needed, available } => write!(
                f,
                "needed {} bytes but only {} remain at 0x{:X}",
                needed, available, self.offset
            )?,
            RecordErrorKind::InvalidText => write!(f, "invalid utf-8 text at 0x{:X}", self.offset)?,
            RecordErrorKind::InvalidLength { length } => {
                write!(f, "invalid length {} at 0x{:X}", length, self.offset)?
            }
            RecordErrorKind::InvalidWidth { width } => {
                write!(f, "unsupported integer width of {} bytes at 0x{:X}", width, self.offset)?
            }
            RecordErrorKind::OutOfRange { value, width } => write!(
                f,
                "{} does not fit in {} bytes at 0x{:X}",
                value, width, self.offset
            )?,
            RecordErrorKind::Mismatch { expected } => {
                write!(f, "expected {} at 0x{:X}", expected, self.offset)?
            }
            RecordErrorKind::MissingField => write!(f, "missing field at 0x{:X}", self.offset)?,
        }

        for frame in &self.trail {
            write!(f, "\n  while processing {}", frame)?;
        }

        Ok(())
    }
}
