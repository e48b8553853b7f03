use std::fmt;

/// The specific reason a compressed stream could not be expanded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionErrorKind {
    /// The uncompressed length preamble is missing or does not fit in 64 bits
    InvalidHeader,

    /// A literal chunk whose length bytes or payload run past the end of input
    InvalidLiteral,

    /// A copy chunk that references data before the start of the output
    InvalidOffset { offset: usize, available: usize },

    /// The stream produced more data than its preamble declared
    Overrun { declared: usize },

    /// The stream ended (or the caller asked for more) before `needed` bytes
    /// were available
    UnexpectedEof { needed: usize, available: usize },
}

impl CompressionErrorKind {
    #[inline]
    #[must_use]
    pub fn at(self, position: usize) -> CompressionError {
        CompressionError {
            position,
            kind: self,
        }
    }
}

/// A compressed stream failed to decode at a given input position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionError {
    position: usize,
    kind: CompressionErrorKind,
}

impl CompressionError {
    /// Position in the compressed input of the chunk that failed
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn kind(&self) -> &CompressionErrorKind {
        &self.kind
    }

    #[must_use]
    pub fn into_kind(self) -> CompressionErrorKind {
        self.kind
    }
}

impl std::error::Error for CompressionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

impl fmt::Display for CompressionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            CompressionErrorKind::InvalidHeader => {
                write!(f, "invalid uncompressed length preamble")
            }
            CompressionErrorKind::InvalidLiteral => write!(
                f,
                "literal chunk extends past end of input at position: {}",
                self.position
            ),
            CompressionErrorKind::InvalidOffset { offset, available } => write!(
                f,
                "copy offset {} exceeds the {} bytes decompressed so far at position: {}",
                offset, available, self.position
            ),
            CompressionErrorKind::Overrun { declared } => write!(
                f,
                "chunk at position {} expands past the declared length of {} bytes",
                self.position, declared
            ),
            CompressionErrorKind::UnexpectedEof { needed, available } => write!(
                f,
                "needed {} decompressed bytes but the stream ended with {} at position: {}",
                needed, available, self.position
            ),
        }
    }
}
