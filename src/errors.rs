use crate::{compression::CompressionError, schema::RecordError};
use std::{fmt, path::PathBuf};

/// An error that can occur when processing schematic files
#[derive(Debug)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Error {
        Error(Box::new(kind))
    }

    /// Return the specific type of error
    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }

    /// Consume self and return the specific type of error
    #[must_use]
    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }
}

/// Specific type of error
#[derive(Debug)]
pub enum ErrorKind {
    /// The file is empty and has no version byte
    Eof,

    /// The version byte is outside of the supported set
    UnsupportedVersion { version: u8 },

    /// The compressed body is corrupt
    MalformedCompression(CompressionError),

    /// The decompressed body does not match the record schema, or a record
    /// could not be encoded
    Record(RecordError),

    /// A dependency is not in the component catalog
    MissingDependency { id: u64 },

    /// A dependency list contains the id 0, which the game writes for
    /// components that are corrupt or were never saved
    CorruptDependency { parent: u64 },

    /// A component file on disk could not be identified
    InvalidComponent { path: PathBuf, source: Error },

    /// The schematic doesn't have the structure an operation expects
    UnexpectedShape(ShapeError),

    /// An IO error while writing an archive
    Io(std::io::Error),

    /// The zip writer failed
    #[cfg(feature = "archive")]
    Archive(zip::result::ZipError),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self.0 {
            ErrorKind::MalformedCompression(ref err) => Some(err),
            ErrorKind::Record(ref err) => Some(err),
            ErrorKind::InvalidComponent { ref source, .. } => Some(source),
            ErrorKind::Io(ref err) => Some(err),
            #[cfg(feature = "archive")]
            ErrorKind::Archive(ref err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self.0 {
            ErrorKind::Eof => write!(f, "unexpected end of file"),
            ErrorKind::UnsupportedVersion { version } => {
                write!(f, "unsupported schematic format version: {}", version)
            }
            ErrorKind::MalformedCompression(ref err) => write!(f, "malformed compression: {}", err),
            ErrorKind::Record(ref err) => write!(f, "record error: {}", err),
            ErrorKind::MissingDependency { id } => {
                write!(f, "missing component with id {:016X}", id)
            }
            ErrorKind::CorruptDependency { parent } => write!(
                f,
                "schematic {:016X} lists a dependency with id 0 (corrupt or unsaved component)",
                parent
            ),
            ErrorKind::InvalidComponent {
                ref path,
                ref source,
            } => write!(f, "unable to read component {}: {}", path.display(), source),
            ErrorKind::UnexpectedShape(ref err) => write!(f, "unexpected shape: {}", err),
            ErrorKind::Io(ref err) => write!(f, "io error: {}", err),
            #[cfg(feature = "archive")]
            ErrorKind::Archive(ref err) => write!(f, "archive error: {}", err),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::new(kind)
    }
}

impl From<CompressionError> for Error {
    fn from(error: CompressionError) -> Self {
        Error::new(ErrorKind::MalformedCompression(error))
    }
}

impl From<RecordError> for Error {
    fn from(error: RecordError) -> Self {
        Error::new(ErrorKind::Record(error))
    }
}

impl From<ShapeError> for Error {
    fn from(error: ShapeError) -> Self {
        Error::new(ErrorKind::UnexpectedShape(error))
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::new(ErrorKind::Io(error))
    }
}

#[cfg(feature = "archive")]
impl From<zip::result::ZipError> for Error {
    fn from(error: zip::result::ZipError) -> Self {
        Error::new(ErrorKind::Archive(error))
    }
}

/// Describes how a schematic differs from what an operation expected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// Wrong number of components of a given kind
    ComponentCount {
        kind: u64,
        expected: usize,
        found: usize,
    },

    /// A component's buffer size is not the expected one
    BufferSize { expected: i64, found: i64 },

    /// A field is missing or holds the wrong type of value
    Field {
        record: &'static str,
        field: &'static str,
        expected: &'static str,
    },
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ShapeError::ComponentCount {
                kind,
                expected,
                found,
            } => write!(
                f,
                "expected exactly {} components of kind {} but found {}",
                expected, kind, found
            ),
            ShapeError::BufferSize { expected, found } => write!(
                f,
                "expected a component with {} bytes of storage but it has {}",
                expected, found
            ),
            ShapeError::Field {
                record,
                field,
                expected,
            } => write!(f, "expected {}.{} to be {}", record, field, expected),
        }
    }
}

impl std::error::Error for ShapeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}
