//! The snappy stream variant that schematic bodies are compressed with.
//!
//! A stream starts with a varint of the uncompressed length followed by
//! chunks. The low two bits of each chunk's tag select a literal run or a
//! back reference copy with a 1, 2, or 4 byte offset. Only decompression is
//! implemented in full: writes always emit literal chunks.

mod decoder;
mod encoder;
mod errors;

pub use self::decoder::Decompressor;
pub use self::encoder::compress_literal;
pub use self::errors::{CompressionError, CompressionErrorKind};
