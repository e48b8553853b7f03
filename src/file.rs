use crate::{
    compression::{compress_literal, Decompressor},
    Error, ErrorKind,
};
use std::ops::RangeInclusive;

/// The version byte at the start of every schematic file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FormatVersion(u8);

impl FormatVersion {
    /// Versions whose header can be read for dependency resolution
    pub const SUPPORTED: RangeInclusive<u8> = 6..=10;

    /// The last version that stored the clock speed in 4 bytes
    pub const LEGACY_CLOCK: FormatVersion = FormatVersion(6);

    /// The only version that can be decoded (and re-encoded) in full
    pub const CURRENT: FormatVersion = FormatVersion(10);

    /// Validate a version byte
    pub fn new(version: u8) -> Result<Self, Error> {
        if Self::SUPPORTED.contains(&version) {
            Ok(FormatVersion(version))
        } else {
            Err(Error::new(ErrorKind::UnsupportedVersion { version }))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// Byte width of the clock speed field in the schematic header
    pub fn clock_speed_width(&self) -> usize {
        if *self <= Self::LEGACY_CLOCK {
            4
        } else {
            8
        }
    }

    /// Returns true if the full record schema is known for this version
    pub fn has_full_schema(&self) -> bool {
        *self == Self::CURRENT
    }
}

/// A schematic file split into its version byte and compressed body.
///
/// ```rust
/// use tcsave::{encode_save, FormatVersion, SaveFile};
/// let data = encode_save(FormatVersion::CURRENT, b"payload");
/// let file = SaveFile::from_slice(&data)?;
/// assert_eq!(file.version(), FormatVersion::CURRENT);
/// assert_eq!(file.decompress()?, b"payload");
/// # Ok::<(), tcsave::Error>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SaveFile<'a> {
    version: FormatVersion,
    data: &'a [u8],
}

impl<'a> SaveFile<'a> {
    /// Read the version byte of a schematic file
    pub fn from_slice(data: &'a [u8]) -> Result<Self, Error> {
        let (&version, _) = data
            .split_first()
            .ok_or_else(|| Error::new(ErrorKind::Eof))?;
        let version = FormatVersion::new(version)?;
        Ok(SaveFile { version, data })
    }

    pub fn version(&self) -> FormatVersion {
        self.version
    }

    /// The entire file, version byte included
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// The compressed stream after the version byte
    pub fn body(&self) -> &'a [u8] {
        &self.data[1..]
    }

    /// A lazy decompressor over the body
    pub fn decompressor(&self) -> Result<Decompressor<'a>, Error> {
        Ok(Decompressor::new(self.body())?)
    }

    /// Decompress the entire body
    pub fn decompress(&self) -> Result<Vec<u8>, Error> {
        Ok(self.decompressor()?.into_vec()?)
    }
}

/// Frame a decompressed payload as a schematic file: the version byte
/// followed by a literal only compressed stream.
pub fn encode_save(version: FormatVersion, payload: &[u8]) -> Vec<u8> {
    let body = compress_literal(payload);
    let mut out = Vec::with_capacity(body.len() + 1);
    out.push(version.value());
    out.extend_from_slice(&body);
    out
}
