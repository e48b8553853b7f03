//! Variable length unsigned integers.
//!
//! Each byte contributes its low 7 bits, least significant group first. A set
//! high bit means another byte follows. This is the preamble encoding of the
//! snappy format that save files are compressed with.

/// Longest encoding of a u64: ceil(64 / 7) groups
pub(crate) const MAX_VARINT_LEN: usize = 10;

/// Decode a varint starting at `start`, returning the value and the index
/// one past the final byte.
///
/// Returns `None` if the input ends before a terminating byte or if the value
/// does not fit in 64 bits.
///
/// ```rust
/// use tcsave::varint::read_varint;
/// assert_eq!(read_varint(&[0xfe, 0xff, 0x7f], 0), Some((0x1f_fffe, 3)));
/// assert_eq!(read_varint(&[0x00, 0x40], 1), Some((0x40, 2)));
/// assert_eq!(read_varint(&[0x80], 0), None);
/// ```
#[inline]
pub fn read_varint(data: &[u8], start: usize) -> Option<(u64, usize)> {
    let mut result = 0u64;
    let bytes = data.get(start..)?;
    for (i, &byte) in bytes.iter().take(MAX_VARINT_LEN).enumerate() {
        let group = u64::from(byte & 0x7f);
        let shift = 7 * i as u32;

        // the tenth group may only carry the single remaining bit
        if i == MAX_VARINT_LEN - 1 && group > 1 {
            return None;
        }

        result |= group << shift;
        if byte & 0x80 == 0 {
            return Some((result, start + i + 1));
        }
    }

    None
}

/// Append the minimal varint encoding of `value`
#[inline]
pub fn write_varint(mut value: u64, out: &mut Vec<u8>) {
    while value > 0x7f {
        out.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

/// Number of bytes `write_varint` emits for `value`
#[inline]
pub fn varint_len(value: u64) -> usize {
    let bits = 64 - (value | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}
