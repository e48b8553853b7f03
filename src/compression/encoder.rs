use crate::varint::write_varint;

/// Literal tag with a length field of 63: the chunk length follows as 4
/// little endian bytes
const LITERAL_4_BYTE_LEN: u8 = 63 << 2;

/// Largest payload a single literal chunk can carry
const MAX_LITERAL_LEN: usize = u32::MAX as usize;

/// Wrap `payload` in the simplest valid stream: the length preamble
/// followed by literal chunks. No back references are ever emitted.
///
/// ```rust
/// use tcsave::compression::compress_literal;
/// assert_eq!(
///     compress_literal(b"ab"),
///     vec![0x02, 0xfc, 0x01, 0x00, 0x00, 0x00, b'a', b'b'],
/// );
/// assert_eq!(compress_literal(b""), vec![0x00]);
/// ```
pub fn compress_literal(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 16);
    write_varint(payload.len() as u64, &mut out);
    for chunk in payload.chunks(MAX_LITERAL_LEN) {
        out.push(LITERAL_4_BYTE_LEN);
        out.extend_from_slice(&((chunk.len() - 1) as u32).to_le_bytes());
        out.extend_from_slice(chunk);
    }
    out
}
