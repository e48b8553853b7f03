use super::{Frame, Record, RecordError, RecordErrorKind, RecordSchema, Value};
use crate::util::{le_int, le_uint};

/// Describes how a single value is laid out in bytes.
///
/// Every codec decodes and encodes symmetrically: encoding a value that was
/// decoded without modification reproduces the exact bytes it came from.
///
/// ```rust
/// use tcsave::schema::{Codec, Value};
/// let codec = Codec::seq(Codec::pair(Codec::signed(2), Codec::text()));
/// let data = [0x01, 0x00, 0xfe, 0xff, 0x02, 0x00, b'h', b'i'];
/// let (value, end) = codec.decode(&data, 0)?;
/// assert_eq!(end, data.len());
/// assert_eq!(value, Value::List(vec![Value::pair(-2i64, "hi")]));
/// assert_eq!(codec.to_vec(&value)?, data);
/// # Ok::<(), tcsave::schema::RecordError>(())
/// ```
#[derive(Debug, Clone)]
pub enum Codec {
    /// Little endian unsigned integer of the given width in bytes (1 to 8).
    /// Other widths fail with `InvalidWidth` when used.
    Unsigned(usize),

    /// Little endian two's complement integer of the given width (1 to 8)
    Signed(usize),

    /// A count decoded with `length` followed by that many `element`s
    Seq {
        length: Box<Codec>,
        element: Box<Codec>,
    },

    /// A byte count decoded with `length` followed by UTF-8 text
    Text { length: Box<Codec> },

    /// Two values back to back
    Pair(Box<Codec>, Box<Codec>),

    /// Every byte until the end of the buffer
    Remainder,

    /// A nested record
    Record(RecordSchema),
}

impl Codec {
    /// Default prefix for sequences and text: 2 byte unsigned
    pub fn default_length() -> Codec {
        Codec::Unsigned(2)
    }

    pub fn unsigned(width: usize) -> Codec {
        Codec::Unsigned(width)
    }

    pub fn signed(width: usize) -> Codec {
        Codec::Signed(width)
    }

    /// Sequence with the default 2 byte length prefix
    pub fn seq(element: Codec) -> Codec {
        Codec::seq_with(Codec::default_length(), element)
    }

    pub fn seq_with(length: Codec, element: Codec) -> Codec {
        Codec::Seq {
            length: Box::new(length),
            element: Box::new(element),
        }
    }

    /// Text with the default 2 byte length prefix
    pub fn text() -> Codec {
        Codec::text_with(Codec::default_length())
    }

    pub fn text_with(length: Codec) -> Codec {
        Codec::Text {
            length: Box::new(length),
        }
    }

    pub fn pair(left: Codec, right: Codec) -> Codec {
        Codec::Pair(Box::new(left), Box::new(right))
    }

    pub fn remainder() -> Codec {
        Codec::Remainder
    }

    pub fn record(schema: RecordSchema) -> Codec {
        Codec::Record(schema)
    }

    /// The fewest bytes a value of this codec can occupy
    pub fn min_width(&self) -> usize {
        match self {
            Codec::Unsigned(width) | Codec::Signed(width) => *width,
            Codec::Seq { length, .. } | Codec::Text { length } => length.min_width(),
            Codec::Pair(left, right) => left.min_width() + right.min_width(),
            Codec::Remainder => 0,
            Codec::Record(schema) => schema.min_width(),
        }
    }

    /// Decode a value starting at `offset`, returning it with the offset one
    /// past its last byte.
    pub fn decode(&self, data: &[u8], offset: usize) -> Result<(Value, usize), RecordError> {
        match self {
            Codec::Unsigned(width) => {
                let bytes = fixed(data, offset, integer_width(*width, offset)?)?;
                Ok((Value::Unsigned(le_uint(bytes)), offset + width))
            }
            Codec::Signed(width) => {
                let bytes = fixed(data, offset, integer_width(*width, offset)?)?;
                Ok((Value::Signed(le_int(bytes)), offset + width))
            }
            Codec::Seq { length, element } => {
                let (count, mut pos) = decode_length(length, data, offset)?;

                // Reject counts that can't possibly be satisfied before
                // allocating for them
                let remaining = data.len() - pos;
                let needed = count.saturating_mul(element.min_width());
                if needed > remaining {
                    return Err(RecordError::new(
                        RecordErrorKind::Truncated {
                            needed,
                            available: remaining,
                        },
                        pos,
                    ));
                }

                let mut out = Vec::with_capacity(count.min(remaining));
                for index in 0..count {
                    let (value, next) = element
                        .decode(data, pos)
                        .map_err(|e| e.within(Frame::Element { index, offset: pos }))?;
                    out.push(value);
                    pos = next;
                }
                Ok((Value::List(out), pos))
            }
            Codec::Text { length } => {
                let (count, pos) = decode_length(length, data, offset)?;
                let bytes = fixed(data, pos, count)?;
                let text = std::str::from_utf8(bytes)
                    .map_err(|_| RecordError::new(RecordErrorKind::InvalidText, pos))?;
                Ok((Value::Text(String::from(text)), pos + count))
            }
            Codec::Pair(left, right) => {
                let (a, pos) = left
                    .decode(data, offset)
                    .map_err(|e| e.within(Frame::Left { offset }))?;
                let (b, pos) = right
                    .decode(data, pos)
                    .map_err(|e| e.within(Frame::Right { offset: pos }))?;
                Ok((Value::pair(a, b), pos))
            }
            Codec::Remainder => {
                let rest = data.get(offset..).unwrap_or_default();
                Ok((Value::Bytes(rest.to_vec()), offset + rest.len()))
            }
            Codec::Record(schema) => {
                let (record, pos) = schema.decode(data, offset)?;
                Ok((Value::Record(record), pos))
            }
        }
    }

    /// Append the encoding of `value`
    pub fn encode(&self, value: &Value, out: &mut Vec<u8>) -> Result<(), RecordError> {
        match self {
            Codec::Unsigned(width) => {
                integer_width(*width, out.len())?;
                let x = integer(value, out.len())?;
                let max = (1i128 << (8 * width)) - 1;
                if !(0..=max).contains(&x) {
                    return Err(out_of_range(x, *width, out.len()));
                }
                out.extend_from_slice(&(x as u64).to_le_bytes()[..*width]);
                Ok(())
            }
            Codec::Signed(width) => {
                integer_width(*width, out.len())?;
                let x = integer(value, out.len())?;
                let bound = 1i128 << (8 * width - 1);
                if !(-bound..bound).contains(&x) {
                    return Err(out_of_range(x, *width, out.len()));
                }
                out.extend_from_slice(&(x as i64).to_le_bytes()[..*width]);
                Ok(())
            }
            Codec::Seq { length, element } => {
                let values = value.as_list().ok_or_else(|| mismatch("list", out.len()))?;
                encode_length(length, values.len(), out)?;
                for (index, value) in values.iter().enumerate() {
                    let offset = out.len();
                    element
                        .encode(value, out)
                        .map_err(|e| e.within(Frame::Element { index, offset }))?;
                }
                Ok(())
            }
            Codec::Text { length } => {
                let text = value.as_text().ok_or_else(|| mismatch("text", out.len()))?;
                encode_length(length, text.len(), out)?;
                out.extend_from_slice(text.as_bytes());
                Ok(())
            }
            Codec::Pair(left, right) => {
                let (a, b) = value.as_pair().ok_or_else(|| mismatch("pair", out.len()))?;
                let offset = out.len();
                left.encode(a, out)
                    .map_err(|e| e.within(Frame::Left { offset }))?;
                let offset = out.len();
                right
                    .encode(b, out)
                    .map_err(|e| e.within(Frame::Right { offset }))
            }
            Codec::Remainder => {
                let bytes = value.as_bytes().ok_or_else(|| mismatch("bytes", out.len()))?;
                out.extend_from_slice(bytes);
                Ok(())
            }
            Codec::Record(schema) => {
                let record: &Record = value.as_record().ok_or_else(|| mismatch("record", out.len()))?;
                schema.encode(record, out)
            }
        }
    }

    /// Encode a value into a new buffer
    pub fn to_vec(&self, value: &Value) -> Result<Vec<u8>, RecordError> {
        let mut out = Vec::new();
        self.encode(value, &mut out)?;
        Ok(out)
    }
}

#[inline]
fn fixed(data: &[u8], offset: usize, width: usize) -> Result<&[u8], RecordError> {
    offset
        .checked_add(width)
        .and_then(|end| data.get(offset..end))
        .ok_or_else(|| {
            RecordError::new(
                RecordErrorKind::Truncated {
                    needed: width,
                    available: data.len().saturating_sub(offset),
                },
                offset,
            )
        })
}

fn decode_length(length: &Codec, data: &[u8], offset: usize) -> Result<(usize, usize), RecordError> {
    let (value, pos) = length
        .decode(data, offset)
        .map_err(|e| e.within(Frame::Length { offset }))?;

    let count = value.as_i128().unwrap_or(-1);
    let count = usize::try_from(count).map_err(|_| {
        RecordError::new(RecordErrorKind::InvalidLength { length: count }, offset)
            .within(Frame::Length { offset })
    })?;
    Ok((count, pos))
}

fn encode_length(length: &Codec, count: usize, out: &mut Vec<u8>) -> Result<(), RecordError> {
    let offset = out.len();
    length
        .encode(&Value::Unsigned(count as u64), out)
        .map_err(|e| e.within(Frame::Length { offset }))
}

/// Integer codecs are built from at most a u64
#[inline]
fn integer_width(width: usize, offset: usize) -> Result<usize, RecordError> {
    if (1..=8).contains(&width) {
        Ok(width)
    } else {
        Err(RecordError::new(RecordErrorKind::InvalidWidth { width }, offset))
    }
}

#[inline]
fn integer(value: &Value, offset: usize) -> Result<i128, RecordError> {
    value.as_i128().ok_or_else(|| mismatch("integer", offset))
}

#[cold]
fn mismatch(expected: &'static str, offset: usize) -> RecordError {
    RecordError::new(RecordErrorKind::Mismatch { expected }, offset)
}

#[cold]
fn out_of_range(value: i128, width: usize, offset: usize) -> RecordError {
    RecordError::new(RecordErrorKind::OutOfRange { value, width }, offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case(Codec::unsigned(1), &[0xff], Value::Unsigned(255))]
    #[case(Codec::unsigned(4), &[0x78, 0x56, 0x34, 0x12], Value::Unsigned(0x1234_5678))]
    #[case(Codec::signed(2), &[0xff, 0xff], Value::Signed(-1))]
    #[case(Codec::signed(8), &[0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80], Value::Signed(i64::MIN))]
    #[case(Codec::text(), &[0x00, 0x00], Value::Text(String::new()))]
    #[case(Codec::seq(Codec::unsigned(8)), &[0x00, 0x00], Value::List(Vec::new()))]
    #[case(Codec::seq_with(Codec::signed(8), Codec::unsigned(1)), &[0x02, 0, 0, 0, 0, 0, 0, 0, 0x07, 0x09], Value::List(vec![Value::Unsigned(7), Value::Unsigned(9)]))]
    #[case(Codec::text_with(Codec::unsigned(1)), &[0x03, 0xc3, 0xa5, b'!'], Value::from("å!"))]
    fn test_decode_and_reencode(#[case] codec: Codec, #[case] data: &[u8], #[case] expected: Value) {
        let (value, end) = codec.decode(data, 0).unwrap();
        assert_eq!(value, expected);
        assert_eq!(end, data.len());
        assert_eq!(codec.to_vec(&value).unwrap(), data);
    }

    #[test]
    fn test_remainder_takes_everything() {
        let data = [1, 2, 3, 4];
        let (value, end) = Codec::remainder().decode(&data, 1).unwrap();
        assert_eq!(value, Value::Bytes(vec![2, 3, 4]));
        assert_eq!(end, 4);

        let (value, end) = Codec::remainder().decode(&data, 4).unwrap();
        assert_eq!(value, Value::Bytes(Vec::new()));
        assert_eq!(end, 4);
    }

    #[test]
    fn test_truncated_integer() {
        let err = Codec::unsigned(8).decode(&[0; 5], 2).unwrap_err();
        assert_eq!(
            err.kind(),
            &RecordErrorKind::Truncated {
                needed: 8,
                available: 3
            }
        );
        assert_eq!(err.offset(), 2);
    }

    #[test]
    fn test_truncated_element_trail() {
        let codec = Codec::seq(Codec::pair(Codec::signed(8), Codec::text()));
        let mut data = vec![0x02, 0x00];
        data.extend_from_slice(&[0; 10]);
        data.extend_from_slice(&[0; 8]);
        data.extend_from_slice(&[0x05, 0x00, b'a', b'b', b'c']);
        let err = codec.decode(&data, 0).unwrap_err();
        assert_eq!(
            err.kind(),
            &RecordErrorKind::Truncated {
                needed: 5,
                available: 3
            }
        );
        assert_eq!(
            err.trail(),
            &[Frame::Right { offset: 20 }, Frame::Element { index: 1, offset: 12 }]
        );
        assert_eq!(err.offset(), 22);
        assert_eq!(err.path(), "[1]");
    }

    #[test]
    fn test_impossible_sequence_length() {
        let codec = Codec::seq(Codec::unsigned(8));
        let err = codec.decode(&[0xff, 0xff, 0x00], 0).unwrap_err();
        assert_eq!(
            err.kind(),
            &RecordErrorKind::Truncated {
                needed: 0xffff * 8,
                available: 1
            }
        );
        assert_eq!(err.offset(), 2);
    }

    #[test]
    fn test_cut_off_record_list() {
        let codec = Codec::seq(Codec::pair(Codec::signed(8), Codec::signed(8)));
        let mut data = vec![0x03, 0x00];
        data.extend_from_slice(&[0; 40]);
        let err = codec.decode(&data, 0).unwrap_err();
        assert_eq!(
            err.kind(),
            &RecordErrorKind::Truncated {
                needed: 48,
                available: 40
            }
        );
    }

    #[rstest]
    #[case(Codec::Unsigned(9))]
    #[case(Codec::Unsigned(0))]
    #[case(Codec::Signed(0))]
    #[case(Codec::Signed(16))]
    fn test_integer_width_out_of_bounds(#[case] codec: Codec) {
        let err = codec.decode(&[0; 32], 4).unwrap_err();
        assert!(matches!(err.kind(), RecordErrorKind::InvalidWidth { .. }));
        assert_eq!(err.offset(), 4);

        let err = codec.to_vec(&Value::Unsigned(1)).unwrap_err();
        assert!(matches!(err.kind(), RecordErrorKind::InvalidWidth { .. }));
    }

    #[test]
    fn test_invalid_width_inside_sequence() {
        let codec = Codec::seq(Codec::Signed(0));
        let err = codec.decode(&[0x01, 0x00], 0).unwrap_err();
        assert_eq!(err.kind(), &RecordErrorKind::InvalidWidth { width: 0 });
        assert_eq!(err.trail(), &[Frame::Element { index: 0, offset: 2 }]);
    }

    #[test]
    fn test_negative_sequence_length() {
        let codec = Codec::seq_with(Codec::signed(1), Codec::unsigned(1));
        let err = codec.decode(&[0xff], 0).unwrap_err();
        assert_eq!(err.kind(), &RecordErrorKind::InvalidLength { length: -1 });
        assert_eq!(err.trail(), &[Frame::Length { offset: 0 }]);
    }

    #[test]
    fn test_invalid_text() {
        let err = Codec::text().decode(&[0x01, 0x00, 0xff], 0).unwrap_err();
        assert_eq!(err.kind(), &RecordErrorKind::InvalidText);
        assert_eq!(err.offset(), 2);
    }

    #[rstest]
    #[case(Codec::unsigned(2), Value::Unsigned(0x1_0000))]
    #[case(Codec::unsigned(2), Value::Signed(-1))]
    #[case(Codec::signed(1), Value::Signed(128))]
    #[case(Codec::signed(1), Value::Signed(-129))]
    fn test_encode_out_of_range(#[case] codec: Codec, #[case] value: Value) {
        let err = codec.to_vec(&value).unwrap_err();
        assert!(matches!(err.kind(), RecordErrorKind::OutOfRange { .. }));
    }

    #[test]
    fn test_encode_accepts_either_sign() {
        assert_eq!(Codec::signed(2).to_vec(&Value::Unsigned(5)).unwrap(), [5, 0]);
        assert_eq!(Codec::unsigned(2).to_vec(&Value::Signed(5)).unwrap(), [5, 0]);
        assert_eq!(
            Codec::unsigned(8).to_vec(&Value::Unsigned(u64::MAX)).unwrap(),
            [0xff; 8]
        );
    }

    #[test]
    fn test_encode_shape_mismatch() {
        let err = Codec::seq(Codec::unsigned(1))
            .to_vec(&Value::List(vec![Value::from("x")]))
            .unwrap_err();
        assert_eq!(err.kind(), &RecordErrorKind::Mismatch { expected: "integer" });
        assert_eq!(err.trail(), &[Frame::Element { index: 0, offset: 2 }]);
    }
}
