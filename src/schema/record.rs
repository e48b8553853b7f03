use super::{Codec, Frame, Record, RecordError, RecordErrorKind};
use std::fmt;

/// Decides whether a conditional field is present, given the fields of the
/// same record that precede it.
pub type Predicate = fn(&Record) -> bool;

/// A named slot in a record schema
#[derive(Clone)]
pub struct Field {
    name: &'static str,
    codec: Codec,
    when: Option<Predicate>,
}

impl Field {
    pub fn new(name: &'static str, codec: Codec) -> Self {
        Field {
            name,
            codec,
            when: None,
        }
    }

    /// Only decode or encode this field when `predicate` holds
    #[must_use]
    pub fn when(mut self, predicate: Predicate) -> Self {
        self.when = Some(predicate);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    pub fn is_conditional(&self) -> bool {
        self.when.is_some()
    }

    #[inline]
    fn is_present(&self, record: &Record) -> bool {
        self.when.map_or(true, |predicate| predicate(record))
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("codec", &self.codec)
            .field("conditional", &self.is_conditional())
            .finish()
    }
}

/// An ordered list of fields that is decoded and encoded in declaration
/// order.
///
/// ```rust
/// use tcsave::schema::{Codec, Record, RecordSchema, Value};
///
/// let schema = RecordSchema::new("Setting")
///     .field("kind", Codec::unsigned(1))
///     .field_if("extra", Codec::signed(2), |r| {
///         r.get("kind").and_then(Value::as_u64) == Some(1)
///     });
///
/// let (plain, _) = schema.decode(&[0x00], 0)?;
/// assert!(!plain.contains("extra"));
///
/// let (extended, end) = schema.decode(&[0x01, 0xff, 0xff], 0)?;
/// assert_eq!(extended.get("extra"), Some(&Value::Signed(-1)));
/// assert_eq!(end, 3);
/// assert_eq!(schema.to_vec(&extended)?, [0x01, 0xff, 0xff]);
/// # Ok::<(), tcsave::schema::RecordError>(())
/// ```
#[derive(Debug, Clone)]
pub struct RecordSchema {
    name: &'static str,
    fields: Vec<Field>,
}

impl RecordSchema {
    pub fn new(name: &'static str) -> Self {
        RecordSchema {
            name,
            fields: Vec::new(),
        }
    }

    /// Append an unconditional field
    #[must_use]
    pub fn field(self, name: &'static str, codec: Codec) -> Self {
        self.push(Field::new(name, codec))
    }

    /// Append a field that is only present when `predicate` holds for the
    /// fields before it
    #[must_use]
    pub fn field_if(self, name: &'static str, codec: Codec, predicate: Predicate) -> Self {
        self.push(Field::new(name, codec).when(predicate))
    }

    #[must_use]
    pub fn push(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// The fewest bytes a record of this schema can occupy
    pub fn min_width(&self) -> usize {
        self.fields
            .iter()
            .filter(|field| !field.is_conditional())
            .map(|field| field.codec.min_width())
            .sum()
    }

    /// Decode a record starting at `offset`, returning it with the offset
    /// one past its last byte
    pub fn decode(&self, data: &[u8], offset: usize) -> Result<(Record, usize), RecordError> {
        let mut record = Record::with_capacity(self.name, self.fields.len());
        let mut pos = offset;
        for field in &self.fields {
            if !field.is_present(&record) {
                continue;
            }

            let (value, next) = field
                .codec
                .decode(data, pos)
                .map_err(|e| e.within(self.frame(field, pos)))?;
            record.push(field.name, value);
            pos = next;
        }

        record.set_span(offset..pos);
        Ok((record, pos))
    }

    /// Append the encoding of `record`.
    ///
    /// Conditional fields are evaluated against the whole record. Fields the
    /// schema doesn't know about, or whose condition is false, are not
    /// written.
    pub fn encode(&self, record: &Record, out: &mut Vec<u8>) -> Result<(), RecordError> {
        if record.name() != self.name {
            return Err(RecordError::new(
                RecordErrorKind::Mismatch {
                    expected: self.name,
                },
                out.len(),
            ));
        }

        for field in &self.fields {
            if !field.is_present(record) {
                continue;
            }

            let offset = out.len();
            let value = record.get(field.name).ok_or_else(|| {
                RecordError::new(RecordErrorKind::MissingField, offset)
                    .within(self.frame(field, offset))
            })?;

            field
                .codec
                .encode(value, out)
                .map_err(|e| e.within(self.frame(field, offset)))?;
        }

        Ok(())
    }

    /// Decode a record from the start of `data`
    pub fn from_slice(&self, data: &[u8]) -> Result<Record, RecordError> {
        self.decode(data, 0).map(|(record, _)| record)
    }

    /// Encode a record into a new buffer
    pub fn to_vec(&self, record: &Record) -> Result<Vec<u8>, RecordError> {
        let mut out = Vec::new();
        self.encode(record, &mut out)?;
        Ok(out)
    }

    #[inline]
    fn frame(&self, field: &Field, offset: usize) -> Frame {
        Frame::Field {
            record: self.name,
            field: field.name,
            offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Value;

    fn point() -> RecordSchema {
        RecordSchema::new("Point")
            .field("x", Codec::signed(2))
            .field("y", Codec::signed(2))
    }

    fn shape() -> RecordSchema {
        RecordSchema::new("Shape")
            .field("kind", Codec::unsigned(1))
            .field("origin", Codec::record(point()))
            .field_if("label", Codec::text(), |r| {
                r.get("kind").and_then(Value::as_u64) == Some(7)
            })
            .field("tail", Codec::unsigned(1))
    }

    #[test]
    fn test_conditional_absent() {
        let data = [0x01, 0x02, 0x00, 0xfd, 0xff, 0x09];
        let (record, end) = shape().decode(&data, 0).unwrap();
        assert_eq!(end, data.len());
        assert!(!record.contains("label"));
        assert_eq!(record.get("tail"), Some(&Value::Unsigned(9)));

        let origin = record.get("origin").and_then(Value::as_record).unwrap();
        assert_eq!(origin.get("y"), Some(&Value::Signed(-3)));
        assert_eq!(origin.span(), 1..5);
        assert_eq!(shape().to_vec(&record).unwrap(), data);
    }

    #[test]
    fn test_conditional_present() {
        let data = [0x07, 0x00, 0x00, 0x00, 0x00, 0x02, 0x00, b'o', b'k', 0x01];
        let (record, _) = shape().decode(&data, 0).unwrap();
        assert_eq!(record.get("label"), Some(&Value::from("ok")));
        assert_eq!(shape().to_vec(&record).unwrap(), data);
    }

    #[test]
    fn test_predicate_false_drops_field_on_encode() {
        let data = [0x07, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01];
        let (mut record, _) = shape().decode(&data, 0).unwrap();
        record.set("kind", 1u64);
        assert_eq!(
            shape().to_vec(&record).unwrap(),
            [0x01, 0x00, 0x00, 0x00, 0x00, 0x01]
        );
    }

    #[test]
    fn test_missing_field() {
        let record = Record::new("Shape").with("kind", 7u64);
        let err = shape().to_vec(&record).unwrap_err();
        assert_eq!(err.kind(), &RecordErrorKind::MissingField);
        assert_eq!(err.path(), "origin");
    }

    #[test]
    fn test_truncated_nested_field_trail() {
        let err = shape().decode(&[0x01, 0x00, 0x00, 0x05], 0).unwrap_err();
        assert_eq!(
            err.trail(),
            &[
                Frame::Field {
                    record: "Point",
                    field: "y",
                    offset: 3
                },
                Frame::Field {
                    record: "Shape",
                    field: "origin",
                    offset: 1
                },
            ]
        );
        assert_eq!(err.path(), "origin.y");
        let msg = err.to_string();
        assert!(msg.contains("field Point.y at 0x3"), "{}", msg);
        assert!(msg.contains("field Shape.origin at 0x1"), "{}", msg);
    }

    #[test]
    fn test_wrong_record_name() {
        let err = point().to_vec(&Record::new("Shape")).unwrap_err();
        assert_eq!(err.kind(), &RecordErrorKind::Mismatch { expected: "Point" });
    }

    #[test]
    fn test_min_width_ignores_conditional() {
        assert_eq!(shape().min_width(), 1 + 4 + 1);
    }
}
