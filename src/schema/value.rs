use std::ops::Range;

/// A decoded value in a record tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Output of an unsigned integer codec
    Unsigned(u64),

    /// Output of a signed integer codec
    Signed(i64),

    /// Length prefixed UTF-8 text
    Text(String),

    /// Length prefixed sequence
    List(Vec<Value>),

    /// Two values decoded back to back
    Pair(Box<(Value, Value)>),

    /// Opaque bytes that are carried through untouched
    Bytes(Vec<u8>),

    /// A nested record
    Record(Record),
}

impl Value {
    /// Create a pair value
    pub fn pair(left: impl Into<Value>, right: impl Into<Value>) -> Value {
        Value::Pair(Box::new((left.into(), right.into())))
    }

    /// The integer as an u64, if it is an integer and non-negative
    ///
    /// ```rust
    /// use tcsave::schema::Value;
    /// assert_eq!(Value::Signed(78).as_u64(), Some(78));
    /// assert_eq!(Value::Signed(-1).as_u64(), None);
    /// assert_eq!(Value::from("78").as_u64(), None);
    /// ```
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::Unsigned(x) => Some(x),
            Value::Signed(x) => u64::try_from(x).ok(),
            _ => None,
        }
    }

    /// The integer as an i64, if it is an integer that fits
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Unsigned(x) => i64::try_from(x).ok(),
            Value::Signed(x) => Some(x),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn as_i128(&self) -> Option<i128> {
        match *self {
            Value::Unsigned(x) => Some(i128::from(x)),
            Value::Signed(x) => Some(i128::from(x)),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::List(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_pair(&self) -> Option<(&Value, &Value)> {
        match self {
            Value::Pair(x) => Some((&x.0, &x.1)),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut Record> {
        match self {
            Value::Record(x) => Some(x),
            _ => None,
        }
    }
}

impl From<u64> for Value {
    fn from(x: u64) -> Self {
        Value::Unsigned(x)
    }
}

impl From<i64> for Value {
    fn from(x: i64) -> Self {
        Value::Signed(x)
    }
}

impl From<&str> for Value {
    fn from(x: &str) -> Self {
        Value::Text(String::from(x))
    }
}

impl From<String> for Value {
    fn from(x: String) -> Self {
        Value::Text(x)
    }
}

impl From<Vec<Value>> for Value {
    fn from(x: Vec<Value>) -> Self {
        Value::List(x)
    }
}

impl From<Vec<u8>> for Value {
    fn from(x: Vec<u8>) -> Self {
        Value::Bytes(x)
    }
}

impl From<Record> for Value {
    fn from(x: Record) -> Self {
        Value::Record(x)
    }
}

/// An ordered set of named values decoded by a
/// [RecordSchema](crate::schema::RecordSchema).
///
/// A decoded record remembers the byte range it was decoded from. The range
/// is informational and ignored by equality, so a record that is mutated and
/// re-encoded still compares equal to its decoded form.
///
/// ```rust
/// use tcsave::schema::{Record, Value};
/// let mut point = Record::new("Point").with("x", -3i64).with("y", 4i64);
/// assert_eq!(point.get("x").and_then(Value::as_i64), Some(-3));
/// point.set("y", 5i64);
/// assert_eq!(point.get("y"), Some(&Value::Signed(5)));
/// ```
#[derive(Debug, Clone)]
pub struct Record {
    name: &'static str,
    fields: Vec<(&'static str, Value)>,
    span: Range<usize>,
}

impl Record {
    /// Create an empty record with the given schema name
    pub fn new(name: &'static str) -> Self {
        Record {
            name,
            fields: Vec::new(),
            span: 0..0,
        }
    }

    #[inline]
    pub(crate) fn with_capacity(name: &'static str, capacity: usize) -> Self {
        Record {
            name,
            fields: Vec::with_capacity(capacity),
            span: 0..0,
        }
    }

    /// Builder style [Record::set]
    #[must_use]
    pub fn with(mut self, field: &'static str, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    /// Name of the schema this record belongs to
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The bytes this record was decoded from
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    #[inline]
    pub(crate) fn set_span(&mut self, span: Range<usize>) {
        self.span = span;
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, field: &str) -> Option<&mut Value> {
        self.fields
            .iter_mut()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| value)
    }

    /// Replace the value of a field in place, or append the field if it does
    /// not exist yet. Returns the previous value.
    pub fn set(&mut self, field: &'static str, value: impl Into<Value>) -> Option<Value> {
        let value = value.into();
        match self.get_mut(field) {
            Some(existing) => Some(std::mem::replace(existing, value)),
            None => {
                self.fields.push((field, value));
                None
            }
        }
    }

    /// Remove a field, returning its value
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        let idx = self.fields.iter().position(|(name, _)| *name == field)?;
        Some(self.fields.remove(idx).1)
    }

    /// Fields in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> + '_ {
        self.fields.iter().map(|(name, value)| (*name, value))
    }

    #[inline]
    pub(crate) fn push(&mut self, field: &'static str, value: Value) {
        self.fields.push((field, value));
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.fields == other.fields
    }
}

impl Eq for Record {}

#[cfg(feature = "json")]
mod ser {
    use super::{Record, Value};
    use serde::ser::{Serialize, SerializeMap, SerializeTuple, Serializer};

    impl Serialize for Value {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match self {
                Value::Unsigned(x) => serializer.serialize_u64(*x),
                Value::Signed(x) => serializer.serialize_i64(*x),
                Value::Text(x) => serializer.serialize_str(x),
                Value::List(x) => serializer.collect_seq(x),
                Value::Pair(pair) => {
                    let mut tup = serializer.serialize_tuple(2)?;
                    tup.serialize_element(&pair.0)?;
                    tup.serialize_element(&pair.1)?;
                    tup.end()
                }
                Value::Bytes(x) => serializer.serialize_bytes(x),
                Value::Record(x) => x.serialize(serializer),
            }
        }
    }

    impl Serialize for Record {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            let mut map = serializer.serialize_map(Some(self.len()))?;
            for (name, value) in self.iter() {
                map.serialize_entry(name, value)?;
            }
            map.end()
        }
    }
}
