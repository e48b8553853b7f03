//! A declarative, bidirectional description of binary records.
//!
//! A [RecordSchema] is an ordered list of named [Field]s, each with a
//! [Codec]. The same schema drives both directions: decoding a buffer into a
//! [Record] tree and encoding a (possibly modified) tree back into bytes.
//! Fields can be made conditional on the values of the fields before them.
//!
//! Any failure carries a [RecordError] trail naming each field, element, and
//! byte offset that was being processed.

mod codec;
mod errors;
mod record;
mod value;

pub use self::codec::Codec;
pub use self::errors::{Frame, RecordError, RecordErrorKind};
pub use self::record::{Field, Predicate, RecordSchema};
pub use self::value::{Record, Value};
