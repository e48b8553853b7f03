use crate::{
    errors::ShapeError,
    file::{encode_save, FormatVersion, SaveFile},
    model,
    schema::{Record, Value},
    Error, ErrorKind,
};

/// A fully decoded schematic.
///
/// The record tree can be inspected and mutated in place and then written
/// back out. Fields that are not touched are re-encoded to the exact bytes
/// they were decoded from.
///
/// ```rust
/// use tcsave::{model, schema::Record, FormatVersion, Schematic};
/// # let root = Record::new(model::SCHEMATIC)
/// #     .with("custom_id", 0x77i64)
/// #     .with("hub_id", 0u64)
/// #     .with("gate", 12i64)
/// #     .with("delay", 4i64)
/// #     .with("menu_visible", 1u64)
/// #     .with("clock_speed", 100u64)
/// #     .with("dependencies", Vec::<tcsave::schema::Value>::new())
/// #     .with("description", "")
/// #     .with("camera_position", Record::new(model::POINT).with("x", 0i64).with("y", 0i64))
/// #     .with("synced", 0u64)
/// #     .with("reserved", 0u64)
/// #     .with("player_data", Vec::<tcsave::schema::Value>::new())
/// #     .with("hub_description", "")
/// #     .with("components", Vec::<tcsave::schema::Value>::new())
/// #     .with("wires", vec![1u8, 2, 3]);
/// # let data = Schematic::new(FormatVersion::CURRENT, root).to_vec()?;
/// let schematic = Schematic::from_slice(&data)?;
/// assert_eq!(schematic.id()?, 0x77);
/// assert_eq!(schematic.gate()?, 12);
/// assert_eq!(schematic.wires()?, &[1, 2, 3]);
/// assert_eq!(schematic.to_vec()?, data);
/// # Ok::<(), tcsave::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schematic {
    version: FormatVersion,
    root: Record,
}

impl Schematic {
    /// Wrap an already built root record
    pub fn new(version: FormatVersion, root: Record) -> Self {
        Schematic { version, root }
    }

    /// Decode a schematic file. Only the current format version is accepted.
    pub fn from_slice(data: &[u8]) -> Result<Self, Error> {
        let file = SaveFile::from_slice(data)?;
        Self::from_file(&file)
    }

    pub fn from_file(file: &SaveFile) -> Result<Self, Error> {
        let version = file.version();
        if !version.has_full_schema() {
            return Err(Error::new(ErrorKind::UnsupportedVersion {
                version: version.value(),
            }));
        }

        let payload = file.decompress()?;
        Self::from_payload(version, &payload)
    }

    /// Decode an already decompressed body
    pub fn from_payload(version: FormatVersion, payload: &[u8]) -> Result<Self, Error> {
        let root = model::schematic(version).from_slice(payload)?;
        Ok(Schematic { version, root })
    }

    /// Encode the record tree into an uncompressed body
    pub fn to_payload(&self) -> Result<Vec<u8>, Error> {
        Ok(model::schematic(self.version).to_vec(&self.root)?)
    }

    /// Encode into a complete schematic file with a literal only body
    pub fn to_vec(&self) -> Result<Vec<u8>, Error> {
        let payload = self.to_payload()?;
        Ok(encode_save(self.version, &payload))
    }

    pub fn version(&self) -> FormatVersion {
        self.version
    }

    pub fn root(&self) -> &Record {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Record {
        &mut self.root
    }

    #[must_use]
    pub fn into_root(self) -> Record {
        self.root
    }

    /// The schematic identity. Stored signed, but the game treats it as an
    /// opaque 64 bit id.
    pub fn id(&self) -> Result<u64, Error> {
        let id = self.integer("custom_id")?;
        Ok(id as u64)
    }

    pub fn gate(&self) -> Result<i64, Error> {
        self.integer("gate")
    }

    pub fn delay(&self) -> Result<i64, Error> {
        self.integer("delay")
    }

    /// Ids of the custom components this schematic embeds
    pub fn dependencies(&self) -> Result<Vec<u64>, Error> {
        let list = self
            .list("dependencies")?
            .iter()
            .map(|x| x.as_i64().map(|id| id as u64))
            .collect::<Option<Vec<_>>>();
        list.ok_or_else(|| shape(model::SCHEMATIC, "dependencies", "a list of integers"))
    }

    pub fn components(&self) -> Result<&[Value], Error> {
        self.list("components")
    }

    pub fn components_mut(&mut self) -> Result<&mut Vec<Value>, Error> {
        self.root
            .get_mut("components")
            .and_then(Value::as_list_mut)
            .ok_or_else(|| shape(model::SCHEMATIC, "components", "a list"))
    }

    /// The opaque wire data at the end of the schematic
    pub fn wires(&self) -> Result<&[u8], Error> {
        self.root
            .get("wires")
            .and_then(Value::as_bytes)
            .ok_or_else(|| shape(model::SCHEMATIC, "wires", "bytes"))
    }

    fn integer(&self, field: &'static str) -> Result<i64, Error> {
        self.root
            .get(field)
            .and_then(Value::as_i64)
            .ok_or_else(|| shape(model::SCHEMATIC, field, "an integer"))
    }

    fn list(&self, field: &'static str) -> Result<&[Value], Error> {
        self.root
            .get(field)
            .and_then(Value::as_list)
            .ok_or_else(|| shape(model::SCHEMATIC, field, "a list"))
    }
}

pub(crate) fn shape(record: &'static str, field: &'static str, expected: &'static str) -> Error {
    Error::from(ShapeError::Field {
        record,
        field,
        expected,
    })
}
