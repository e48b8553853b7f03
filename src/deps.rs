use crate::{
    compression::Decompressor,
    file::{FormatVersion, SaveFile},
    model,
    schema::{Frame, Record, RecordError, RecordErrorKind, Value},
    schematic::shape,
    util::{get_split, le_uint},
    Error, ErrorKind,
};
use std::collections::{btree_map, hash_map::Entry, BTreeMap, BTreeSet, HashMap};
use tracing::{debug, trace, warn};

/// The identity and dependency list at the start of a schematic.
///
/// Reading a header expands only as much of the compressed body as the
/// header occupies, and works for every supported format version, not just
/// the ones that can be decoded in full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchematicHeader {
    pub id: u64,
    pub hub_id: u32,
    pub gate: i64,
    pub delay: i64,
    pub menu_visible: bool,
    pub clock_speed: u64,
    pub dependencies: Vec<u64>,
}

impl SchematicHeader {
    /// Read the header from the start of a schematic file
    ///
    /// ```rust
    /// use tcsave::{encode_save, FormatVersion, SchematicHeader};
    /// let mut payload = Vec::new();
    /// payload.extend_from_slice(&0x1234u64.to_le_bytes()); // id
    /// payload.extend_from_slice(&[0; 4]); // hub id
    /// payload.extend_from_slice(&30i64.to_le_bytes()); // gate
    /// payload.extend_from_slice(&6i64.to_le_bytes()); // delay
    /// payload.push(1); // visible
    /// payload.extend_from_slice(&[0; 4]); // clock speed
    /// payload.extend_from_slice(&[1, 0]); // one dependency
    /// payload.extend_from_slice(&0x99u64.to_le_bytes());
    ///
    /// let data = encode_save(FormatVersion::new(6)?, &payload);
    /// let header = SchematicHeader::from_slice(&data)?;
    /// assert_eq!(header.id, 0x1234);
    /// assert_eq!(header.gate, 30);
    /// assert_eq!(header.dependencies, vec![0x99]);
    /// # Ok::<(), tcsave::Error>(())
    /// ```
    pub fn from_slice(data: &[u8]) -> Result<Self, Error> {
        let file = SaveFile::from_slice(data)?;
        Self::from_file(&file)
    }

    pub fn from_file(file: &SaveFile) -> Result<Self, Error> {
        Self::read(file.version(), &mut file.decompressor()?)
    }

    /// Expand the header prefix of the stream and decode it
    pub fn read(version: FormatVersion, decompressor: &mut Decompressor) -> Result<Self, Error> {
        let schema = model::header(version);
        let prefix = schema.min_width();

        // The dependency count is the final fixed width field
        let count = decompressor
            .fill_to(prefix)?
            .get(prefix - 2..prefix)
            .map_or(0, le_uint) as usize;

        let data = decompressor.fill_to(prefix + count * 8)?;
        let record = schema.from_slice(data)?;
        Self::from_record(&record)
    }

    /// Read only the identity, which occupies the first 8 bytes of the
    /// decompressed body
    pub fn read_id(decompressor: &mut Decompressor) -> Result<u64, Error> {
        let data = decompressor.fill_to(8)?;
        let (id, _) = get_split::<8>(data).ok_or_else(|| {
            RecordError::new(
                RecordErrorKind::Truncated {
                    needed: 8,
                    available: data.len(),
                },
                0,
            )
            .within(Frame::Field {
                record: model::SCHEMATIC,
                field: "custom_id",
                offset: 0,
            })
        })?;
        Ok(u64::from_le_bytes(id))
    }

    fn from_record(record: &Record) -> Result<Self, Error> {
        let dependencies = record
            .get("dependencies")
            .and_then(Value::as_list)
            .and_then(|list| {
                list.iter()
                    .map(|x| x.as_i64().map(|id| id as u64))
                    .collect::<Option<Vec<_>>>()
            })
            .ok_or_else(|| shape(model::SCHEMATIC, "dependencies", "a list of integers"))?;

        Ok(SchematicHeader {
            id: integer(record, "custom_id")? as u64,
            hub_id: integer(record, "hub_id")? as u32,
            gate: integer(record, "gate")?,
            delay: integer(record, "delay")?,
            menu_visible: integer(record, "menu_visible")? != 0,
            clock_speed: record
                .get("clock_speed")
                .and_then(Value::as_u64)
                .ok_or_else(|| shape(model::SCHEMATIC, "clock_speed", "an integer"))?,
            dependencies,
        })
    }
}

fn integer(record: &Record, field: &'static str) -> Result<i64, Error> {
    record
        .get(field)
        .and_then(Value::as_i64)
        .ok_or_else(|| shape(model::SCHEMATIC, field, "an integer"))
}

/// A custom component definition known to a [Catalog]
#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry<'a> {
    name: &'a str,
    file: SaveFile<'a>,
}

impl<'a> CatalogEntry<'a> {
    /// The component's folder, relative to the component factory, with `/`
    /// separators
    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn file(&self) -> SaveFile<'a> {
        self.file
    }

    pub fn data(&self) -> &'a [u8] {
        self.file.data()
    }

    pub fn header(&self) -> Result<SchematicHeader, Error> {
        SchematicHeader::from_file(&self.file)
    }
}

/// Every custom component definition that dependencies can resolve to,
/// keyed by identity.
///
/// The catalog borrows the names and file contents it is given. Building it
/// reads only the identity of each file.
#[derive(Debug, Default, Clone)]
pub struct Catalog<'a> {
    entries: HashMap<u64, CatalogEntry<'a>>,
}

impl<'a> Catalog<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component definition, returning its identity. When another
    /// definition already has the same identity it is replaced.
    pub fn insert(&mut self, name: &'a str, data: &'a [u8]) -> Result<u64, Error> {
        let file = SaveFile::from_slice(data)?;
        let id = SchematicHeader::read_id(&mut file.decompressor()?)?;
        trace!("{:016X} -> {}", id, name);

        let entry = CatalogEntry { name, file };
        match self.entries.entry(id) {
            Entry::Occupied(mut existing) => {
                warn!(
                    "components {} and {} share the id {:016X}, keeping {}",
                    existing.get().name,
                    name,
                    id,
                    name
                );
                existing.insert(entry);
            }
            Entry::Vacant(slot) => {
                slot.insert(entry);
            }
        }

        Ok(id)
    }

    pub fn get(&self, id: u64) -> Option<&CatalogEntry<'a>> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &CatalogEntry<'a>)> + '_ {
        self.entries.iter().map(|(id, entry)| (*id, entry))
    }

    /// Compute every component reachable from the dependency list of the
    /// schematic `root`.
    ///
    /// Each id is visited once, so shared and cyclic dependencies are fine.
    /// The root itself is never part of the result. Fails as soon as a
    /// dependency list containing 0 is read, or on the first unknown id.
    pub fn resolve(&self, root: u64, dependencies: &[u64]) -> Result<BTreeSet<u64>, Error> {
        debug!("{:016X} depends on {}", root, format_ids(dependencies));
        check_dependencies(root, dependencies)?;

        let mut visited = BTreeSet::new();
        let mut pending: Vec<u64> = dependencies.iter().rev().copied().collect();

        while let Some(id) = pending.pop() {
            if id == root || !visited.insert(id) {
                continue;
            }

            let entry = self
                .get(id)
                .ok_or_else(|| Error::new(ErrorKind::MissingDependency { id }))?;

            let header = entry.header()?;
            debug!(
                "{:016X} ({}) depends on {}",
                id,
                entry.name,
                format_ids(&header.dependencies)
            );
            check_dependencies(id, &header.dependencies)?;
            pending.extend(header.dependencies.iter().rev());
        }

        Ok(visited)
    }

    /// Resolve dependencies and return the matching entries ordered by name
    pub fn closure(
        &self,
        root: u64,
        dependencies: &[u64],
    ) -> Result<Vec<&CatalogEntry<'a>>, Error> {
        let ids = self.resolve(root, dependencies)?;
        let mut by_name = BTreeMap::new();
        for id in ids {
            if let Some(entry) = self.get(id) {
                if let btree_map::Entry::Vacant(slot) = by_name.entry(entry.name) {
                    slot.insert(entry);
                }
            }
        }

        Ok(by_name.into_values().collect())
    }
}

/// The game writes 0 for components that are corrupt or were never saved
fn check_dependencies(parent: u64, dependencies: &[u64]) -> Result<(), Error> {
    if dependencies.contains(&0) {
        Err(Error::new(ErrorKind::CorruptDependency { parent }))
    } else {
        Ok(())
    }
}

fn format_ids(ids: &[u64]) -> String {
    let hex: Vec<_> = ids.iter().map(|id| format!("{:016X}", id)).collect();
    format!("[{}]", hex.join(", "))
}
