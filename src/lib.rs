/*!

A low level reader and writer for [Turing Complete](https://turingcomplete.game/) schematic
save files (`circuit.data`).

## Features

- ✔ Lazy: Read a schematic's identity and dependencies without expanding the whole file
- ✔ Lossless: Untouched fields re-encode to the exact bytes they were read from
- ✔ Declarative: Record layouts are data, shared by the decoder and encoder
- ✔ Debuggable: Every decode failure names the field path and byte offset it happened at
- ✔ Safe: Fuzzed against malicious input, never panics on corrupt files

## Quick Start

A schematic file is a version byte followed by a snappy compressed body. Version 10 files can be
decoded into a tree of records, modified, and written back out.

```rust
use tcsave::{model, schema::Value, Schematic};
# use tcsave::{schema::Record, FormatVersion};
# let components = vec![
#     Value::Record(
#         Record::new(model::COMPONENT)
#             .with("component_kind", 118u64)
#             .with("position", Record::new(model::POINT).with("x", 0i64).with("y", 0i64))
#             .with("rotation", 0u64)
#             .with("permanent_id", 1u64)
#             .with("custom_string", "")
#             .with("settings", Vec::<Value>::new())
#             .with("buffer_size", 256i64)
#             .with("ui_order", 0i64)
#             .with("word_size", 8i64)
#             .with("linked_components", Vec::<Value>::new())
#             .with("selected_programs", Vec::<Value>::new()),
#     ),
# ];
# let root = Record::new(model::SCHEMATIC)
#     .with("custom_id", 0x77i64)
#     .with("hub_id", 0u64)
#     .with("gate", 12i64)
#     .with("delay", 4i64)
#     .with("menu_visible", 1u64)
#     .with("clock_speed", 100u64)
#     .with("dependencies", Vec::<Value>::new())
#     .with("description", "")
#     .with("camera_position", Record::new(model::POINT).with("x", 0i64).with("y", 0i64))
#     .with("synced", 0u64)
#     .with("reserved", 0u64)
#     .with("player_data", Vec::<Value>::new())
#     .with("hub_description", "")
#     .with("components", components)
#     .with("wires", Vec::<u8>::new());
# let data = Schematic::new(FormatVersion::CURRENT, root).to_vec()?;
let mut schematic = Schematic::from_slice(&data)?;
for component in schematic.components_mut()? {
    let component = component.as_record_mut().unwrap();
    if component.get("component_kind") == Some(&Value::Unsigned(model::RAM_COMPONENT_KIND)) {
        component.set("word_size", 64i64);
    }
}

let patched = schematic.to_vec()?;
# assert_ne!(patched, data);
# Ok::<(), tcsave::Error>(())
```

## Dependencies

Custom components are stored as their own schematics and referenced by id. A [Catalog] of every
known component resolves the transitive set an architecture needs, reading only the header of
each file:

```rust
use tcsave::{encode_save, Catalog, FormatVersion, SchematicHeader};

fn file(id: u64, dependencies: &[u64]) -> Vec<u8> {
    let mut payload = id.to_le_bytes().to_vec();
    payload.extend_from_slice(&[0; 29]);
    payload.extend_from_slice(&(dependencies.len() as u16).to_le_bytes());
    for dep in dependencies {
        payload.extend_from_slice(&dep.to_le_bytes());
    }
    encode_save(FormatVersion::CURRENT, &payload)
}

let (adder, gate) = (file(2, &[3]), file(3, &[]));
let mut catalog = Catalog::new();
catalog.insert("adder", &adder)?;
catalog.insert("gate", &gate)?;

let header = SchematicHeader::from_slice(&file(1, &[2]))?;
let ids = catalog.resolve(header.id, &header.dependencies)?;
assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec![2, 3]);
# Ok::<(), tcsave::Error>(())
```

## One Level Lower

The [compression] module exposes the lazy decompressor, and [schema] the record combinators the
schematic layout in [model] is built from. Either can be used on their own.

*/

pub mod compression;
mod deps;
mod errors;
mod file;
#[cfg(feature = "cli")]
pub mod install;
#[cfg(feature = "cli")]
pub mod logging;
pub mod model;
mod package;
mod patch;
pub mod schema;
mod schematic;
pub(crate) mod util;
pub mod varint;

pub use self::deps::{Catalog, CatalogEntry, SchematicHeader};
pub use self::errors::*;
pub use self::file::{encode_save, FormatVersion, SaveFile};
pub use self::package::{PackageEntry, PackagePlan, Packager};
pub use self::patch::{fix_rams, RamPatch};
pub use self::schematic::Schematic;
