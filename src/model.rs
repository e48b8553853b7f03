//! Record schemas of the schematic save format.
//!
//! ```text
//! Schematic
//! ├── custom_id, hub_id, gate, delay, menu_visible, clock_speed
//! ├── dependencies: [i64]
//! ├── description, camera_position: Point, synced, reserved
//! ├── player_data: [u64], hub_description
//! ├── components: [Component] (8 byte count)
//! │   ├── component_kind, position: Point, rotation, permanent_id
//! │   ├── custom_string, settings: [u64]
//! │   ├── buffer_size, ui_order, word_size
//! │   ├── linked_components: [LinkedComponent]
//! │   ├── selected_programs: [(text, text)]
//! │   └── custom_data: CustomCompData (only when component_kind == 78)
//! └── wires: remaining bytes, never interpreted
//! ```

use crate::{
    schema::{Codec, Record, RecordSchema, Value},
    FormatVersion,
};

/// Component kind of a custom component that embeds another schematic
pub const CUSTOM_COMPONENT_KIND: u64 = 78;

/// Component kind of the RAM component
pub const RAM_COMPONENT_KIND: u64 = 118;

pub const POINT: &str = "Point";
pub const LINKED_COMPONENT: &str = "LinkedComponent";
pub const CUSTOM_COMP_DATA: &str = "CustomCompData";
pub const COMPONENT: &str = "Component";
pub const SCHEMATIC: &str = "Schematic";

pub fn point() -> RecordSchema {
    RecordSchema::new(POINT)
        .field("x", Codec::signed(2))
        .field("y", Codec::signed(2))
}

pub fn linked_component() -> RecordSchema {
    RecordSchema::new(LINKED_COMPONENT)
        .field("permanent_id", Codec::signed(8))
        .field("inner_id", Codec::signed(8))
        .field("name", Codec::text())
        .field("offset", Codec::signed(8))
}

pub fn custom_comp_data() -> RecordSchema {
    RecordSchema::new(CUSTOM_COMP_DATA)
        .field("custom_id", Codec::signed(8))
        .field(
            "static_states",
            Codec::seq(Codec::pair(Codec::signed(8), Codec::signed(8))),
        )
}

fn is_custom_component(component: &Record) -> bool {
    component.get("component_kind").and_then(Value::as_u64) == Some(CUSTOM_COMPONENT_KIND)
}

pub fn component() -> RecordSchema {
    RecordSchema::new(COMPONENT)
        .field("component_kind", Codec::unsigned(2))
        .field("position", Codec::record(point()))
        .field("rotation", Codec::unsigned(1))
        .field("permanent_id", Codec::unsigned(8))
        .field("custom_string", Codec::text())
        .field("settings", Codec::seq(Codec::unsigned(8)))
        .field("buffer_size", Codec::signed(8))
        .field("ui_order", Codec::signed(2))
        .field("word_size", Codec::signed(8))
        .field(
            "linked_components",
            Codec::seq(Codec::record(linked_component())),
        )
        .field(
            "selected_programs",
            Codec::seq(Codec::pair(Codec::text(), Codec::text())),
        )
        .field_if(
            "custom_data",
            Codec::record(custom_comp_data()),
            is_custom_component,
        )
}

/// The fixed prefix of the root record, up to and including the dependency
/// list. Its layout is stable across every supported version apart from
/// the clock speed width.
pub fn header(version: FormatVersion) -> RecordSchema {
    RecordSchema::new(SCHEMATIC)
        .field("custom_id", Codec::signed(8))
        .field("hub_id", Codec::unsigned(4))
        .field("gate", Codec::signed(8))
        .field("delay", Codec::signed(8))
        .field("menu_visible", Codec::unsigned(1))
        .field("clock_speed", Codec::unsigned(version.clock_speed_width()))
        .field("dependencies", Codec::seq(Codec::signed(8)))
}

/// The root record. The clock speed width depends on the format version.
pub fn schematic(version: FormatVersion) -> RecordSchema {
    header(version)
        .field("description", Codec::text())
        .field("camera_position", Codec::record(point()))
        .field("synced", Codec::unsigned(1))
        .field("reserved", Codec::unsigned(2))
        .field("player_data", Codec::seq(Codec::unsigned(8)))
        .field("hub_description", Codec::text())
        .field(
            "components",
            Codec::seq_with(Codec::signed(8), Codec::record(component())),
        )
        .field("wires", Codec::remainder())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point_value(x: i64, y: i64) -> Record {
        Record::new(POINT).with("x", x).with("y", y)
    }

    fn component_record(kind: u64, id: u64) -> Record {
        let record = Record::new(COMPONENT)
            .with("component_kind", kind)
            .with("position", point_value(-4, 12))
            .with("rotation", 2u64)
            .with("permanent_id", id)
            .with("custom_string", "label")
            .with("settings", vec![Value::Unsigned(1), Value::Unsigned(2)])
            .with("buffer_size", 0i64)
            .with("ui_order", -1i64)
            .with("word_size", 8i64)
            .with(
                "linked_components",
                vec![Value::Record(
                    Record::new(LINKED_COMPONENT)
                        .with("permanent_id", 5i64)
                        .with("inner_id", 6i64)
                        .with("name", "")
                        .with("offset", -7i64),
                )],
            )
            .with(
                "selected_programs",
                vec![Value::pair("main", "add r0 r1")],
            );

        if kind == CUSTOM_COMPONENT_KIND {
            record.with(
                "custom_data",
                Record::new(CUSTOM_COMP_DATA)
                    .with("custom_id", 0x1234i64)
                    .with("static_states", vec![Value::pair(1i64, -1i64)]),
            )
        } else {
            record
        }
    }

    #[test]
    fn test_component_custom_data_roundtrip() {
        let schema = component();
        for kind in [1, CUSTOM_COMPONENT_KIND, RAM_COMPONENT_KIND] {
            let record = component_record(kind, 99);
            let data = schema.to_vec(&record).unwrap();
            let (decoded, end) = schema.decode(&data, 0).unwrap();
            assert_eq!(end, data.len());
            assert_eq!(decoded, record);
            assert_eq!(decoded.contains("custom_data"), kind == CUSTOM_COMPONENT_KIND);
            assert_eq!(schema.to_vec(&decoded).unwrap(), data);
        }
    }

    #[test]
    fn test_custom_data_follows_programs() {
        let plain = component().to_vec(&component_record(1, 99)).unwrap();
        let custom = component()
            .to_vec(&component_record(CUSTOM_COMPONENT_KIND, 99))
            .unwrap();

        // custom id (8) + state count (2) + one pair (16)
        assert_eq!(custom.len(), plain.len() + 26);
        assert_eq!(&custom[2..plain.len()], &plain[2..]);
        assert_eq!(&custom[plain.len()..plain.len() + 8], &0x1234i64.to_le_bytes());
    }

    #[test]
    fn test_clock_speed_width() {
        let legacy = FormatVersion::new(6).unwrap();
        assert_eq!(
            schematic(FormatVersion::CURRENT).min_width(),
            schematic(legacy).min_width() + 4
        );
        assert_eq!(header(legacy).min_width(), 35);
        assert_eq!(header(FormatVersion::CURRENT).min_width(), 39);
    }
}
