use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tcsave::{
    compression::{compress_literal, Decompressor},
    model,
    schema::{Record, Value},
    varint::write_varint,
    FormatVersion, Schematic, SchematicHeader,
};

/// A 64 byte literal followed by `copies` back references to it
fn repetitive_stream(copies: usize) -> Vec<u8> {
    let mut out = Vec::new();
    write_varint(64 + copies as u64 * 64, &mut out);
    out.push(60 << 2);
    out.push(63);
    out.extend((0..64).map(|x| x as u8));
    for _ in 0..copies {
        out.push((63 << 2) | 0b10);
        out.extend_from_slice(&64u16.to_le_bytes());
    }
    out
}

fn point() -> Record {
    Record::new(model::POINT).with("x", 3i64).with("y", -4i64)
}

fn architecture(components: usize) -> Vec<u8> {
    let components: Vec<Value> = (0..components)
        .map(|i| {
            Value::Record(
                Record::new(model::COMPONENT)
                    .with("component_kind", (i % 120) as u64)
                    .with("position", point())
                    .with("rotation", 0u64)
                    .with("permanent_id", i as u64)
                    .with("custom_string", "label")
                    .with("settings", vec![Value::Unsigned(1)])
                    .with("buffer_size", 0i64)
                    .with("ui_order", 0i64)
                    .with("word_size", 8i64)
                    .with("linked_components", Vec::<Value>::new())
                    .with("selected_programs", Vec::<Value>::new()),
            )
        })
        .map(|mut component| {
            let record = component.as_record_mut().unwrap();
            if record.get("component_kind") == Some(&Value::Unsigned(model::CUSTOM_COMPONENT_KIND)) {
                record.set(
                    "custom_data",
                    Record::new(model::CUSTOM_COMP_DATA)
                        .with("custom_id", 1i64)
                        .with("static_states", Vec::<Value>::new()),
                );
            }
            component
        })
        .collect();

    let root = Record::new(model::SCHEMATIC)
        .with("custom_id", 1i64)
        .with("hub_id", 0u64)
        .with("gate", 100i64)
        .with("delay", 10i64)
        .with("menu_visible", 0u64)
        .with("clock_speed", 0u64)
        .with("dependencies", vec![Value::Signed(2), Value::Signed(3)])
        .with("description", "")
        .with("camera_position", point())
        .with("synced", 0u64)
        .with("reserved", 0u64)
        .with("player_data", Vec::<Value>::new())
        .with("hub_description", "")
        .with("components", components)
        .with("wires", vec![0u8; 4096]);

    Schematic::new(FormatVersion::CURRENT, root).to_vec().unwrap()
}

pub fn decompress_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("decompress");
    for copies in [16, 256, 4096].iter() {
        let data = repetitive_stream(*copies);
        group.throughput(Throughput::Bytes(64 + *copies as u64 * 64));
        group.bench_with_input(BenchmarkId::new("copies", copies), &data, |b, data| {
            b.iter(|| Decompressor::new(black_box(data)).unwrap().into_vec().unwrap())
        });
    }

    let literal = compress_literal(&vec![0xab; 1 << 16]);
    group.throughput(Throughput::Bytes(1 << 16));
    group.bench_function("literal", |b| {
        b.iter(|| Decompressor::new(black_box(&literal)).unwrap().into_vec().unwrap())
    });
    group.finish();
}

pub fn schematic_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("schematic");
    for components in [10, 1000].iter() {
        let data = architecture(*components);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("decode", components), &data, |b, data| {
            b.iter(|| Schematic::from_slice(black_box(data)).unwrap())
        });

        let schematic = Schematic::from_slice(&data).unwrap();
        group.bench_with_input(
            BenchmarkId::new("encode", components),
            &schematic,
            |b, schematic| b.iter(|| schematic.to_vec().unwrap()),
        );

        group.bench_with_input(BenchmarkId::new("header", components), &data, |b, data| {
            b.iter(|| SchematicHeader::from_slice(black_box(data)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, decompress_benchmark, schematic_benchmark);
criterion_main!(benches);
