#![no_main]
use libfuzzer_sys::fuzz_target;
use tcsave::{Catalog, SchematicHeader};

fuzz_target!(|data: &[u8]| {
    let _ = SchematicHeader::from_slice(data);

    let mut catalog = Catalog::new();
    if let Ok(id) = catalog.insert("fuzz", data) {
        let _ = catalog.resolve(0, &[id]);
    }
});
