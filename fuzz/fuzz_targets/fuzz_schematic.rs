#![no_main]
use libfuzzer_sys::fuzz_target;
use tcsave::{FormatVersion, Schematic};

fuzz_target!(|data: &[u8]| {
    // Treat the input as an already decompressed body
    let Ok(schematic) = Schematic::from_payload(FormatVersion::CURRENT, data) else {
        return;
    };

    let encoded = schematic.to_payload().unwrap();
    assert_eq!(encoded, data);
});
