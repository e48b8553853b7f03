#![no_main]
use libfuzzer_sys::fuzz_target;
use tcsave::compression::Decompressor;

fuzz_target!(|data: &[u8]| {
    let Ok(mut decompressor) = Decompressor::new(data) else {
        return;
    };

    // Piecemeal requests must agree with a single full expansion
    let full = Decompressor::new(data).unwrap().into_vec();
    let _ = decompressor.byte(3);
    let _ = decompressor.slice(7..20);
    if let Ok(out) = full {
        let lazy = decompressor.slice(..).unwrap();
        assert_eq!(lazy, out.as_slice());
    }
});
