#![no_main]
use libfuzzer_sys::fuzz_target;
use bgpkit_mirror::parser::{decode, RecordReader};

fuzz_target!(|data: &[u8]| {
    for record in RecordReader::new(data) {
        let Ok((header, payload)) = record else {
            break;
        };
        let _ = decode(Some(&header), payload, "route-views2");
    }
});
