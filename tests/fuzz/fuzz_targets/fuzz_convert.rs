#![no_main]
use libfuzzer_sys::fuzz_target;
use bgpkit_mirror::converter::convert;

fuzz_target!(|data: &[u8]| {
    let _ = convert("route-views2", data, std::io::sink());
});
