#![no_main]
use libfuzzer_sys::fuzz_target;
use bytes::Bytes;
use bgpkit_mirror::parser::AttributeParser;
use bgpkit_mirror::models::AsnLength;

fuzz_target!(|data: &[u8]| {
    let bytes = Bytes::copy_from_slice(data);
    let _ = AttributeParser::new(false).parse_attributes(bytes.clone(), &AsnLength::Bits16);
    let _ = AttributeParser::new(true).parse_attributes(bytes, &AsnLength::Bits32);
});
