/*!
parser module decodes decompressed MRT bytes into [DecodedRecord](crate::models::DecodedRecord)s.

The work is split in two steps so that callers can tell a broken stream from a broken record:

1. [RecordReader] frames records out of any [Read](std::io::Read). It fails only when the stream
   ends in the middle of a record.
2. [decode] turns one framed record into a [DecodedRecord](crate::models::DecodedRecord). Its
   errors concern that record alone.

```no_run
use bgpkit_mirror::parser::{decode, RecordReader};

let file = std::fs::File::open("updates.20220427.1900").unwrap();
for record in RecordReader::new(file) {
    let (header, payload) = record.unwrap();
    match decode(Some(&header), payload, "route-views2") {
        Ok(decoded) => println!("{:?}", decoded),
        Err(e) => eprintln!("skipping record: {}", e),
    }
}
```
*/
pub mod bgp;
pub mod mrt;
pub mod utils;

pub use self::utils::*;
pub use bgp::attributes::AttributeParser;
pub use mrt::{decode, parse_common_header, RecordReader};

pub use crate::error::ParserError;
