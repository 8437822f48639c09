/*!
`bgpkit-mirror` keeps a mirror of route collectors' MRT update archives and converts them into
newline-delimited JSON for analytical loading.

The crate has two halves:

- **Decoding and conversion**: [parser] frames MRT records and decodes BGP4MP updates into
  [models], and [converter] turns a whole bzip2 archive into gzip-compressed JSON lines, one
  [UpdateRow](models::UpdateRow) per update.
- **Synchronization**: [sync] lists the archives of a time window at the [origin], compares them
  by MD5 with the [store], and uploads the missing or changed ones, collector by collector.

External services are traits ([ArchiveOrigin](origin::ArchiveOrigin),
[ArchiveStore](store::ArchiveStore), [ArchiveUploader](store::ArchiveUploader)) handed to each
component at construction, with filesystem and HTTP implementations included.

# Examples

## Converting an archive

```no_run
use bgpkit_mirror::converter::convert;

let src = std::fs::File::open("updates.20220427.1900.bz2").unwrap();
let dst = std::fs::File::create("updates.20220427.1900.gz").unwrap();
let stats = convert("route-views2", src, dst).unwrap();
println!("{} updates from {} records", stats.updates, stats.records);
```

## Decoding records

```no_run
use bgpkit_mirror::parser::{decode, RecordReader};

let file = std::fs::File::open("updates.20220427.1900").unwrap();
for (header, payload) in RecordReader::new(file).flatten() {
    if let Ok(record) = decode(Some(&header), payload, "route-views2") {
        if let Some(update) = record.update() {
            println!("{} announced {}", update.peer_asn, update.announced.len());
        }
    }
}
```

## Supported RFCs

- [X] [RFC 4271](https://datatracker.ietf.org/doc/html/rfc4271): A Border Gateway Protocol 4 (BGP-4)
- [X] [RFC 4760](https://datatracker.ietf.org/doc/html/rfc4760): Multiprotocol Extensions for BGP-4
- [X] [RFC 6396](https://datatracker.ietf.org/doc/html/rfc6396): Multi-Threaded Routing Toolkit (MRT) Routing Information Export Format
- [X] [RFC 6793](https://datatracker.ietf.org/doc/html/rfc6793): BGP Support for Four-Octet Autonomous System (AS) Number Space
- [X] [RFC 8050](https://datatracker.ietf.org/doc/html/rfc8050): MRT Routing Information Export Format with BGP Additional Path Extensions
- [X] [RFC 8092](https://datatracker.ietf.org/doc/html/rfc8092): BGP Large Communities
- [X] [RFC 9234](https://datatracker.ietf.org/doc/html/rfc9234): Route Leak Prevention and Detection Using Roles in UPDATE and OPEN Messages
*/

pub mod archive;
pub mod converter;
pub mod encoder;
pub mod error;
pub mod models;
pub mod origin;
pub mod parser;
pub mod store;
pub mod sync;

pub use error::*;
