/*!
Data structures for MRT containers, BGP messages and the records derived from them.

Structs are named after the formal definitions in the RFCs they come from:
[RFC 4271](https://datatracker.ietf.org/doc/html/rfc4271) (BGP-4),
[RFC 4760](https://datatracker.ietf.org/doc/html/rfc4760) (multiprotocol extensions),
[RFC 6396](https://datatracker.ietf.org/doc/html/rfc6396) (MRT),
[RFC 6793](https://datatracker.ietf.org/doc/html/rfc6793) (4-octet ASN),
[RFC 8050](https://datatracker.ietf.org/doc/html/rfc8050) (MRT with ADD-PATH).
*/

mod bgp;
mod mrt;
mod network;
mod update;

pub use bgp::*;
pub use mrt::*;
pub use network::*;
pub use update::*;
