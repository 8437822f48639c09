/*!
MRT record framing and BGP4MP decoding.
*/
pub mod bgp4mp;
pub mod mrt_header;

pub use bgp4mp::{decode, parse_bgp4mp_message, parse_bgp4mp_state_change};
pub use mrt_header::{parse_common_header, RecordReader};
