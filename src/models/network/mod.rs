//! Common network-related structs.

mod afi;
mod asn;
mod nexthop;
mod prefix;

pub use afi::*;
pub use asn::*;
pub use nexthop::*;
pub use prefix::*;
