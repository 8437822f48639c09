use crate::models::*;
use serde::Serialize;

/// Network Layer Reachability Information carried in MP_REACH_NLRI / MP_UNREACH_NLRI.
#[derive(Debug, PartialEq, Clone, Eq, Serialize)]
pub struct Nlri {
    pub afi: Afi,
    pub safi: Safi,
    /// Only present for reachable NLRI.
    pub next_hop: Option<NextHopAddress>,
    pub prefixes: Vec<NetworkPrefix>,
}

impl Nlri {
    /// Returns true if this NLRI refers to the IPv4 address space.
    pub const fn is_ipv4(&self) -> bool {
        matches!(self.afi, Afi::Ipv4)
    }

    /// Returns true if this NLRI refers to the IPv6 address space.
    pub const fn is_ipv6(&self) -> bool {
        matches!(self.afi, Afi::Ipv6)
    }

    /// Returns true if this NLRI refers to reachable prefixes
    pub const fn is_reachable(&self) -> bool {
        self.next_hop.is_some()
    }
}
