use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Next hop carried in an MP_REACH_NLRI attribute.
///
/// IPv6 next hops may be followed by a link-local address (32-byte next hop field), which is
/// kept but not displayed.
#[derive(Debug, PartialEq, Copy, Clone, Eq)]
pub enum NextHopAddress {
    Ipv4(Ipv4Addr),
    Ipv6(Ipv6Addr),
    Ipv6LinkLocal(Ipv6Addr, Ipv6Addr),
}

impl NextHopAddress {
    pub const fn addr(&self) -> IpAddr {
        match self {
            NextHopAddress::Ipv4(v) => IpAddr::V4(*v),
            NextHopAddress::Ipv6(v) => IpAddr::V6(*v),
            NextHopAddress::Ipv6LinkLocal(v, _) => IpAddr::V6(*v),
        }
    }
}

impl From<IpAddr> for NextHopAddress {
    fn from(value: IpAddr) -> Self {
        match value {
            IpAddr::V4(v) => NextHopAddress::Ipv4(v),
            IpAddr::V6(v) => NextHopAddress::Ipv6(v),
        }
    }
}

impl Display for NextHopAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.addr())
    }
}

impl Serialize for NextHopAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}
