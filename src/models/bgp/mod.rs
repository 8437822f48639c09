//! BGP messages and relevant structs.

pub mod attributes;
pub mod community;

pub use attributes::*;
pub use community::*;

use crate::models::network::*;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::Serialize;

#[allow(non_camel_case_types)]
#[derive(Debug, TryFromPrimitive, IntoPrimitive, Copy, Clone, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum BgpMessageType {
    OPEN = 1,
    UPDATE = 2,
    NOTIFICATION = 3,
    KEEPALIVE = 4,
    ROUTE_REFRESH = 5,
}

/// A BGP message. Only UPDATE bodies are decoded; the others are identified by type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BgpMessage {
    Update(BgpUpdateMessage),
    Other(BgpMessageType),
}

/// BGP Update Message
///
/// ```text
/// +-----------------------------------------------------+
/// |   Withdrawn Routes Length (2 octets)                |
/// +-----------------------------------------------------+
/// |   Withdrawn Routes (variable)                       |
/// +-----------------------------------------------------+
/// |   Total Path Attribute Length (2 octets)            |
/// +-----------------------------------------------------+
/// |   Path Attributes (variable)                        |
/// +-----------------------------------------------------+
/// |   Network Layer Reachability Information (variable) |
/// +-----------------------------------------------------+
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BgpUpdateMessage {
    /// Withdrawn prefixes in this update message.
    ///
    /// **IMPORTANT:** Do **not** access this field directly in order to get all withdrawn prefixes.
    /// Some withdrawn prefixes may be in the `MP_UNREACH_NLRI` attribute.
    /// Use [BgpUpdateMessage::all_withdrawn] instead.
    pub withdrawn_prefixes: Vec<NetworkPrefix>,

    pub attributes: Attributes,

    /// Announced prefixes in this update message.
    ///
    /// **IMPORTANT:** Do **not** access this field directly in order to get all announced prefixes.
    /// Some announced prefixes may be in the `MP_REACH_NLRI` attribute.
    /// Use [BgpUpdateMessage::all_announced] instead.
    pub announced_prefixes: Vec<NetworkPrefix>,
}

impl BgpUpdateMessage {
    /// Classic NLRI followed by MP_REACH_NLRI prefixes.
    pub fn all_announced(&self) -> Vec<NetworkPrefix> {
        self.announced_prefixes
            .iter()
            .chain(self.attributes.mp_reach_prefixes())
            .copied()
            .collect()
    }

    /// Classic withdrawn routes followed by MP_UNREACH_NLRI prefixes.
    pub fn all_withdrawn(&self) -> Vec<NetworkPrefix> {
        self.withdrawn_prefixes
            .iter()
            .chain(self.attributes.mp_unreach_prefixes())
            .copied()
            .collect()
    }

    /// An update is an end-of-rib marker if it carries nothing at all.
    pub fn is_end_of_rib(&self) -> bool {
        self.withdrawn_prefixes.is_empty()
            && self.announced_prefixes.is_empty()
            && self.attributes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_all_announced_includes_mp_reach() {
        let mut msg = BgpUpdateMessage {
            announced_prefixes: vec![NetworkPrefix::from_str("10.0.0.0/8").unwrap()],
            ..Default::default()
        };
        msg.attributes.insert(Attribute {
            value: AttributeValue::MpReachNlri(Nlri {
                afi: Afi::Ipv6,
                safi: Safi::Unicast,
                next_hop: None,
                prefixes: vec![NetworkPrefix::from_str("2001:db8::/32").unwrap()],
            }),
            flag: AttrFlags::OPTIONAL,
        });
        let announced: Vec<String> = msg.all_announced().iter().map(|p| p.to_string()).collect();
        assert_eq!(announced, vec!["10.0.0.0/8", "2001:db8::/32"]);
        assert!(msg.all_withdrawn().is_empty());
        assert!(!msg.is_end_of_rib());
        assert!(BgpUpdateMessage::default().is_end_of_rib());
    }
}
