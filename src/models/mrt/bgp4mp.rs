//! MRT BGP4MP structs
use crate::models::*;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::Serialize;
use std::net::IpAddr;

/// BGP states enum.
#[derive(Debug, TryFromPrimitive, IntoPrimitive, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[repr(u16)]
pub enum BgpState {
    Idle = 1,
    Connect = 2,
    Active = 3,
    OpenSent = 4,
    OpenConfirm = 5,
    Established = 6,
}

/// BGP4MP message subtypes.
#[derive(Debug, TryFromPrimitive, IntoPrimitive, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[repr(u16)]
pub enum Bgp4MpType {
    StateChange = 0,
    Message = 1,
    MessageAs4 = 4,
    StateChangeAs4 = 5,
    MessageLocal = 6,
    MessageAs4Local = 7,
    MessageAddpath = 8,
    MessageAs4Addpath = 9,
    MessageLocalAddpath = 10,
    MessageLocalAs4Addpath = 11,
}

impl Bgp4MpType {
    pub const fn asn_len(&self) -> AsnLength {
        match self {
            Bgp4MpType::StateChange
            | Bgp4MpType::Message
            | Bgp4MpType::MessageLocal
            | Bgp4MpType::MessageAddpath
            | Bgp4MpType::MessageLocalAddpath => AsnLength::Bits16,
            _ => AsnLength::Bits32,
        }
    }

    pub const fn is_add_path(&self) -> bool {
        matches!(
            self,
            Bgp4MpType::MessageAddpath
                | Bgp4MpType::MessageAs4Addpath
                | Bgp4MpType::MessageLocalAddpath
                | Bgp4MpType::MessageLocalAs4Addpath
        )
    }

    pub const fn is_state_change(&self) -> bool {
        matches!(self, Bgp4MpType::StateChange | Bgp4MpType::StateChangeAs4)
    }

    /// Messages sent by the collector itself rather than received from the peer.
    pub const fn is_local(&self) -> bool {
        matches!(
            self,
            Bgp4MpType::MessageLocal
                | Bgp4MpType::MessageAs4Local
                | Bgp4MpType::MessageLocalAddpath
                | Bgp4MpType::MessageLocalAs4Addpath
        )
    }
}

/// The peering information that precedes both BGP4MP messages and state changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bgp4MpPeer {
    pub peer_asn: Asn,
    pub local_asn: Asn,
    pub interface_index: u16,
    pub peer_ip: IpAddr,
    pub local_ip: IpAddr,
}

/// BGP4MP state change message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bgp4MpStateChange {
    pub msg_type: Bgp4MpType,
    pub peer: Bgp4MpPeer,
    pub old_state: BgpState,
    pub new_state: BgpState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtype_properties() {
        assert_eq!(Bgp4MpType::Message.asn_len(), AsnLength::Bits16);
        assert_eq!(Bgp4MpType::MessageAs4.asn_len(), AsnLength::Bits32);
        assert_eq!(Bgp4MpType::MessageLocalAddpath.asn_len(), AsnLength::Bits16);
        assert!(Bgp4MpType::MessageAs4Addpath.is_add_path());
        assert!(!Bgp4MpType::MessageAs4.is_add_path());
        assert!(Bgp4MpType::StateChangeAs4.is_state_change());
        assert!(Bgp4MpType::MessageAs4Local.is_local());
        assert!(Bgp4MpType::MessageLocalAs4Addpath.is_local());
        assert!(!Bgp4MpType::MessageAs4Addpath.is_local());
        assert_eq!(Bgp4MpType::try_from(4u16).unwrap(), Bgp4MpType::MessageAs4);
        assert!(Bgp4MpType::try_from(2u16).is_err());
    }
}
