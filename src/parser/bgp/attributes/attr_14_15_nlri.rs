use crate::models::*;
use crate::parser::bgp::attributes::attr_03_next_hop::{encode_mp_next_hop, parse_mp_next_hop};
use crate::parser::{parse_nlri_list, ReadUtils};
use crate::ParserError;
use bytes::{BufMut, Bytes, BytesMut};

use log::warn;

///
/// <https://datatracker.ietf.org/doc/html/rfc4760#section-3>
/// The attribute is encoded as shown below:
/// +---------------------------------------------------------+
/// | Address Family Identifier (2 octets)                    |
/// +---------------------------------------------------------+
/// | Subsequent Address Family Identifier (1 octet)          |
/// +---------------------------------------------------------+
/// | Length of Next Hop Network Address (1 octet)            |
/// +---------------------------------------------------------+
/// | Network Address of Next Hop (variable)                  |
/// +---------------------------------------------------------+
/// | Reserved (1 octet)                                      |
/// +---------------------------------------------------------+
/// | Network Layer Reachability Information (variable)       |
/// +---------------------------------------------------------+
///
/// MP_UNREACH_NLRI carries only the address family and the withdrawn routes.
pub fn parse_nlri(
    mut input: Bytes,
    reachable: bool,        // whether the NLRI is announcements or withdrawals
    additional_paths: bool, // whether the NLRI is part of an additional paths message
) -> Result<AttributeValue, ParserError> {
    let afi = input.read_afi()?;
    let safi = input.read_safi()?;

    let mut next_hop = None;
    if reachable {
        let next_hop_length = input.read_u8()? as usize;
        input.require_n_remaining(next_hop_length, "MP_REACH_NLRI next hop")?;
        let next_hop_bytes = input.split_to(next_hop_length);
        next_hop = parse_mp_next_hop(next_hop_bytes)?;

        // skip reserved byte for reachable NRLI
        if input.read_u8()? != 0 {
            warn!("NRLI reserved byte not 0");
        }
    }

    let prefixes = parse_nlri_list(input, additional_paths, &afi)?;

    let nlri = Nlri {
        afi,
        safi,
        next_hop,
        prefixes,
    };
    match reachable {
        true => Ok(AttributeValue::MpReachNlri(nlri)),
        false => Ok(AttributeValue::MpUnreachNlri(nlri)),
    }
}

/// Encode a NLRI attribute.
pub fn encode_nlri(nlri: &Nlri, reachable: bool) -> Bytes {
    let mut bytes = BytesMut::new();

    // encode address family
    bytes.put_u16(nlri.afi.into());
    bytes.put_u8(nlri.safi.into());

    if reachable {
        match &nlri.next_hop {
            Some(next_hop) => {
                let next_hop_bytes = encode_mp_next_hop(next_hop);
                bytes.put_u8(next_hop_bytes.len() as u8);
                bytes.put_slice(&next_hop_bytes);
            }
            None => bytes.put_u8(0),
        }
        // reserved
        bytes.put_u8(0);
    } else if nlri.next_hop.is_some() {
        warn!("NLRI next hop should not be set for unreachable NLRI");
    }

    // NLRI
    for prefix in &nlri.prefixes {
        bytes.extend(prefix.encode());
    }

    bytes.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipnet::IpNet;
    use std::net::{Ipv4Addr, Ipv6Addr};
    use std::str::FromStr;

    #[test]
    fn test_parsing_nlri_simple() {
        let test_bytes = Bytes::from(vec![
            0x00, 0x01, // address family: IPv4
            0x01, // safi: unicast
            0x04, // next hop length: 4
            0xC0, 0x00, 0x02, 0x01, // next hop: 192.0.2.1
            0x00, // reserved
            // NLRI
            0x18, // 24 bits prefix length
            0xC0, 0x00, 0x02, // 192.0.2
        ]);
        let res = parse_nlri(test_bytes.clone(), true, false);

        if let Ok(AttributeValue::MpReachNlri(nlri)) = res {
            assert_eq!(nlri.afi, Afi::Ipv4);
            assert_eq!(nlri.safi, Safi::Unicast);
            assert_eq!(
                nlri.next_hop,
                Some(NextHopAddress::Ipv4(
                    Ipv4Addr::from_str("192.0.2.1").unwrap()
                ))
            );
            assert_eq!(
                nlri.prefixes,
                vec![NetworkPrefix::from_str("192.0.2.0/24").unwrap()]
            );
            assert_eq!(encode_nlri(&nlri, true), test_bytes);
        } else {
            panic!("Unexpected result: {:?}", res);
        }
    }

    #[test]
    fn test_parsing_nlri_add_path() {
        let test_bytes = Bytes::from(vec![
            0x00, 0x01, // address family: IPv4
            0x01, // safi: unicast
            0x04, // next hop length: 4
            0xC0, 0x00, 0x02, 0x01, // next hop: 192.0.2.1
            0x00, // reserved
            // NLRI
            0x00, 0x00, 0x00, 0x7B, // path_id: 123
            0x18, // 24 bits prefix length
            0xC0, 0x00, 0x02, // 192.0.2
        ]);
        let res = parse_nlri(test_bytes, true, true);

        if let Ok(AttributeValue::MpReachNlri(nlri)) = res {
            let prefix =
                NetworkPrefix::new(IpNet::from_str("192.0.2.0/24").unwrap(), Some(123));
            assert_eq!(nlri.prefixes[0], prefix);
        } else {
            panic!("Unexpected result: {:?}", res);
        }
    }

    #[test]
    fn test_parsing_unreach_ipv6() {
        let test_bytes = Bytes::from(vec![
            0x00, 0x02, // address family: IPv6
            0x01, // safi: unicast
            0x20, 0x20, 0x01, 0x0d, 0xb8, // 2001:db8::/32
        ]);
        let res = parse_nlri(test_bytes.clone(), false, false).unwrap();
        let nlri = match &res {
            AttributeValue::MpUnreachNlri(nlri) => nlri,
            other => panic!("Unexpected result: {:?}", other),
        };
        assert!(nlri.is_ipv6());
        assert!(!nlri.is_reachable());
        assert_eq!(nlri.prefixes[0].to_string(), "2001:db8::/32");
        assert_eq!(encode_nlri(nlri, false), test_bytes);
    }

    #[test]
    fn test_encode_ipv6_link_local() {
        let nlri = Nlri {
            afi: Afi::Ipv6,
            safi: Safi::Unicast,
            next_hop: Some(NextHopAddress::Ipv6LinkLocal(
                Ipv6Addr::from_str("2001:db8::1").unwrap(),
                Ipv6Addr::from_str("fe80::1").unwrap(),
            )),
            prefixes: vec![NetworkPrefix::from_str("2001:db8:1::/48").unwrap()],
        };
        let parsed = parse_nlri(encode_nlri(&nlri, true), true, false).unwrap();
        assert_eq!(parsed, AttributeValue::MpReachNlri(nlri));
    }

    #[test]
    fn test_unknown_safi() {
        let test_bytes = Bytes::from(vec![0x00, 0x01, 0x80, 0x00]);
        assert!(matches!(
            parse_nlri(test_bytes, false, false),
            Err(ParserError::UnrecognizedEnumVariant { .. })
        ));
    }
}
