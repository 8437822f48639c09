use crate::models::*;
use crate::parser::ReadUtils;
use crate::ParserError;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::net::IpAddr;

/// NEXT_HOP is always an IPv4 address; IPv6 next hops travel in MP_REACH_NLRI.
pub fn parse_next_hop(mut input: Bytes) -> Result<AttributeValue, ParserError> {
    input.expect_remaining_eq(4, "NEXT_HOP")?;
    Ok(AttributeValue::NextHop(IpAddr::V4(input.read_ipv4_address()?)))
}

pub fn parse_mp_next_hop(mut input: Bytes) -> Result<Option<NextHopAddress>, ParserError> {
    let output = match input.remaining() {
        0 => None,
        4 => Some(input.read_ipv4_address().map(NextHopAddress::Ipv4)?),
        16 => Some(input.read_ipv6_address().map(NextHopAddress::Ipv6)?),
        32 => Some(NextHopAddress::Ipv6LinkLocal(
            input.read_ipv6_address()?,
            input.read_ipv6_address()?,
        )),
        v => {
            return Err(ParserError::ParseError(format!(
                "Invalid next hop length found: {}",
                v
            )));
        }
    };
    Ok(output)
}

pub fn encode_next_hop(addr: &IpAddr) -> Bytes {
    match addr {
        IpAddr::V4(n) => Bytes::from(n.octets().to_vec()),
        IpAddr::V6(n) => Bytes::from(n.octets().to_vec()),
    }
}

pub fn encode_mp_next_hop(n: &NextHopAddress) -> Bytes {
    match n {
        NextHopAddress::Ipv4(n) => Bytes::from(n.octets().to_vec()),
        NextHopAddress::Ipv6(n) => Bytes::from(n.octets().to_vec()),
        NextHopAddress::Ipv6LinkLocal(n1, n2) => {
            let mut output = BytesMut::with_capacity(32);
            output.put_slice(&n1.octets());
            output.put_slice(&n2.octets());
            output.freeze()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};
    use std::str::FromStr;

    #[test]
    fn test_parse_next_hop() {
        let ipv4 = Ipv4Addr::from_str("10.0.0.1").unwrap();
        let res = parse_next_hop(encode_next_hop(&IpAddr::V4(ipv4))).unwrap();
        assert_eq!(res, AttributeValue::NextHop(IpAddr::V4(ipv4)));
        assert!(parse_next_hop(Bytes::from_static(&[1, 2, 3])).is_err());
    }

    #[test]
    fn test_parse_mp_next_hop() {
        let ipv6 = Ipv6Addr::from_str("fc00::1").unwrap();
        let link_local = Ipv6Addr::from_str("fe80::1").unwrap();
        let next_hop = NextHopAddress::Ipv6LinkLocal(ipv6, link_local);
        let encoded = encode_mp_next_hop(&next_hop);
        assert_eq!(encoded.len(), 32);
        assert_eq!(parse_mp_next_hop(encoded).unwrap(), Some(next_hop));

        assert_eq!(parse_mp_next_hop(Bytes::new()).unwrap(), None);
        assert!(parse_mp_next_hop(Bytes::from_static(&[1, 2, 3, 4, 5])).is_err());
    }
}
