use crate::models::*;
use crate::parser::ReadUtils;
use crate::ParserError;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use log::warn;
use std::net::Ipv4Addr;

/// Parse aggregator attribute.
///
/// https://www.rfc-editor.org/rfc/rfc4271.html#section-5.1.7
///
/// ```text
///    AGGREGATOR is an optional transitive attribute, which MAY be included
///    in updates that are formed by aggregation (see Section 9.2.2.2).  A
///    BGP speaker that performs route aggregation MAY add the AGGREGATOR
///    attribute, which SHALL contain its own AS number and IP address.  The
///    IP address SHOULD be the same as the BGP Identifier of the speaker.`
/// ```
///
/// The ASN width is taken from the attribute length rather than the message subtype.
pub fn parse_aggregator(
    mut input: Bytes,
    asn_len: &AsnLength,
) -> Result<(Asn, Ipv4Addr), ParserError> {
    let asn_len_found = match input.remaining() {
        8 => AsnLength::Bits32,
        6 => AsnLength::Bits16,
        _ => {
            return Err(ParserError::ParseError(format!(
                "Aggregator attribute length is invalid: found {}, should 6 or 8",
                input.remaining()
            )))
        }
    };
    if asn_len_found != *asn_len {
        warn!(
            "Aggregator attribute with ASN length set to {:?} but found {:?}",
            asn_len, asn_len_found
        );
    }
    let asn = input.read_asn(asn_len_found)?;

    // the BGP identifier is always 4 bytes or IPv4 address
    let identifier = input.read_ipv4_address()?;
    Ok((asn, identifier))
}

pub fn encode_aggregator(asn: &Asn, id: &Ipv4Addr, asn_len: AsnLength) -> Bytes {
    let mut bytes = BytesMut::with_capacity(8);
    match asn_len {
        AsnLength::Bits16 => bytes.put_u16(asn.to_u32() as u16),
        AsnLength::Bits32 => bytes.put_u32(asn.to_u32()),
    }
    bytes.put_slice(&id.octets());
    bytes.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_parse_aggregator() {
        let identifier = Ipv4Addr::from_str("10.0.0.1").unwrap();
        let mut data = vec![];
        data.extend([1u8, 2]);
        data.extend(identifier.octets());
        let (asn, n) = parse_aggregator(Bytes::from(data), &AsnLength::Bits16).unwrap();
        assert_eq!(asn, Asn::new_16bit(258));
        assert_eq!(n, identifier);

        let encoded = encode_aggregator(&Asn::new_32bit(400000), &identifier, AsnLength::Bits32);
        let (asn, n) = parse_aggregator(encoded, &AsnLength::Bits32).unwrap();
        assert_eq!(asn, 400000);
        assert_eq!(n, identifier);

        assert!(parse_aggregator(Bytes::from_static(&[1, 2, 3]), &AsnLength::Bits16).is_err());
    }
}
