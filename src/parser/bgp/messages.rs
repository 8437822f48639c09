use crate::models::*;
use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::ParserError;
use crate::parser::bgp::attributes::AttributeParser;
use crate::parser::{parse_nlri_list, ReadUtils};
use log::debug;

/// Length of the fixed BGP message header: marker, length and type.
pub const BGP_HEADER_LEN: usize = 19;

/// BGP message
///
/// Format:
/// ```text
/// 0                   1                   2                   3
/// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// +                                                               +
/// |                                                               |
/// +                                                               +
/// |                           Marker                              |
/// +                                                               +
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |          Length               |      Type     |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
pub fn parse_bgp_message(
    data: &mut Bytes,
    add_path: bool,
    asn_len: &AsnLength,
) -> Result<BgpMessage, ParserError> {
    data.require_n_remaining(BGP_HEADER_LEN, "BGP message header")?;
    // https://tools.ietf.org/html/rfc4271#section-4
    // 16 (4 x 4 bytes) octets marker
    data.advance(16);
    /*
     This 2-octet unsigned integer indicates the total length of the
     message, including the header in octets.  Thus, it allows one
     to locate the (Marker field of the) next message in the TCP
     stream.  The value of the Length field MUST always be at least
     19 and no greater than 4096, and MAY be further constrained,
     depending on the message type.
     */
    let length = data.read_u16()? as usize;
    if !(BGP_HEADER_LEN..=4096).contains(&length) {
        return Err(ParserError::ParseError(format!(
            "invalid BGP message length {}",
            length
        )));
    }
    let msg_type = BgpMessageType::try_from(data.read_u8()?)?;

    let bgp_msg_length = length - BGP_HEADER_LEN;
    data.require_n_remaining(bgp_msg_length, "BGP message body")?;
    let body = data.split_to(bgp_msg_length);

    Ok(match msg_type {
        BgpMessageType::UPDATE => {
            BgpMessage::Update(parse_bgp_update_message(body, add_path, asn_len)?)
        }
        other => {
            debug!("skipping BGP {:?} message body", other);
            BgpMessage::Other(other)
        }
    })
}

/// read bgp update message.
///
/// The prefixes outside of the attributes (withdrawn routes and NLRI) are always IPv4.
pub fn parse_bgp_update_message(
    mut input: Bytes,
    add_path: bool,
    asn_len: &AsnLength,
) -> Result<BgpUpdateMessage, ParserError> {
    let afi = Afi::Ipv4;

    // parse withdrawn prefixes nlri
    let withdrawn_length = input.read_u16()? as usize;
    input.require_n_remaining(withdrawn_length, "withdrawn routes")?;
    let withdrawn_bytes = input.split_to(withdrawn_length);
    let withdrawn_prefixes = parse_nlri_list(withdrawn_bytes, add_path, &afi)?;

    // parse attributes
    let attribute_length = input.read_u16()? as usize;
    input.require_n_remaining(attribute_length, "path attributes")?;
    let attr_data = input.split_to(attribute_length);
    let attributes = AttributeParser::new(add_path).parse_attributes(attr_data, asn_len)?;

    // parse announced prefixes nlri, the rest of the message
    let announced_prefixes = parse_nlri_list(input, add_path, &afi)?;

    Ok(BgpUpdateMessage {
        withdrawn_prefixes,
        attributes,
        announced_prefixes,
    })
}

impl BgpUpdateMessage {
    /// Encodes the UPDATE body (without the BGP message header).
    pub fn encode(&self, add_path: bool, asn_len: AsnLength) -> Bytes {
        let mut bytes = BytesMut::new();

        let withdrawn = encode_prefixes(&self.withdrawn_prefixes, add_path);
        bytes.put_u16(withdrawn.len() as u16);
        bytes.extend(withdrawn);

        let attributes = self.attributes.encode(asn_len);
        bytes.put_u16(attributes.len() as u16);
        bytes.extend(attributes);

        bytes.extend(encode_prefixes(&self.announced_prefixes, add_path));
        bytes.freeze()
    }
}

impl BgpMessage {
    /// Encodes the full BGP message: marker, length, type and body.
    pub fn encode(&self, add_path: bool, asn_len: AsnLength) -> Bytes {
        let (msg_type, body) = match self {
            BgpMessage::Update(msg) => (BgpMessageType::UPDATE, msg.encode(add_path, asn_len)),
            BgpMessage::Other(msg_type) => (*msg_type, Bytes::new()),
        };
        let mut bytes = BytesMut::with_capacity(BGP_HEADER_LEN + body.len());
        bytes.put_u128(u128::MAX);
        bytes.put_u16((BGP_HEADER_LEN + body.len()) as u16);
        bytes.put_u8(msg_type.into());
        bytes.extend(body);
        bytes.freeze()
    }
}

fn encode_prefixes(prefixes: &[NetworkPrefix], add_path: bool) -> Bytes {
    let mut bytes = BytesMut::new();
    for prefix in prefixes {
        let prefix = NetworkPrefix {
            path_id: match add_path {
                true => Some(prefix.path_id.unwrap_or(0)),
                false => None,
            },
            ..*prefix
        };
        bytes.extend(prefix.encode());
    }
    bytes.freeze()
}
