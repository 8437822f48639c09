use crate::models::*;
use crate::parser::ReadUtils;
use crate::ParserError;
use bytes::Bytes;
use std::net::Ipv4Addr;

/// <https://tools.ietf.org/html/rfc4456>: the router id of the route's originator.
pub fn parse_originator_id(mut input: Bytes) -> Result<AttributeValue, ParserError> {
    input.expect_remaining_eq(4, "ORIGINATOR_ID")?;
    Ok(AttributeValue::OriginatorId(input.read_ipv4_address()?))
}

pub fn encode_originator_id(addr: &Ipv4Addr) -> Bytes {
    Bytes::from(addr.octets().to_vec())
}
