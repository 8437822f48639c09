use crate::models::*;
use crate::parser::ReadUtils;
use crate::ParserError;
use bytes::{Buf, Bytes};
use std::net::Ipv4Addr;

/// <https://tools.ietf.org/html/rfc4456>
pub fn parse_clusters(mut input: Bytes) -> Result<AttributeValue, ParserError> {
    let mut clusters = Vec::with_capacity(input.remaining() / 4);
    while input.remaining() > 0 {
        clusters.push(input.read_ipv4_address()?);
    }
    Ok(AttributeValue::Clusters(clusters))
}

pub fn encode_clusters(clusters: &[Ipv4Addr]) -> Bytes {
    let mut buf = Vec::with_capacity(clusters.len() * 4);
    for cluster in clusters {
        buf.extend(cluster.octets());
    }
    Bytes::from(buf)
}
