use crate::models::*;
use crate::parser::ReadUtils;
use crate::ParserError;
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// <https://datatracker.ietf.org/doc/html/rfc8092>: 12 octets per community.
pub fn parse_large_communities(mut input: Bytes) -> Result<AttributeValue, ParserError> {
    let mut communities = Vec::with_capacity(input.remaining() / 12);
    while input.remaining() > 0 {
        input.require_n_remaining(12, "large community")?;
        let global_administrator = input.read_u32()?;
        let local_data = [input.read_u32()?, input.read_u32()?];
        communities.push(LargeCommunity::new(global_administrator, local_data));
    }
    Ok(AttributeValue::LargeCommunities(communities))
}

pub fn encode_large_communities(communities: &[LargeCommunity]) -> Bytes {
    let mut data = BytesMut::with_capacity(communities.len() * 12);
    for community in communities {
        data.put_u32(community.global_admin);
        data.put_u32(community.local_data[0]);
        data.put_u32(community.local_data[1]);
    }
    data.freeze()
}
