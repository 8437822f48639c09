use crate::models::*;
use crate::parser::ReadUtils;
use crate::ParserError;
use bytes::Bytes;

pub fn parse_local_pref(mut input: Bytes) -> Result<AttributeValue, ParserError> {
    input.expect_remaining_eq(4, "LOCAL_PREFERENCE")?;
    Ok(AttributeValue::LocalPreference(input.read_u32()?))
}

pub fn encode_local_pref(value: u32) -> Bytes {
    Bytes::from(value.to_be_bytes().to_vec())
}
