use crate::models::*;
use crate::parser::ReadUtils;
use crate::ParserError;
use bytes::Bytes;

pub fn parse_origin(mut input: Bytes) -> Result<AttributeValue, ParserError> {
    input.expect_remaining_eq(1, "ORIGIN")?;
    Ok(AttributeValue::Origin(Origin::try_from(input.read_u8()?)?))
}

pub fn encode_origin(origin: &Origin) -> Bytes {
    Bytes::from(vec![u8::from(*origin)])
}
