use crate::models::*;
use crate::parser::ReadUtils;
use crate::ParserError;
use bytes::Bytes;

/// parse RFC9234 OnlyToCustomer attribute.
///
/// RFC: https://www.rfc-editor.org/rfc/rfc9234.html#name-bgp-only-to-customer-otc-at
///
/// ```text
/// The OTC Attribute is an optional transitive Path Attribute of the UPDATE message with
/// Attribute Type Code 35 and a length of 4 octets.
/// ```
pub fn parse_only_to_customer(mut input: Bytes) -> Result<AttributeValue, ParserError> {
    input.expect_remaining_eq(4, "ONLY_TO_CUSTOMER")?;
    let remote_asn = input.read_u32()?;
    Ok(AttributeValue::OnlyToCustomer(Asn::new_32bit(remote_asn)))
}

pub fn encode_only_to_customer(value: u32) -> Bytes {
    Bytes::from(value.to_be_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_otc() {
        if let Ok(AttributeValue::OnlyToCustomer(asn)) =
            parse_only_to_customer(encode_only_to_customer(123))
        {
            assert_eq!(asn, 123);
        } else {
            panic!("parsing error")
        }
    }
}
