//! BGP attribute structs
mod aspath;
mod nlri;
mod origin;

use crate::models::*;
use bitflags::bitflags;
use num_enum::{FromPrimitive, IntoPrimitive};
use serde::{Serialize, Serializer};
use std::net::{IpAddr, Ipv4Addr};

pub use aspath::*;
pub use nlri::*;
pub use origin::*;

bitflags! {
    /// The high-order bit (bit 0) of the Attribute Flags octet is the
    /// Optional bit.  It defines whether the attribute is optional (if
    /// set to 1) or well-known (if set to 0).
    ///
    /// The second high-order bit (bit 1) of the Attribute Flags octet
    /// is the Transitive bit.  It defines whether an optional
    /// attribute is transitive (if set to 1) or non-transitive (if set
    /// to 0).
    ///
    /// The third high-order bit (bit 2) of the Attribute Flags octet
    /// is the Partial bit.  It defines whether the information
    /// contained in the optional transitive attribute is partial (if
    /// set to 1) or complete (if set to 0).
    ///
    /// The fourth high-order bit (bit 3) of the Attribute Flags octet
    /// is the Extended Length bit.  It defines whether the Attribute
    /// Length is one octet (if set to 0) or two octets (if set to 1).
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize)]
    pub struct AttrFlags: u8 {
        const OPTIONAL   = 0b10000000;
        const TRANSITIVE = 0b01000000;
        const PARTIAL    = 0b00100000;
        const EXTENDED   = 0b00010000;
    }
}

/// Attribute types.
///
/// Types without a dedicated decoder fall into [AttrType::Unknown] and are kept as raw bytes.
/// The full list lives at IANA:
/// <https://www.iana.org/assignments/bgp-parameters/bgp-parameters.xhtml#bgp-parameters-2>
#[allow(non_camel_case_types)]
#[derive(Debug, FromPrimitive, IntoPrimitive, PartialEq, Eq, Hash, Copy, Clone, Serialize)]
#[repr(u8)]
pub enum AttrType {
    ORIGIN = 1,
    AS_PATH = 2,
    NEXT_HOP = 3,
    MULTI_EXIT_DISCRIMINATOR = 4,
    LOCAL_PREFERENCE = 5,
    ATOMIC_AGGREGATE = 6,
    AGGREGATOR = 7,
    COMMUNITIES = 8,
    /// <https://tools.ietf.org/html/rfc4456>
    ORIGINATOR_ID = 9,
    CLUSTER_LIST = 10,
    /// <https://tools.ietf.org/html/rfc4760>
    MP_REACHABLE_NLRI = 14,
    MP_UNREACHABLE_NLRI = 15,
    AS4_PATH = 17,
    AS4_AGGREGATOR = 18,
    LARGE_COMMUNITIES = 32,
    ONLY_TO_CUSTOMER = 35,
    #[num_enum(catch_all)]
    Unknown(u8),
}

/// BGP Attribute struct with attribute value and flag
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Attribute {
    pub value: AttributeValue,
    pub flag: AttrFlags,
}

impl Attribute {
    pub fn attr_type(&self) -> AttrType {
        self.value.attr_type()
    }
}

/// The `AttributeValue` enum represents different kinds of Attribute values.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub enum AttributeValue {
    Origin(Origin),
    AsPath {
        path: AsPath,
        is_as4: bool,
    },
    NextHop(IpAddr),
    MultiExitDiscriminator(u32),
    LocalPreference(u32),
    AtomicAggregate,
    Aggregator {
        asn: Asn,
        id: Ipv4Addr,
        is_as4: bool,
    },
    Communities(Vec<Community>),
    OriginatorId(Ipv4Addr),
    Clusters(Vec<Ipv4Addr>),
    MpReachNlri(Nlri),
    MpUnreachNlri(Nlri),
    LargeCommunities(Vec<LargeCommunity>),
    OnlyToCustomer(Asn),
    Unknown(AttrRaw),
}

impl AttributeValue {
    pub fn attr_type(&self) -> AttrType {
        match self {
            AttributeValue::Origin(_) => AttrType::ORIGIN,
            AttributeValue::AsPath { is_as4: false, .. } => AttrType::AS_PATH,
            AttributeValue::AsPath { is_as4: true, .. } => AttrType::AS4_PATH,
            AttributeValue::NextHop(_) => AttrType::NEXT_HOP,
            AttributeValue::MultiExitDiscriminator(_) => AttrType::MULTI_EXIT_DISCRIMINATOR,
            AttributeValue::LocalPreference(_) => AttrType::LOCAL_PREFERENCE,
            AttributeValue::AtomicAggregate => AttrType::ATOMIC_AGGREGATE,
            AttributeValue::Aggregator { is_as4: false, .. } => AttrType::AGGREGATOR,
            AttributeValue::Aggregator { is_as4: true, .. } => AttrType::AS4_AGGREGATOR,
            AttributeValue::Communities(_) => AttrType::COMMUNITIES,
            AttributeValue::OriginatorId(_) => AttrType::ORIGINATOR_ID,
            AttributeValue::Clusters(_) => AttrType::CLUSTER_LIST,
            AttributeValue::MpReachNlri(_) => AttrType::MP_REACHABLE_NLRI,
            AttributeValue::MpUnreachNlri(_) => AttrType::MP_UNREACHABLE_NLRI,
            AttributeValue::LargeCommunities(_) => AttrType::LARGE_COMMUNITIES,
            AttributeValue::OnlyToCustomer(_) => AttrType::ONLY_TO_CUSTOMER,
            AttributeValue::Unknown(raw) => raw.attr_type,
        }
    }
}

/// An attribute this crate does not decode, preserved as found on the wire.
#[derive(Debug, PartialEq, Clone, Eq, Serialize)]
pub struct AttrRaw {
    pub attr_type: AttrType,
    #[serde(serialize_with = "serialize_hex")]
    pub bytes: Vec<u8>,
}

fn serialize_hex<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&hex::encode(bytes))
}

/// Path attributes of one UPDATE message.
///
/// At most one attribute per type is kept. A repeated type replaces the value of the earlier
/// one in its original position, so iteration follows the order in which types first appeared on
/// the wire.
#[derive(Debug, PartialEq, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Attributes {
    inner: Vec<Attribute>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, attr: Attribute) {
        let attr_type = attr.attr_type();
        match self.inner.iter_mut().find(|a| a.attr_type() == attr_type) {
            Some(existing) => *existing = attr,
            None => self.inner.push(attr),
        }
    }

    pub fn get(&self, attr_type: AttrType) -> Option<&Attribute> {
        self.inner.iter().find(|a| a.attr_type() == attr_type)
    }

    pub fn has_attr(&self, attr_type: AttrType) -> bool {
        self.get(attr_type).is_some()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.inner.iter()
    }

    /// Prefixes announced through MP_REACH_NLRI, empty when the attribute is absent.
    pub fn mp_reach_prefixes(&self) -> &[NetworkPrefix] {
        match self.get(AttrType::MP_REACHABLE_NLRI).map(|a| &a.value) {
            Some(AttributeValue::MpReachNlri(nlri)) => &nlri.prefixes,
            _ => &[],
        }
    }

    /// Prefixes withdrawn through MP_UNREACH_NLRI, empty when the attribute is absent.
    pub fn mp_unreach_prefixes(&self) -> &[NetworkPrefix] {
        match self.get(AttrType::MP_UNREACHABLE_NLRI).map(|a| &a.value) {
            Some(AttributeValue::MpUnreachNlri(nlri)) => &nlri.prefixes,
            _ => &[],
        }
    }

    pub fn as_path(&self) -> Option<&AsPath> {
        match self.get(AttrType::AS_PATH).map(|a| &a.value) {
            Some(AttributeValue::AsPath { path, .. }) => Some(path),
            _ => None,
        }
    }
}

impl FromIterator<Attribute> for Attributes {
    fn from_iter<T: IntoIterator<Item = Attribute>>(iter: T) -> Self {
        let mut attributes = Attributes::new();
        for attr in iter {
            attributes.insert(attr);
        }
        attributes
    }
}

impl From<Vec<Attribute>> for Attributes {
    fn from(value: Vec<Attribute>) -> Self {
        value.into_iter().collect()
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(value: AttributeValue) -> Attribute {
        Attribute {
            value,
            flag: AttrFlags::TRANSITIVE,
        }
    }

    #[test]
    fn test_attr_type_catch_all() {
        assert_eq!(AttrType::from(2u8), AttrType::AS_PATH);
        assert_eq!(AttrType::from(99u8), AttrType::Unknown(99));
        assert_eq!(u8::from(AttrType::Unknown(99)), 99);
        assert_eq!(u8::from(AttrType::ONLY_TO_CUSTOMER), 35);
    }

    #[test]
    fn test_attributes_last_wins_in_wire_order() {
        let attributes: Attributes = vec![
            attr(AttributeValue::Origin(Origin::IGP)),
            attr(AttributeValue::LocalPreference(100)),
            attr(AttributeValue::Origin(Origin::INCOMPLETE)),
        ]
        .into();

        assert_eq!(attributes.len(), 2);
        let types: Vec<AttrType> = attributes.iter().map(|a| a.attr_type()).collect();
        assert_eq!(types, vec![AttrType::ORIGIN, AttrType::LOCAL_PREFERENCE]);
        assert_eq!(
            attributes.get(AttrType::ORIGIN).unwrap().value,
            AttributeValue::Origin(Origin::INCOMPLETE)
        );
    }

    #[test]
    fn test_as4_variants_are_distinct_types() {
        let mut attributes = Attributes::new();
        attributes.insert(attr(AttributeValue::AsPath {
            path: AsPath::from_sequence([65000]),
            is_as4: false,
        }));
        attributes.insert(attr(AttributeValue::AsPath {
            path: AsPath::from_sequence([400000]),
            is_as4: true,
        }));
        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes.as_path(), Some(&AsPath::from_sequence([65000])));
    }

    #[test]
    fn test_unknown_attribute_serializes_as_hex() {
        let value = AttributeValue::Unknown(AttrRaw {
            attr_type: AttrType::Unknown(200),
            bytes: vec![0xde, 0xad],
        });
        assert_eq!(value.attr_type(), AttrType::Unknown(200));
        let json = serde_json::to_string(&value).unwrap();
        assert!(json.contains("\"dead\""));
    }
}
