mod attr_01_origin;
mod attr_02_17_as_path;
mod attr_03_next_hop;
mod attr_04_med;
mod attr_05_local_pref;
mod attr_07_18_aggregator;
mod attr_08_communities;
mod attr_09_originator;
mod attr_10_13_cluster;
mod attr_14_15_nlri;
mod attr_32_large_communities;
mod attr_35_otc;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use log::{debug, warn};

use crate::models::*;

use crate::error::ParserError;
use crate::parser::bgp::attributes::attr_01_origin::{encode_origin, parse_origin};
use crate::parser::bgp::attributes::attr_02_17_as_path::{encode_as_path, parse_as_path};
use crate::parser::bgp::attributes::attr_03_next_hop::{encode_next_hop, parse_next_hop};
use crate::parser::bgp::attributes::attr_04_med::{encode_med, parse_med};
use crate::parser::bgp::attributes::attr_05_local_pref::{encode_local_pref, parse_local_pref};
use crate::parser::bgp::attributes::attr_07_18_aggregator::{
    encode_aggregator, parse_aggregator,
};
use crate::parser::bgp::attributes::attr_08_communities::{
    encode_regular_communities, parse_regular_communities,
};
use crate::parser::bgp::attributes::attr_09_originator::{
    encode_originator_id, parse_originator_id,
};
use crate::parser::bgp::attributes::attr_10_13_cluster::{encode_clusters, parse_clusters};
use crate::parser::bgp::attributes::attr_14_15_nlri::{encode_nlri, parse_nlri};
use crate::parser::bgp::attributes::attr_32_large_communities::{
    encode_large_communities, parse_large_communities,
};
use crate::parser::bgp::attributes::attr_35_otc::{
    encode_only_to_customer, parse_only_to_customer,
};
use crate::parser::ReadUtils;

pub struct AttributeParser {
    additional_paths: bool,
}

impl AttributeParser {
    pub fn new(has_add_path: bool) -> AttributeParser {
        AttributeParser {
            additional_paths: has_add_path,
        }
    }

    /// Parse BGP attributes given the attributes section of an UPDATE message.
    ///
    /// `data` contains the entirety of the attributes bytes, therefore its size is the total
    /// byte length of the attributes section of the message.
    pub fn parse_attributes(
        &self,
        mut data: Bytes,
        asn_len: &AsnLength,
    ) -> Result<Attributes, ParserError> {
        let mut attributes = Attributes::new();

        while data.remaining() >= 3 {
            // each attribute is at least 3 bytes: flag(1) + type(1) + length(1)
            // thus the while loop condition is set to be at least 3 bytes to read.

            // has content to read
            let flag = AttrFlags::from_bits_retain(data.read_u8()?);
            let attr_type = AttrType::from(data.read_u8()?);
            let attr_length = match flag.contains(AttrFlags::EXTENDED) {
                false => data.read_u8()? as usize,
                true => data.read_u16()? as usize,
            };

            /*
            https://datatracker.ietf.org/doc/html/rfc4271#section-4.3

            > The third high-order bit (bit 2) of the Attribute Flags octet
            > is the Partial bit.  It defines whether the information
            > contained in the optional transitive attribute is partial (if
            > set to 1) or complete (if set to 0).
            */
            let partial = flag.contains(AttrFlags::PARTIAL);

            debug!(
                "reading attribute: type -- {:?}, length -- {}",
                &attr_type, attr_length
            );

            data.require_n_remaining(attr_length, "Attribute")?;
            let attr_data = data.split_to(attr_length);

            let attr = match attr_type {
                AttrType::ORIGIN => parse_origin(attr_data.clone()),
                AttrType::AS_PATH => parse_as_path(attr_data.clone(), asn_len).map(|path| {
                    AttributeValue::AsPath {
                        path,
                        is_as4: false,
                    }
                }),
                AttrType::NEXT_HOP => parse_next_hop(attr_data.clone()),
                AttrType::MULTI_EXIT_DISCRIMINATOR => parse_med(attr_data.clone()),
                AttrType::LOCAL_PREFERENCE => parse_local_pref(attr_data.clone()),
                AttrType::ATOMIC_AGGREGATE => Ok(AttributeValue::AtomicAggregate),
                AttrType::AGGREGATOR => {
                    parse_aggregator(attr_data.clone(), asn_len).map(|(asn, id)| {
                        AttributeValue::Aggregator {
                            asn,
                            id,
                            is_as4: false,
                        }
                    })
                }
                AttrType::COMMUNITIES => parse_regular_communities(attr_data.clone()),
                AttrType::ORIGINATOR_ID => parse_originator_id(attr_data.clone()),
                AttrType::CLUSTER_LIST => parse_clusters(attr_data.clone()),
                AttrType::MP_REACHABLE_NLRI => {
                    parse_nlri(attr_data.clone(), true, self.additional_paths)
                }
                AttrType::MP_UNREACHABLE_NLRI => {
                    parse_nlri(attr_data.clone(), false, self.additional_paths)
                }
                AttrType::AS4_PATH => parse_as_path(attr_data.clone(), &AsnLength::Bits32)
                    .map(|path| AttributeValue::AsPath { path, is_as4: true }),
                AttrType::AS4_AGGREGATOR => {
                    parse_aggregator(attr_data.clone(), &AsnLength::Bits32).map(|(asn, id)| {
                        AttributeValue::Aggregator {
                            asn,
                            id,
                            is_as4: true,
                        }
                    })
                }
                AttrType::LARGE_COMMUNITIES => parse_large_communities(attr_data.clone()),
                AttrType::ONLY_TO_CUSTOMER => parse_only_to_customer(attr_data.clone()),
                AttrType::Unknown(unknown_type) => {
                    debug!("unknown attribute type: {}", unknown_type);
                    Ok(raw_attribute(attr_type, &attr_data))
                }
            };

            match attr {
                Ok(value) => {
                    attributes.insert(Attribute { value, flag });
                }
                Err(e) if partial => {
                    // it's ok to have errors when reading partial bytes
                    warn!("PARTIAL: {}", e);
                }
                Err(ParserError::UnrecognizedEnumVariant { type_name, value })
                    if matches!(
                        attr_type,
                        AttrType::MP_REACHABLE_NLRI | AttrType::MP_UNREACHABLE_NLRI
                    ) =>
                {
                    // address families other than IPv4/IPv6 unicast/multicast
                    debug!("keeping {:?} with {} {} as raw bytes", attr_type, type_name, value);
                    attributes.insert(Attribute {
                        value: raw_attribute(attr_type, &attr_data),
                        flag,
                    });
                }
                Err(e) => {
                    warn!("{}", e);
                    return Err(ParserError::InvalidAttribute {
                        attr_type,
                        reason: e.to_string(),
                    });
                }
            };
        }

        if data.has_remaining() {
            debug!("{} trailing bytes after attributes", data.remaining());
        }

        Ok(attributes)
    }
}

fn raw_attribute(attr_type: AttrType, data: &Bytes) -> AttributeValue {
    AttributeValue::Unknown(AttrRaw {
        attr_type,
        bytes: data.to_vec(),
    })
}

impl Attribute {
    /// Encodes the attribute with its flags, type and length. The extended length flag is set
    /// when the value does not fit in one length octet.
    pub fn encode(&self, asn_len: AsnLength) -> Bytes {
        let value = self.value.encode(asn_len);
        let mut flag = self.flag;
        if value.len() > u8::MAX as usize {
            flag.insert(AttrFlags::EXTENDED);
        }

        let mut bytes = BytesMut::with_capacity(value.len() + 4);
        bytes.put_u8(flag.bits());
        bytes.put_u8(self.attr_type().into());
        match flag.contains(AttrFlags::EXTENDED) {
            true => bytes.put_u16(value.len() as u16),
            false => bytes.put_u8(value.len() as u8),
        }
        bytes.put_slice(&value);
        bytes.freeze()
    }
}

impl AttributeValue {
    /// Encodes the value part of the attribute. `asn_len` only applies to AS_PATH and
    /// AGGREGATOR; their AS4 twins always use 4-octet ASNs.
    pub fn encode(&self, asn_len: AsnLength) -> Bytes {
        match self {
            AttributeValue::Origin(v) => encode_origin(v),
            AttributeValue::AsPath { path, is_as4 } => match is_as4 {
                true => encode_as_path(path, AsnLength::Bits32),
                false => encode_as_path(path, asn_len),
            },
            AttributeValue::NextHop(v) => encode_next_hop(v),
            AttributeValue::MultiExitDiscriminator(v) => encode_med(*v),
            AttributeValue::LocalPreference(v) => encode_local_pref(*v),
            AttributeValue::AtomicAggregate => Bytes::default(),
            AttributeValue::Aggregator { asn, id, is_as4 } => match is_as4 {
                true => encode_aggregator(asn, id, AsnLength::Bits32),
                false => encode_aggregator(asn, id, asn_len),
            },
            AttributeValue::Communities(v) => encode_regular_communities(v),
            AttributeValue::OriginatorId(v) => encode_originator_id(v),
            AttributeValue::Clusters(v) => encode_clusters(v),
            AttributeValue::MpReachNlri(v) => encode_nlri(v, true),
            AttributeValue::MpUnreachNlri(v) => encode_nlri(v, false),
            AttributeValue::LargeCommunities(v) => encode_large_communities(v),
            AttributeValue::OnlyToCustomer(v) => encode_only_to_customer(v.to_u32()),
            AttributeValue::Unknown(raw) => Bytes::from(raw.bytes.clone()),
        }
    }
}

impl Attributes {
    pub fn encode(&self, asn_len: AsnLength) -> Bytes {
        let mut bytes = BytesMut::new();
        for attr in self {
            bytes.extend(attr.encode(asn_len));
        }
        bytes.freeze()
    }
}
