//! Records produced by decoding one MRT entry, and their warehouse row form.
use crate::models::*;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::net::IpAddr;

/// One BGP UPDATE observed by a collector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BgpUpdateRecord {
    pub collector: String,
    /// Observation time from the MRT header, whole seconds.
    pub observed_at: DateTime<Utc>,
    pub peer_asn: Asn,
    pub peer_ip: IpAddr,
    /// Classic NLRI followed by MP_REACH_NLRI prefixes.
    pub announced: Vec<NetworkPrefix>,
    /// Classic withdrawn routes followed by MP_UNREACH_NLRI prefixes.
    pub withdrawn: Vec<NetworkPrefix>,
    pub attributes: Attributes,
}

/// Result of decoding a single MRT record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DecodedRecord {
    /// An UPDATE announcing at least one prefix.
    Announcement(BgpUpdateRecord),
    /// An UPDATE announcing nothing; it may still withdraw prefixes.
    Withdrawal(BgpUpdateRecord),
    StateChange(Bgp4MpStateChange),
    /// Anything else: other MRT entry types, other BGP message types.
    Unknown { entry_type: u16, subtype: u16 },
}

impl DecodedRecord {
    /// Classifies an update by whether it announces anything.
    pub fn from_update(record: BgpUpdateRecord) -> DecodedRecord {
        match record.announced.is_empty() {
            true => DecodedRecord::Withdrawal(record),
            false => DecodedRecord::Announcement(record),
        }
    }

    /// The update carried by this record, if any.
    pub fn update(&self) -> Option<&BgpUpdateRecord> {
        match self {
            DecodedRecord::Announcement(r) | DecodedRecord::Withdrawal(r) => Some(r),
            _ => None,
        }
    }
}

/// A path attribute in row form: its type code and its value as a JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttributePayload {
    pub attr_type: u8,
    pub payload: String,
}

/// One line of the converted archive.
///
/// ```json
/// {"Collector":"route-views2","SeenAt":"2022-04-27T19:00:00Z","PeerAS":6447,
///  "Announced":["10.0.0.0/8"],"Withdrawn":[],"Attributes":[{"AttrType":1,"Payload":"..."}]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateRow {
    pub collector: String,
    pub seen_at: DateTime<Utc>,
    #[serde(rename = "PeerAS")]
    pub peer_as: u32,
    pub announced: Vec<String>,
    pub withdrawn: Vec<String>,
    pub attributes: Vec<AttributePayload>,
}

impl UpdateRow {
    pub fn from_record(record: &BgpUpdateRecord) -> Result<UpdateRow, serde_json::Error> {
        let attributes = record
            .attributes
            .iter()
            .map(|attr| {
                Ok(AttributePayload {
                    attr_type: attr.attr_type().into(),
                    payload: serde_json::to_string(&attr.value)?,
                })
            })
            .collect::<Result<Vec<_>, serde_json::Error>>()?;

        Ok(UpdateRow {
            collector: record.collector.clone(),
            seen_at: record.observed_at,
            peer_as: record.peer_asn.to_u32(),
            announced: record.announced.iter().map(|p| p.to_string()).collect(),
            withdrawn: record.withdrawn.iter().map(|p| p.to_string()).collect(),
            attributes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    fn record(announced: &[&str], withdrawn: &[&str]) -> BgpUpdateRecord {
        let mut attributes = Attributes::new();
        attributes.insert(Attribute {
            value: AttributeValue::Origin(Origin::IGP),
            flag: AttrFlags::TRANSITIVE,
        });
        BgpUpdateRecord {
            collector: "route-views2".to_string(),
            observed_at: Utc.with_ymd_and_hms(2022, 4, 27, 19, 0, 0).unwrap(),
            peer_asn: Asn::new_32bit(6447),
            peer_ip: IpAddr::from_str("192.0.2.1").unwrap(),
            announced: announced
                .iter()
                .map(|p| NetworkPrefix::from_str(p).unwrap())
                .collect(),
            withdrawn: withdrawn
                .iter()
                .map(|p| NetworkPrefix::from_str(p).unwrap())
                .collect(),
            attributes,
        }
    }

    #[test]
    fn test_classification() {
        assert!(matches!(
            DecodedRecord::from_update(record(&["10.0.0.0/8"], &[])),
            DecodedRecord::Announcement(_)
        ));
        assert!(matches!(
            DecodedRecord::from_update(record(&[], &["10.0.0.0/8"])),
            DecodedRecord::Withdrawal(_)
        ));
        // nothing announced, nothing withdrawn
        assert!(matches!(
            DecodedRecord::from_update(record(&[], &[])),
            DecodedRecord::Withdrawal(_)
        ));
    }

    #[test]
    fn test_row_json() {
        let row = UpdateRow::from_record(&record(&["10.0.0.0/8"], &["2001:db8::/32"])).unwrap();
        let value: serde_json::Value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["Collector"], "route-views2");
        assert_eq!(value["SeenAt"], "2022-04-27T19:00:00Z");
        assert_eq!(value["PeerAS"], 6447);
        assert_eq!(value["Announced"][0], "10.0.0.0/8");
        assert_eq!(value["Withdrawn"][0], "2001:db8::/32");
        assert_eq!(value["Attributes"][0]["AttrType"], 1);
        assert_eq!(value["Attributes"][0]["Payload"], "{\"Origin\":\"IGP\"}");
    }
}
