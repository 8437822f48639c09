use crate::error::ParserError;
use crate::models::*;
use crate::parser::bgp::messages::{parse_bgp_message, BGP_HEADER_LEN};
use crate::parser::ReadUtils;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use chrono::{DateTime, Utc};
use log::debug;

/// Decodes one framed MRT record into a [DecodedRecord].
///
/// `BGP4MP_ET` records are handled as `BGP4MP`: a new header without the 4 microsecond bytes is
/// built and the payload is re-sliced past them. The caller's header is left as it was.
///
/// Entry types other than BGP4MP, state changes, messages the collector sent itself (the
/// `*_LOCAL` subtypes) and BGP messages other than UPDATE are not errors; they decode to
/// [DecodedRecord::StateChange] or [DecodedRecord::Unknown].
pub fn decode(
    header: Option<&CommonHeader>,
    payload: Bytes,
    collector: &str,
) -> Result<DecodedRecord, ParserError> {
    let header = header.ok_or_else(|| ParserError::MalformedRecord("missing header".into()))?;

    let (header, payload) = match header.is_extended() {
        true => {
            if payload.len() < 4 {
                return Err(ParserError::MalformedRecord(format!(
                    "bad extended timestamp: {} bytes",
                    payload.len()
                )));
            }
            let normalized = header.normalize_extended().ok_or_else(|| {
                ParserError::MalformedRecord(format!(
                    "extended header length {} is too short",
                    header.length
                ))
            })?;
            (normalized, payload.slice(4..))
        }
        false => (*header, payload),
    };

    if payload.len() != header.length as usize {
        return Err(ParserError::MalformedRecord(format!(
            "header length {} does not match payload length {}",
            header.length,
            payload.len()
        )));
    }

    let unknown = DecodedRecord::Unknown {
        entry_type: header.entry_type,
        subtype: header.entry_subtype,
    };
    if header.entry_type() != Some(EntryType::BGP4MP) {
        debug!("not decoding MRT entry type {}", header.entry_type);
        return Ok(unknown);
    }
    let msg_type = match Bgp4MpType::try_from(header.entry_subtype) {
        Ok(t) => t,
        Err(_) => {
            debug!("not decoding BGP4MP subtype {}", header.entry_subtype);
            return Ok(unknown);
        }
    };

    if msg_type.is_state_change() {
        return parse_bgp4mp_state_change(payload, &msg_type).map(DecodedRecord::StateChange);
    }
    if msg_type.is_local() {
        debug!("not decoding locally sent BGP4MP subtype {}", header.entry_subtype);
        return Ok(unknown);
    }

    let (peer, message) = parse_bgp4mp_message(payload, &msg_type)?;
    let update = match message {
        BgpMessage::Update(update) => update,
        BgpMessage::Other(_) => return Ok(unknown),
    };

    let observed_at = DateTime::<Utc>::from_timestamp(header.timestamp as i64, 0).ok_or_else(
        || ParserError::MalformedRecord(format!("invalid timestamp {}", header.timestamp)),
    )?;

    Ok(DecodedRecord::from_update(BgpUpdateRecord {
        collector: collector.to_string(),
        observed_at,
        peer_asn: peer.peer_asn,
        peer_ip: peer.peer_ip,
        announced: update.all_announced(),
        withdrawn: update.all_withdrawn(),
        attributes: update.attributes,
    }))
}

/*
   0                   1                   2                   3
   0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
  |         Peer AS Number        |        Local AS Number        |
  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
  |        Interface Index        |        Address Family         |
  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
  |                      Peer IP Address (variable)               |
  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
  |                      Local IP Address (variable)              |
  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
*/
fn parse_bgp4mp_peer(data: &mut Bytes, asn_len: AsnLength) -> Result<Bgp4MpPeer, ParserError> {
    let peer_asn = data.read_asn(asn_len)?;
    let local_asn = data.read_asn(asn_len)?;
    let interface_index = data.read_u16()?;
    let afi = data.read_afi()?;
    let peer_ip = data.read_address(&afi)?;
    let local_ip = data.read_address(&afi)?;
    Ok(Bgp4MpPeer {
        peer_asn,
        local_asn,
        interface_index,
        peer_ip,
        local_ip,
    })
}

/// Parse a BGP4MP message: the peering header followed by one BGP message.
///
/// RFC: <https://www.rfc-editor.org/rfc/rfc6396#section-4.4>
pub fn parse_bgp4mp_message(
    mut data: Bytes,
    msg_type: &Bgp4MpType,
) -> Result<(Bgp4MpPeer, BgpMessage), ParserError> {
    let peer = parse_bgp4mp_peer(&mut data, msg_type.asn_len())?;
    if data.remaining() < BGP_HEADER_LEN {
        return Err(ParserError::MalformedRecord(format!(
            "BGP4MP message with {} bytes left for the BGP message",
            data.remaining()
        )));
    }
    let bgp_message = parse_bgp_message(&mut data, msg_type.is_add_path(), &msg_type.asn_len())?;
    if data.has_remaining() {
        debug!("{} trailing bytes after BGP message", data.remaining());
    }
    Ok((peer, bgp_message))
}

/*
  |            Old State          |          New State            |
  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
*/
pub fn parse_bgp4mp_state_change(
    mut input: Bytes,
    msg_type: &Bgp4MpType,
) -> Result<Bgp4MpStateChange, ParserError> {
    let peer = parse_bgp4mp_peer(&mut input, msg_type.asn_len())?;
    let old_state = BgpState::try_from(input.read_u16()?)?;
    let new_state = BgpState::try_from(input.read_u16()?)?;
    Ok(Bgp4MpStateChange {
        msg_type: *msg_type,
        peer,
        old_state,
        new_state,
    })
}

impl Bgp4MpPeer {
    pub fn encode(&self, asn_len: AsnLength) -> Bytes {
        let mut bytes = BytesMut::new();
        for asn in [self.peer_asn, self.local_asn] {
            match asn_len {
                AsnLength::Bits16 => bytes.put_u16(asn.to_u32() as u16),
                AsnLength::Bits32 => bytes.put_u32(asn.to_u32()),
            }
        }
        bytes.put_u16(self.interface_index);
        bytes.put_u16(Afi::from(self.peer_ip).into());
        for ip in [self.peer_ip, self.local_ip] {
            match ip {
                std::net::IpAddr::V4(ip) => bytes.put_slice(&ip.octets()),
                std::net::IpAddr::V6(ip) => bytes.put_slice(&ip.octets()),
            }
        }
        bytes.freeze()
    }
}

impl Bgp4MpStateChange {
    pub fn encode(&self) -> Bytes {
        let mut bytes = BytesMut::new();
        bytes.extend(self.peer.encode(self.msg_type.asn_len()));
        bytes.put_u16(self.old_state.into());
        bytes.put_u16(self.new_state.into());
        bytes.freeze()
    }
}
