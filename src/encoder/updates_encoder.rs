use crate::models::{
    Bgp4MpPeer, Bgp4MpStateChange, Bgp4MpType, BgpMessage, BgpUpdateMessage, CommonHeader,
    EntryType,
};
use bytes::{BufMut, Bytes, BytesMut};

/// Builds an uncompressed MRT updates archive, one BGP4MP record at a time.
///
/// Records are written as `BGP4MP`, or as `BGP4MP_ET` with a microsecond timestamp in front of
/// the message when the extended timestamp is enabled.
#[derive(Debug)]
pub struct MrtUpdatesEncoder {
    msg_type: Bgp4MpType,
    extended: bool,
    bytes: BytesMut,
    records: usize,
}

impl Default for MrtUpdatesEncoder {
    fn default() -> Self {
        MrtUpdatesEncoder {
            msg_type: Bgp4MpType::MessageAs4,
            extended: false,
            bytes: BytesMut::new(),
            records: 0,
        }
    }
}

impl MrtUpdatesEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subtype used for messages. ASN width and ADD-PATH encoding follow from it.
    pub fn with_msg_type(mut self, msg_type: Bgp4MpType) -> Self {
        self.msg_type = msg_type;
        self
    }

    pub fn with_extended_timestamp(mut self, extended: bool) -> Self {
        self.extended = extended;
        self
    }

    pub fn len(&self) -> usize {
        self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records == 0
    }

    pub fn push_update(
        &mut self,
        seconds: u32,
        microseconds: u32,
        peer: &Bgp4MpPeer,
        update: &BgpUpdateMessage,
    ) {
        let mut message = BytesMut::new();
        message.extend(peer.encode(self.msg_type.asn_len()));
        message.extend(
            BgpMessage::Update(update.clone())
                .encode(self.msg_type.is_add_path(), self.msg_type.asn_len()),
        );
        self.push_message(seconds, microseconds, self.msg_type as u16, message.freeze());
    }

    pub fn push_state_change(&mut self, seconds: u32, change: &Bgp4MpStateChange) {
        self.push_message(seconds, 0, change.msg_type as u16, change.encode());
    }

    /// Appends a record as given, without checking that the header matches the payload.
    pub fn push_raw(&mut self, header: &CommonHeader, payload: &[u8]) {
        self.bytes.extend(header.encode());
        self.bytes.put_slice(payload);
        self.records += 1;
    }

    fn push_message(&mut self, seconds: u32, microseconds: u32, subtype: u16, message: Bytes) {
        let (entry_type, prefix) = match self.extended {
            true => (EntryType::BGP4MP_ET, microseconds.to_be_bytes().to_vec()),
            false => (EntryType::BGP4MP, vec![]),
        };
        let header = CommonHeader {
            timestamp: seconds,
            entry_type: entry_type as u16,
            entry_subtype: subtype,
            length: (prefix.len() + message.len()) as u32,
        };
        let mut payload = prefix;
        payload.extend_from_slice(&message);
        self.push_raw(&header, &payload);
    }

    /// Returns the archive built so far and starts a new one.
    pub fn export_bytes(&mut self) -> Bytes {
        self.records = 0;
        self.bytes.split().freeze()
    }
}
