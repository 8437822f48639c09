//! MRT container structs.

pub mod bgp4mp;

pub use bgp4mp::*;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::Serialize;

/// Length in bytes of the common header on the wire.
pub const COMMON_HEADER_LEN: usize = 12;

/// MRT common header.
///
/// A CommonHeader ([RFC6396 section 2][header-link]) is constructed as the following:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                           Timestamp                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |             Type              |            Subtype            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                             Length                            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// `length` is the on-wire payload length. For `BGP4MP_ET` records the payload starts with a
/// 4-byte microsecond timestamp which is only split off when the record is decoded, see
/// [CommonHeader::normalize_extended].
///
/// [header-link]: https://datatracker.ietf.org/doc/html/rfc6396#section-2
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct CommonHeader {
    pub timestamp: u32,
    pub entry_type: u16,
    pub entry_subtype: u16,
    pub length: u32,
}

impl CommonHeader {
    /// The entry type, if it is one this crate knows about.
    pub fn entry_type(&self) -> Option<EntryType> {
        EntryType::try_from(self.entry_type).ok()
    }

    pub fn is_extended(&self) -> bool {
        self.entry_type() == Some(EntryType::BGP4MP_ET)
    }

    /// Builds the non-extended twin of a `BGP4MP_ET` header: type `BGP4MP`, length reduced by
    /// the 4 microsecond bytes. Returns `None` when the header is not extended or too short.
    pub fn normalize_extended(&self) -> Option<CommonHeader> {
        if !self.is_extended() || self.length < 4 {
            return None;
        }
        Some(CommonHeader {
            entry_type: EntryType::BGP4MP as u16,
            length: self.length - 4,
            ..*self
        })
    }
}

/// MRT entry type.
///
/// Only the types relevant to update archives are listed. The `_ET` variant carries an extended
/// (microsecond) timestamp in front of the regular message.
#[derive(Debug, TryFromPrimitive, IntoPrimitive, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[allow(non_camel_case_types)]
#[repr(u16)]
pub enum EntryType {
    TABLE_DUMP = 12,
    TABLE_DUMP_V2 = 13,
    BGP4MP = 16,
    BGP4MP_ET = 17,
}
