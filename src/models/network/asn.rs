use serde::{Deserialize, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

/// AS number length: 16 or 32 bits.
#[derive(Debug, Clone, Serialize, Copy, Deserialize, PartialEq, Eq, Hash)]
pub enum AsnLength {
    Bits16,
    Bits32,
}

impl AsnLength {
    pub const fn octets(&self) -> usize {
        match self {
            AsnLength::Bits16 => 2,
            AsnLength::Bits32 => 4,
        }
    }
}

/// ASN -- Autonomous System Number
///
/// The encoding length is kept so that a decoded path can be written back with the same width,
/// but equality and hashing only consider the number itself.
#[derive(Debug, Clone, Copy, Eq)]
pub struct Asn {
    pub asn: u32,
    pub len: AsnLength,
}

impl Asn {
    /// The 2-octet placeholder used by 4-octet speakers (RFC6793).
    pub const AS_TRANS: u32 = 23456;

    pub const fn new_16bit(asn: u16) -> Self {
        Asn {
            asn: asn as u32,
            len: AsnLength::Bits16,
        }
    }

    pub const fn new_32bit(asn: u32) -> Self {
        Asn {
            asn,
            len: AsnLength::Bits32,
        }
    }

    pub const fn to_u32(&self) -> u32 {
        self.asn
    }
}

impl PartialEq for Asn {
    fn eq(&self, other: &Self) -> bool {
        self.asn == other.asn
    }
}

impl PartialEq<u32> for Asn {
    fn eq(&self, other: &u32) -> bool {
        self.asn == *other
    }
}

impl Hash for Asn {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.asn.hash(state);
    }
}

impl From<u32> for Asn {
    fn from(v: u32) -> Self {
        Asn::new_32bit(v)
    }
}

impl From<Asn> for u32 {
    fn from(value: Asn) -> Self {
        value.asn
    }
}

impl Serialize for Asn {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u32(self.asn)
    }
}

impl Display for Asn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.asn)
    }
}
