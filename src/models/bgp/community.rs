use crate::models::Asn;
use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};

/// Regular community as defined in [RFC1997](https://datatracker.ietf.org/doc/html/rfc1997).
#[derive(Debug, PartialEq, Copy, Clone, Eq)]
pub enum Community {
    NoExport,
    NoAdvertise,
    NoExportSubConfed,
    Custom(Asn, u16),
}

impl Community {
    pub const NO_EXPORT: u32 = 0xFFFFFF01;
    pub const NO_ADVERTISE: u32 = 0xFFFFFF02;
    pub const NO_EXPORT_SUBCONFED: u32 = 0xFFFFFF03;

    /// The 4-octet wire value.
    pub fn to_u32(&self) -> u32 {
        match self {
            Community::NoExport => Self::NO_EXPORT,
            Community::NoAdvertise => Self::NO_ADVERTISE,
            Community::NoExportSubConfed => Self::NO_EXPORT_SUBCONFED,
            Community::Custom(asn, value) => ((asn.to_u32() & 0xffff) << 16) | *value as u32,
        }
    }
}

impl From<u32> for Community {
    fn from(value: u32) -> Self {
        match value {
            Self::NO_EXPORT => Community::NoExport,
            Self::NO_ADVERTISE => Community::NoAdvertise,
            Self::NO_EXPORT_SUBCONFED => Community::NoExportSubConfed,
            value => {
                let asn = ((value >> 16) & 0xffff) as u16;
                let data = (value & 0xffff) as u16;
                Community::Custom(Asn::new_16bit(asn), data)
            }
        }
    }
}

/// Large community structure as defined in [RFC8092](https://datatracker.ietf.org/doc/html/rfc8092)
///
/// ## Display
///
/// Large community is displayed as `lg:GLOBAL_ADMINISTRATOR:LOCAL_DATA_1:LOCAL_DATA_2`, where `lg`
/// is a prefix for large community.
#[derive(Debug, PartialEq, Clone, Copy, Eq)]
pub struct LargeCommunity {
    pub global_admin: u32,
    pub local_data: [u32; 2],
}

impl LargeCommunity {
    pub fn new(global_admin: u32, local_data: [u32; 2]) -> LargeCommunity {
        LargeCommunity {
            global_admin,
            local_data,
        }
    }
}

impl Display for Community {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Community::NoExport => write!(f, "no-export"),
            Community::NoAdvertise => write!(f, "no-advertise"),
            Community::NoExportSubConfed => write!(f, "no-export-sub-confed"),
            Community::Custom(asn, value) => write!(f, "{}:{}", asn, value),
        }
    }
}

impl Display for LargeCommunity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "lg:{}:{}:{}",
            self.global_admin, self.local_data[0], self.local_data[1]
        )
    }
}

macro_rules! serialize_with_display {
    ($($t:ty),*) => {
        $(
        impl Serialize for $t {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.collect_str(self)
            }
        }
        )*
    };
}

serialize_with_display!(Community, LargeCommunity);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_community_wire_value() {
        assert_eq!(Community::from(0xFFFFFF01), Community::NoExport);
        let custom = Community::from(0x007B01C8);
        assert_eq!(custom, Community::Custom(Asn::from(123), 456));
        assert_eq!(custom.to_u32(), 0x007B01C8);
        assert_eq!(custom.to_string(), "123:456");
    }

    #[test]
    fn test_serialize_display() {
        let lc = LargeCommunity::new(1, [2, 3]);
        assert_eq!(serde_json::to_string(&lc).unwrap(), "\"lg:1:2:3\"");
        assert_eq!(
            serde_json::to_string(&Community::NoAdvertise).unwrap(),
            "\"no-advertise\""
        );
    }
}
