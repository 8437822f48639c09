use bytes::{BufMut, Bytes, BytesMut};
use ipnet::IpNet;
use serde::{Serialize, Serializer};
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// A network prefix with the optional ADD-PATH path identifier it was announced with.
#[derive(PartialEq, Eq, Clone, Copy, Hash)]
pub struct NetworkPrefix {
    pub prefix: IpNet,
    pub path_id: Option<u32>,
}

// Attempt to reduce the size of the debug output
impl Debug for NetworkPrefix {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.path_id {
            Some(path_id) => write!(f, "{}#{}", self.prefix, path_id),
            None => write!(f, "{}", self.prefix),
        }
    }
}

impl FromStr for NetworkPrefix {
    type Err = ipnet::AddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let prefix = IpNet::from_str(s)?;
        Ok(NetworkPrefix {
            prefix,
            path_id: None,
        })
    }
}

impl NetworkPrefix {
    pub fn new(prefix: IpNet, path_id: Option<u32>) -> NetworkPrefix {
        NetworkPrefix { prefix, path_id }
    }

    /// Encodes the prefix in NLRI form: optional path identifier, bit length, then the minimum
    /// number of address octets.
    ///
    /// ```rust
    /// use std::str::FromStr;
    /// use bgpkit_mirror::models::NetworkPrefix;
    ///
    /// let prefix = NetworkPrefix::from_str("192.168.0.0/24").unwrap();
    /// assert_eq!(prefix.encode().as_ref(), &[24, 192, 168, 0]);
    /// ```
    pub fn encode(&self) -> Bytes {
        let mut bytes = BytesMut::new();

        if let Some(path_id) = self.path_id {
            bytes.put_u32(path_id);
        }

        let bit_len = self.prefix.prefix_len();
        let byte_len = bit_len.div_ceil(8) as usize;
        bytes.put_u8(bit_len);

        match self.prefix {
            IpNet::V4(prefix) => {
                bytes.put_slice(&prefix.addr().octets()[0..byte_len]);
            }
            IpNet::V6(prefix) => {
                bytes.put_slice(&prefix.addr().octets()[0..byte_len]);
            }
        };
        bytes.freeze()
    }
}

impl Display for NetworkPrefix {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.prefix)
    }
}

/// Serialized as the bare prefix string; the path identifier is not part of the output.
impl Serialize for NetworkPrefix {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_with_path_id() {
        let mut prefix = NetworkPrefix::from_str("10.0.0.0/9").unwrap();
        prefix.path_id = Some(7);
        assert_eq!(prefix.encode().as_ref(), &[0, 0, 0, 7, 9, 10, 0]);
        assert_eq!(format!("{:?}", prefix), "10.0.0.0/9#7");
    }

    #[test]
    fn test_serialize_drops_path_id() {
        let prefix = NetworkPrefix::new(IpNet::from_str("2001:db8::/32").unwrap(), Some(1));
        assert_eq!(serde_json::to_string(&prefix).unwrap(), "\"2001:db8::/32\"");
    }
}
