/*!
Provides IO utility functions for read bytes of different length and converting to corresponding structs.

Every read is bounds-checked and fails with [ParserError::IoNotEnoughBytes] instead of panicking,
so a record that lies about its own lengths is rejected rather than read past its end.
*/
use ipnet::IpNet;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::models::*;
use bytes::{Buf, Bytes};

use crate::error::ParserError;

impl ReadUtils for Bytes {}
impl ReadUtils for &[u8] {}

pub trait ReadUtils: Buf {
    #[inline]
    fn has_n_remaining(&self, n: usize) -> bool {
        self.remaining() >= n
    }

    #[inline]
    fn require_n_remaining(&self, n: usize, target: &'static str) -> Result<(), ParserError> {
        if self.has_n_remaining(n) {
            Ok(())
        } else {
            Err(ParserError::IoNotEnoughBytes(target))
        }
    }

    /// Fails unless exactly `n` bytes remain, for fixed-size attributes.
    #[inline]
    fn expect_remaining_eq(&self, n: usize, target: &'static str) -> Result<(), ParserError> {
        match self.remaining() {
            x if x == n => Ok(()),
            x => Err(ParserError::ParseError(format!(
                "{} expected {} bytes, found {}",
                target, n, x
            ))),
        }
    }

    #[inline]
    fn read_u8(&mut self) -> Result<u8, ParserError> {
        self.require_n_remaining(1, "u8")?;
        Ok(self.get_u8())
    }

    #[inline]
    fn read_u16(&mut self) -> Result<u16, ParserError> {
        self.require_n_remaining(2, "u16")?;
        Ok(self.get_u16())
    }

    #[inline]
    fn read_u32(&mut self) -> Result<u32, ParserError> {
        self.require_n_remaining(4, "u32")?;
        Ok(self.get_u32())
    }

    fn read_address(&mut self, afi: &Afi) -> Result<IpAddr, ParserError> {
        match afi {
            Afi::Ipv4 => self.read_ipv4_address().map(IpAddr::V4),
            Afi::Ipv6 => self.read_ipv6_address().map(IpAddr::V6),
        }
    }

    fn read_ipv4_address(&mut self) -> Result<Ipv4Addr, ParserError> {
        let addr = self.read_u32()?;
        Ok(Ipv4Addr::from(addr))
    }

    fn read_ipv6_address(&mut self) -> Result<Ipv6Addr, ParserError> {
        self.require_n_remaining(16, "IPv6 address")?;
        let buf = self.get_u128();
        Ok(Ipv6Addr::from(buf))
    }

    #[inline]
    fn read_asn(&mut self, as_length: AsnLength) -> Result<Asn, ParserError> {
        match as_length {
            AsnLength::Bits16 => self.read_u16().map(Asn::new_16bit),
            AsnLength::Bits32 => self.read_u32().map(Asn::new_32bit),
        }
    }

    fn read_asns(&mut self, as_length: &AsnLength, count: usize) -> Result<Vec<Asn>, ParserError> {
        self.require_n_remaining(count * as_length.octets(), "AS path segment")?;
        let mut path = Vec::with_capacity(count);
        for _ in 0..count {
            path.push(self.read_asn(*as_length)?);
        }
        Ok(path)
    }

    fn read_afi(&mut self) -> Result<Afi, ParserError> {
        Afi::try_from(self.read_u16()?).map_err(ParserError::from)
    }

    fn read_safi(&mut self) -> Result<Safi, ParserError> {
        Safi::try_from(self.read_u8()?).map_err(ParserError::from)
    }

    /// Read announced/withdrawn prefix.
    ///
    /// The length in bits is 1 byte, and then based on the IP version it reads different number
    /// of bytes. If `add_path` is true, a 4-byte path id is read first.
    fn read_nlri_prefix(
        &mut self,
        afi: &Afi,
        add_path: bool,
    ) -> Result<NetworkPrefix, ParserError> {
        let path_id = match add_path {
            true => Some(self.read_u32()?),
            false => None,
        };

        // Length in bits
        let bit_len = self.read_u8()?;

        // Convert to bytes
        let byte_len: usize = (bit_len as usize).div_ceil(8);
        if byte_len > afi.address_len() {
            return Err(ParserError::ParseError(format!(
                "Invalid byte length for {:?} prefix. byte_len: {}, bit_len: {}",
                afi, byte_len, bit_len
            )));
        }
        self.require_n_remaining(byte_len, "NLRI prefix")?;
        let addr: IpAddr = match afi {
            Afi::Ipv4 => {
                let mut buff = [0; 4];
                self.copy_to_slice(&mut buff[..byte_len]);
                IpAddr::V4(Ipv4Addr::from(buff))
            }
            Afi::Ipv6 => {
                let mut buff = [0; 16];
                self.copy_to_slice(&mut buff[..byte_len]);
                IpAddr::V6(Ipv6Addr::from(buff))
            }
        };
        let prefix = IpNet::new(addr, bit_len)?;

        Ok(NetworkPrefix::new(prefix, path_id))
    }

    fn read_n_bytes(&mut self, n_bytes: usize) -> Result<Vec<u8>, ParserError> {
        self.require_n_remaining(n_bytes, "raw bytes")?;
        Ok(self.copy_to_bytes(n_bytes).into())
    }
}

/// Reads a list of NLRI prefixes until the input is exhausted.
pub fn parse_nlri_list(
    mut input: Bytes,
    add_path: bool,
    afi: &Afi,
) -> Result<Vec<NetworkPrefix>, ParserError> {
    let mut prefixes = vec![];
    while input.remaining() > 0 {
        prefixes.push(input.read_nlri_prefix(afi, add_path)?);
    }
    Ok(prefixes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_short_input() {
        let mut data = Bytes::from_static(&[1, 2, 3]);
        assert!(matches!(
            data.read_u32(),
            Err(ParserError::IoNotEnoughBytes("u32"))
        ));
        assert_eq!(data.read_u16().unwrap(), 0x0102);
        assert_eq!(data.read_u8().unwrap(), 3);
        assert!(data.read_u8().is_err());
    }

    #[test]
    fn test_read_nlri_prefix() {
        let mut data = Bytes::from_static(&[24, 192, 168, 1]);
        let prefix = data.read_nlri_prefix(&Afi::Ipv4, false).unwrap();
        assert_eq!(prefix.to_string(), "192.168.1.0/24");
        assert_eq!(prefix.path_id, None);

        let mut data = Bytes::from_static(&[0, 0, 0, 9, 32, 0x20, 0x01, 0x0d, 0xb8]);
        let prefix = data.read_nlri_prefix(&Afi::Ipv6, true).unwrap();
        assert_eq!(prefix.to_string(), "2001:db8::/32");
        assert_eq!(prefix.path_id, Some(9));
    }

    #[test]
    fn test_read_nlri_prefix_invalid() {
        // 33 bits does not fit in an IPv4 address
        let mut data = Bytes::from_static(&[33, 1, 2, 3, 4, 5]);
        assert!(data.read_nlri_prefix(&Afi::Ipv4, false).is_err());
        // claims 24 bits but only 2 bytes follow
        let mut data = Bytes::from_static(&[24, 1, 2]);
        assert!(matches!(
            data.read_nlri_prefix(&Afi::Ipv4, false),
            Err(ParserError::IoNotEnoughBytes(_))
        ));
    }

    #[test]
    fn test_parse_nlri_list() {
        let data = Bytes::from_static(&[8, 10, 16, 172, 16]);
        let prefixes = parse_nlri_list(data, false, &Afi::Ipv4).unwrap();
        assert_eq!(prefixes.len(), 2);
        assert_eq!(prefixes[1].to_string(), "172.16.0.0/16");
    }
}
