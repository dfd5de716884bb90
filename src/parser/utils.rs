/*!
Bounds-checked big-endian reads over [`bytes::Bytes`] record buffers.
*/
use crate::error::IpasnError;
use crate::models::{Afi, Asn, AsnLength};
use bytes::{Buf, Bytes};
use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

pub trait ReadUtils {
    fn require_n_remaining(&self, n: usize, target: &str) -> Result<(), IpasnError>;

    fn read_u8(&mut self) -> Result<u8, IpasnError>;

    fn read_u16(&mut self) -> Result<u16, IpasnError>;

    fn read_u32(&mut self) -> Result<u32, IpasnError>;

    fn read_n_bytes(&mut self, n: usize) -> Result<Bytes, IpasnError>;

    fn read_ipv4_address(&mut self) -> Result<Ipv4Addr, IpasnError>;

    fn read_ipv6_address(&mut self) -> Result<Ipv6Addr, IpasnError>;

    fn read_address(&mut self, afi: Afi) -> Result<IpAddr, IpasnError>;

    fn read_asn(&mut self, asn_len: AsnLength) -> Result<Asn, IpasnError>;

    /// Read a mask-length-packed prefix: `⌈bit_len/8⌉` octets follow,
    /// right-padded with zeros to the family width.
    fn read_packed_prefix(&mut self, afi: Afi, bit_len: u8) -> Result<IpNet, IpasnError>;
}

impl ReadUtils for Bytes {
    #[inline]
    fn require_n_remaining(&self, n: usize, target: &str) -> Result<(), IpasnError> {
        if self.remaining() < n {
            return Err(IpasnError::TruncatedMsg(format!(
                "truncated {target}: expected {n} bytes, {} available",
                self.remaining()
            )));
        }
        Ok(())
    }

    #[inline]
    fn read_u8(&mut self) -> Result<u8, IpasnError> {
        self.require_n_remaining(1, "u8")?;
        Ok(self.get_u8())
    }

    #[inline]
    fn read_u16(&mut self) -> Result<u16, IpasnError> {
        self.require_n_remaining(2, "u16")?;
        Ok(self.get_u16())
    }

    #[inline]
    fn read_u32(&mut self) -> Result<u32, IpasnError> {
        self.require_n_remaining(4, "u32")?;
        Ok(self.get_u32())
    }

    fn read_n_bytes(&mut self, n: usize) -> Result<Bytes, IpasnError> {
        self.require_n_remaining(n, "bytes")?;
        Ok(self.split_to(n))
    }

    fn read_ipv4_address(&mut self) -> Result<Ipv4Addr, IpasnError> {
        Ok(Ipv4Addr::from(self.read_u32()?))
    }

    fn read_ipv6_address(&mut self) -> Result<Ipv6Addr, IpasnError> {
        self.require_n_remaining(16, "IPv6 address")?;
        let mut buf = [0u8; 16];
        self.copy_to_slice(&mut buf);
        Ok(Ipv6Addr::from(buf))
    }

    fn read_address(&mut self, afi: Afi) -> Result<IpAddr, IpasnError> {
        match afi {
            Afi::Ipv4 => self.read_ipv4_address().map(IpAddr::V4),
            Afi::Ipv6 => self.read_ipv6_address().map(IpAddr::V6),
        }
    }

    fn read_asn(&mut self, asn_len: AsnLength) -> Result<Asn, IpasnError> {
        match asn_len {
            AsnLength::Bits16 => Ok(Asn::from(self.read_u16()?)),
            AsnLength::Bits32 => Ok(Asn::from(self.read_u32()?)),
        }
    }

    fn read_packed_prefix(&mut self, afi: Afi, bit_len: u8) -> Result<IpNet, IpasnError> {
        let byte_len = (bit_len as usize).div_ceil(8);
        let net = match afi {
            Afi::Ipv4 => {
                if bit_len > 32 {
                    return Err(IpasnError::ParseError(format!(
                        "invalid IPv4 prefix length {bit_len}"
                    )));
                }
                self.require_n_remaining(byte_len, "packed IPv4 prefix")?;
                let mut buf = [0u8; 4];
                self.copy_to_slice(&mut buf[..byte_len]);
                IpNet::V4(
                    Ipv4Net::new(Ipv4Addr::from(buf), bit_len)
                        .expect("length checked against family width"),
                )
            }
            Afi::Ipv6 => {
                if bit_len > 128 {
                    return Err(IpasnError::ParseError(format!(
                        "invalid IPv6 prefix length {bit_len}"
                    )));
                }
                self.require_n_remaining(byte_len, "packed IPv6 prefix")?;
                let mut buf = [0u8; 16];
                self.copy_to_slice(&mut buf[..byte_len]);
                IpNet::V6(
                    Ipv6Net::new(Ipv6Addr::from(buf), bit_len)
                        .expect("length checked against family width"),
                )
            }
        };
        Ok(net)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_basic_reads() {
        let mut data = Bytes::from_static(&[0x01, 0x00, 0x02, 0x00, 0x00, 0x00, 0x03]);
        assert_eq!(1, data.read_u8().unwrap());
        assert_eq!(2, data.read_u16().unwrap());
        assert_eq!(3, data.read_u32().unwrap());
        assert!(matches!(
            data.read_u8(),
            Err(IpasnError::TruncatedMsg(_))
        ));
    }

    #[test]
    fn test_read_packed_prefix_padding() {
        // 1.0.0.0/24 packs to three octets.
        let mut data = Bytes::from_static(&[1, 0, 0]);
        let net = data.read_packed_prefix(Afi::Ipv4, 24).unwrap();
        assert_eq!(IpNet::from_str("1.0.0.0/24").unwrap(), net);
        assert_eq!(0, data.remaining());
    }

    #[test]
    fn test_read_packed_prefix_full_width() {
        // /32 consumes all four octets, no padding.
        let mut data = Bytes::from_static(&[192, 0, 2, 1]);
        let net = data.read_packed_prefix(Afi::Ipv4, 32).unwrap();
        assert_eq!(IpNet::from_str("192.0.2.1/32").unwrap(), net);

        let mut data = Bytes::from(vec![0xff; 16]);
        let net = data.read_packed_prefix(Afi::Ipv6, 128).unwrap();
        assert_eq!(128, net.prefix_len());
        assert_eq!(0, data.remaining());
    }

    #[test]
    fn test_read_packed_prefix_zero_len() {
        let mut data = Bytes::new();
        let net = data.read_packed_prefix(Afi::Ipv4, 0).unwrap();
        assert_eq!(IpNet::from_str("0.0.0.0/0").unwrap(), net);
        let mut data = Bytes::new();
        let net = data.read_packed_prefix(Afi::Ipv6, 0).unwrap();
        assert_eq!(IpNet::from_str("::/0").unwrap(), net);
    }

    #[test]
    fn test_read_packed_prefix_v6() {
        let mut data = Bytes::from_static(&[0x20, 0x01, 0x0d, 0xb8]);
        let net = data.read_packed_prefix(Afi::Ipv6, 32).unwrap();
        assert_eq!(IpNet::from_str("2001:db8::/32").unwrap(), net);
    }

    #[test]
    fn test_read_packed_prefix_truncated() {
        let mut data = Bytes::from_static(&[1, 0]);
        assert!(matches!(
            data.read_packed_prefix(Afi::Ipv4, 24),
            Err(IpasnError::TruncatedMsg(_))
        ));
    }

    #[test]
    fn test_read_packed_prefix_bad_length() {
        let mut data = Bytes::from(vec![0u8; 16]);
        assert!(matches!(
            data.read_packed_prefix(Afi::Ipv4, 33),
            Err(IpasnError::ParseError(_))
        ));
    }
}
