use bytes::{Buf, Bytes};
use std::fmt::{Display, Formatter};

/// BGP path attribute type codes.
///
/// Only the registry entries that show up in table dumps are named; the
/// origin pipeline cares about AS_PATH alone and carries the rest as
/// opaque bytes for the screen dump.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrType {
    ORIGIN,
    AS_PATH,
    NEXT_HOP,
    MULTI_EXIT_DISCRIMINATOR,
    LOCAL_PREFERENCE,
    ATOMIC_AGGREGATE,
    AGGREGATOR,
    COMMUNITIES,
    ORIGINATOR_ID,
    CLUSTER_LIST,
    MP_REACHABLE_NLRI,
    MP_UNREACHABLE_NLRI,
    EXTENDED_COMMUNITIES,
    AS4_PATH,
    AS4_AGGREGATOR,
    Unknown(u8),
}

impl From<u8> for AttrType {
    fn from(code: u8) -> Self {
        match code {
            1 => AttrType::ORIGIN,
            2 => AttrType::AS_PATH,
            3 => AttrType::NEXT_HOP,
            4 => AttrType::MULTI_EXIT_DISCRIMINATOR,
            5 => AttrType::LOCAL_PREFERENCE,
            6 => AttrType::ATOMIC_AGGREGATE,
            7 => AttrType::AGGREGATOR,
            8 => AttrType::COMMUNITIES,
            9 => AttrType::ORIGINATOR_ID,
            10 => AttrType::CLUSTER_LIST,
            14 => AttrType::MP_REACHABLE_NLRI,
            15 => AttrType::MP_UNREACHABLE_NLRI,
            16 => AttrType::EXTENDED_COMMUNITIES,
            17 => AttrType::AS4_PATH,
            18 => AttrType::AS4_AGGREGATOR,
            other => AttrType::Unknown(other),
        }
    }
}

impl From<AttrType> for u8 {
    fn from(attr_type: AttrType) -> Self {
        match attr_type {
            AttrType::ORIGIN => 1,
            AttrType::AS_PATH => 2,
            AttrType::NEXT_HOP => 3,
            AttrType::MULTI_EXIT_DISCRIMINATOR => 4,
            AttrType::LOCAL_PREFERENCE => 5,
            AttrType::ATOMIC_AGGREGATE => 6,
            AttrType::AGGREGATOR => 7,
            AttrType::COMMUNITIES => 8,
            AttrType::ORIGINATOR_ID => 9,
            AttrType::CLUSTER_LIST => 10,
            AttrType::MP_REACHABLE_NLRI => 14,
            AttrType::MP_UNREACHABLE_NLRI => 15,
            AttrType::EXTENDED_COMMUNITIES => 16,
            AttrType::AS4_PATH => 17,
            AttrType::AS4_AGGREGATOR => 18,
            AttrType::Unknown(code) => code,
        }
    }
}

impl Display for AttrType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AttrType::Unknown(code) => write!(f, "TYPE-{code}"),
            known => write!(f, "{known:?}"),
        }
    }
}

/// Attribute flags octet: bit 0x10 selects the two-byte length form.
pub const ATTR_FLAG_EXTENDED_LENGTH: u8 = 0x10;

/// A single BGP path attribute, value kept as raw bytes.
///
/// AS_PATH values are decoded on demand (`parser::parse_as_path`) so that
/// conversion never pays for attributes it does not read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BgpAttribute {
    pub flags: u8,
    pub attr_type: AttrType,
    pub data: Bytes,
}

impl BgpAttribute {
    pub fn is_extended_length(&self) -> bool {
        self.flags & ATTR_FLAG_EXTENDED_LENGTH != 0
    }
}

impl Display for BgpAttribute {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: ", self.attr_type)?;
        // Small fixed-width scalars are worth printing; anything else is
        // summarized by length. AS_PATH is rendered by the screen dump,
        // which knows the record's ASN width.
        let mut data = self.data.clone();
        match data.remaining() {
            1 => write!(f, "{}", data.get_u8()),
            2 => write!(f, "{}", data.get_u16()),
            4 => write!(f, "{}", data.get_u32()),
            n => write!(f, "{n} bytes"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_type_round_trip() {
        for code in 0u8..=255 {
            assert_eq!(code, u8::from(AttrType::from(code)));
        }
    }

    #[test]
    fn test_display() {
        assert_eq!("AS_PATH", AttrType::AS_PATH.to_string());
        assert_eq!("TYPE-99", AttrType::Unknown(99).to_string());

        let attr = BgpAttribute {
            flags: 0x40,
            attr_type: AttrType::ORIGIN,
            data: Bytes::from_static(&[0]),
        };
        assert_eq!("ORIGIN: 0", attr.to_string());

        let attr = BgpAttribute {
            flags: 0x50,
            attr_type: AttrType::AS_PATH,
            data: Bytes::from_static(&[0; 14]),
        };
        assert!(attr.is_extended_length());
        assert_eq!("AS_PATH: 14 bytes", attr.to_string());
    }
}
