use crate::error::IpasnError;
use crate::models::*;
use crate::parser::attributes::parse_attributes;
use crate::parser::{ParseMode, ReadUtils};
use bytes::{Buf, Bytes};

/// Parse a TABLE_DUMP_V2 message.
///
/// RFC: <https://www.rfc-editor.org/rfc/rfc6396#section-4.3>
///
/// Accepted sub-types:
/// 1. PEER_INDEX_TABLE
/// 2. RIB_IPV4_UNICAST
/// 4. RIB_IPV6_UNICAST
pub fn parse_table_dump_v2_message(
    sub_type: u16,
    data: Bytes,
    mode: ParseMode,
) -> Result<TableDumpV2Message, IpasnError> {
    let v2_type = TableDumpV2Type::try_from(sub_type).map_err(|_| {
        IpasnError::UnrecognizedSubType {
            entry_type: EntryType::TABLE_DUMP_V2.into(),
            sub_type,
        }
    })?;

    let msg = match v2_type {
        TableDumpV2Type::PeerIndexTable => {
            TableDumpV2Message::PeerIndexTable(parse_peer_index_table(data)?)
        }
        TableDumpV2Type::RibIpv4Unicast | TableDumpV2Type::RibIpv6Unicast => {
            TableDumpV2Message::RibAfi(parse_rib_afi_entries(data, v2_type, mode)?)
        }
    };

    Ok(msg)
}

/// Peer index table: collector id and view name are decoded, the peer
/// list itself is skipped (the origin pipeline never dereferences peer
/// indexes).
///
/// RFC: <https://www.rfc-editor.org/rfc/rfc6396#section-4.3.1>
pub fn parse_peer_index_table(mut data: Bytes) -> Result<PeerIndexTable, IpasnError> {
    let collector_bgp_id = data.read_ipv4_address()?;
    let view_name_length = data.read_u16()?;
    let view_name_bytes = data.read_n_bytes(view_name_length as usize)?;
    let view_name = String::from_utf8(view_name_bytes.to_vec()).unwrap_or_default();
    let peer_count = data.read_u16()?;

    Ok(PeerIndexTable {
        collector_bgp_id,
        view_name,
        peer_count,
    })
}

/// RIB AFI-specific entries: sequence number, packed prefix, entry list.
///
/// RFC: <https://www.rfc-editor.org/rfc/rfc6396#section-4.3.2>
///
/// Under lazy parsing only entry 0 is decoded; it alone feeds origin
/// selection, and skipping the rest roughly halves conversion time on
/// full RouteViews dumps.
pub fn parse_rib_afi_entries(
    mut data: Bytes,
    rib_type: TableDumpV2Type,
    mode: ParseMode,
) -> Result<RibAfiEntries, IpasnError> {
    let afi = match rib_type {
        TableDumpV2Type::RibIpv4Unicast => Afi::Ipv4,
        TableDumpV2Type::RibIpv6Unicast => Afi::Ipv6,
        TableDumpV2Type::PeerIndexTable => {
            return Err(IpasnError::ParseError(
                "PEER_INDEX_TABLE passed to RIB entry parser".to_string(),
            ))
        }
    };

    let sequence_number = data.read_u32()?;
    let prefix_len = data.read_u8()?;
    let prefix = data.read_packed_prefix(afi, prefix_len)?;

    let entry_count = data.read_u16()?;
    let parse_count = match mode {
        ParseMode::Lazy => entry_count.min(1),
        ParseMode::Strict => entry_count,
    };

    let mut entries = Vec::with_capacity(parse_count as usize);
    for _ in 0..parse_count {
        entries.push(parse_rib_entry(&mut data, mode)?);
    }

    if mode == ParseMode::Strict && data.remaining() > 0 {
        return Err(IpasnError::ParseError(format!(
            "{} bytes left over after {entry_count} RIB entries",
            data.remaining()
        )));
    }

    Ok(RibAfiEntries {
        rib_type,
        sequence_number,
        prefix,
        entry_count,
        entries,
    })
}

fn parse_rib_entry(data: &mut Bytes, mode: ParseMode) -> Result<RibEntry, IpasnError> {
    data.require_n_remaining(8, "rib entry")?;
    let peer_index = data.read_u16()?;
    let originated_time = data.read_u32()?;
    let attribute_length = data.read_u16()? as usize;

    data.require_n_remaining(attribute_length, "rib entry attributes")?;
    let attr_data = data.split_to(attribute_length);
    let attributes = parse_attributes(attr_data, mode)?;

    Ok(RibEntry {
        peer_index,
        originated_time,
        attributes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::{BufMut, BytesMut};
    use std::net::Ipv4Addr;
    use std::str::FromStr;
    use ipnet::IpNet;

    fn rib_entry_bytes(peer: u16, attrs: &[u8]) -> BytesMut {
        let mut bytes = BytesMut::new();
        bytes.put_u16(peer);
        bytes.put_u32(1399538361);
        bytes.put_u16(attrs.len() as u16);
        bytes.put_slice(attrs);
        bytes
    }

    // AS_PATH attribute, 32-bit ASNs, sequence [701, 6453, 15169]
    const AS_PATH_ATTR: &[u8] = &[
        0x40, 2, 14, 2, 3, 0, 0, 0x02, 0xbd, 0, 0, 0x19, 0x35, 0, 0, 0x3b, 0x41,
    ];

    fn build_rib_v4(entry_count: u16, entries: &[u8]) -> Bytes {
        let mut bytes = BytesMut::new();
        bytes.put_u32(1); // sequence
        bytes.put_u8(24);
        bytes.put_slice(&[1, 0, 0]); // 1.0.0.0/24 packed
        bytes.put_u16(entry_count);
        bytes.put_slice(entries);
        bytes.freeze()
    }

    #[test]
    fn test_parse_peer_index_table() {
        let mut bytes = BytesMut::new();
        bytes.put_u32(Ipv4Addr::new(128, 223, 51, 102).into());
        bytes.put_u16(4);
        bytes.put_slice(b"view");
        bytes.put_u16(40);
        // two fake peer entries follow; the parser must not require them
        bytes.put_slice(&[0u8; 14]);
        let table = parse_peer_index_table(bytes.freeze()).unwrap();
        assert_eq!(Ipv4Addr::new(128, 223, 51, 102), table.collector_bgp_id);
        assert_eq!("view", table.view_name);
        assert_eq!(40, table.peer_count);
    }

    #[test]
    fn test_parse_rib_v4_lazy_first_entry_only() {
        let mut entries = rib_entry_bytes(23, AS_PATH_ATTR);
        entries.extend(rib_entry_bytes(24, AS_PATH_ATTR));
        let data = build_rib_v4(2, &entries);
        let rib = parse_rib_afi_entries(data, TableDumpV2Type::RibIpv4Unicast, ParseMode::Lazy)
            .unwrap();
        assert_eq!(IpNet::from_str("1.0.0.0/24").unwrap(), rib.prefix);
        assert_eq!(2, rib.entry_count);
        assert_eq!(1, rib.entries.len());
        assert_eq!(23, rib.entries[0].peer_index);
    }

    #[test]
    fn test_parse_rib_v4_strict_all_entries() {
        let mut entries = rib_entry_bytes(23, AS_PATH_ATTR);
        entries.extend(rib_entry_bytes(24, AS_PATH_ATTR));
        let data = build_rib_v4(2, &entries);
        let rib = parse_rib_afi_entries(data, TableDumpV2Type::RibIpv4Unicast, ParseMode::Strict)
            .unwrap();
        assert_eq!(2, rib.entries.len());
        assert_eq!(24, rib.entries[1].peer_index);
    }

    #[test]
    fn test_strict_detects_leftover_bytes() {
        let mut entries = rib_entry_bytes(23, AS_PATH_ATTR);
        entries.put_u8(0xff);
        let data = build_rib_v4(1, &entries);
        assert!(matches!(
            parse_rib_afi_entries(data, TableDumpV2Type::RibIpv4Unicast, ParseMode::Strict),
            Err(IpasnError::ParseError(_))
        ));
    }

    #[test]
    fn test_parse_rib_v6() {
        let mut bytes = BytesMut::new();
        bytes.put_u32(12);
        bytes.put_u8(32);
        bytes.put_slice(&[0x20, 0x01, 0, 0]); // 2001::/32 packed
        bytes.put_u16(1);
        bytes.extend(rib_entry_bytes(3, AS_PATH_ATTR));
        let rib = parse_rib_afi_entries(
            bytes.freeze(),
            TableDumpV2Type::RibIpv6Unicast,
            ParseMode::Lazy,
        )
        .unwrap();
        assert_eq!(IpNet::from_str("2001::/32").unwrap(), rib.prefix);
    }

    #[test]
    fn test_parse_rib_default_route() {
        let mut bytes = BytesMut::new();
        bytes.put_u32(0);
        bytes.put_u8(0); // zero-length prefix, no octets follow
        bytes.put_u16(1);
        bytes.extend(rib_entry_bytes(32, AS_PATH_ATTR));
        let rib = parse_rib_afi_entries(
            bytes.freeze(),
            TableDumpV2Type::RibIpv4Unicast,
            ParseMode::Lazy,
        )
        .unwrap();
        assert_eq!(IpNet::from_str("0.0.0.0/0").unwrap(), rib.prefix);
    }

    #[test]
    fn test_unknown_sub_type() {
        let err =
            parse_table_dump_v2_message(6, Bytes::new(), ParseMode::Lazy).unwrap_err();
        assert!(matches!(
            err,
            IpasnError::UnrecognizedSubType {
                entry_type: 13,
                sub_type: 6
            }
        ));
    }

    #[test]
    fn test_truncated_entry() {
        let data = build_rib_v4(1, &[0, 23]); // entry cut short
        assert!(matches!(
            parse_rib_afi_entries(data, TableDumpV2Type::RibIpv4Unicast, ParseMode::Lazy),
            Err(IpasnError::TruncatedMsg(_))
        ));
    }
}
