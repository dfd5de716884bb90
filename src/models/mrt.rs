//! MRT record structs for the table-dump families (RFC 6396).

use crate::models::{Asn, BgpAttribute};
use ipnet::IpNet;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt::{Display, Formatter};
use std::net::{IpAddr, Ipv4Addr};

/// AFI -- Address Family Identifier
#[derive(Debug, TryFromPrimitive, IntoPrimitive, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Afi {
    Ipv4 = 1,
    Ipv6 = 2,
}

/// MRT entry type.
///
/// Offline RIB analytics only ever meets the two table-dump families;
/// every other registered type fails the stream.
#[allow(non_camel_case_types)]
#[derive(Debug, TryFromPrimitive, IntoPrimitive, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum EntryType {
    TABLE_DUMP = 12,
    TABLE_DUMP_V2 = 13,
}

/// TABLE_DUMP_V2 sub-types accepted by the origin pipeline.
///
/// Multicast, RIB_GENERIC and the ADD-PATH variants do not occur in the
/// RouteViews RIB series and are rejected as unsupported sub-types.
#[derive(Debug, TryFromPrimitive, IntoPrimitive, Copy, Clone, PartialEq, Eq)]
#[repr(u16)]
pub enum TableDumpV2Type {
    PeerIndexTable = 1,
    RibIpv4Unicast = 2,
    RibIpv6Unicast = 4,
}

/// MRT common header.
///
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
/// `length` bytes of message body follow the 12-byte header.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CommonHeader {
    pub timestamp: u32,
    pub entry_type: EntryType,
    pub entry_subtype: u16,
    pub length: u32,
}

/// One framed MRT record: the common header plus its decoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MrtRecord {
    pub common_header: CommonHeader,
    pub message: MrtMessage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MrtMessage {
    TableDump(TableDumpMessage),
    TableDumpV2(TableDumpV2Message),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableDumpV2Message {
    PeerIndexTable(PeerIndexTable),
    RibAfi(RibAfiEntries),
}

/// TABLE_DUMP (v1) message: one prefix, one peer, one attribute set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDumpMessage {
    pub view_number: u16,
    pub sequence_number: u16,
    pub prefix: IpNet,
    pub status: u8,
    pub originated_time: u32,
    pub peer_address: IpAddr,
    pub peer_asn: Asn,
    pub attributes: Vec<BgpAttribute>,
}

/// PEER_INDEX_TABLE: collector identity and the peer list.
///
/// The per-prefix records reference peers by index, but origin extraction
/// never needs the peer identity, so the list itself is skipped at parse
/// time and only its size retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerIndexTable {
    pub collector_bgp_id: Ipv4Addr,
    pub view_name: String,
    pub peer_count: u16,
}

/// RIB_IPV4_UNICAST / RIB_IPV6_UNICAST: one prefix with its table entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RibAfiEntries {
    pub rib_type: TableDumpV2Type,
    pub sequence_number: u32,
    pub prefix: IpNet,
    /// Total entries on the wire; under lazy parsing `entries` holds only
    /// the first one.
    pub entry_count: u16,
    pub entries: Vec<RibEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RibEntry {
    pub peer_index: u16,
    pub originated_time: u32,
    pub attributes: Vec<BgpAttribute>,
}

impl MrtRecord {
    /// The prefix this record advertises, if it is a per-prefix record.
    pub fn prefix(&self) -> Option<IpNet> {
        match &self.message {
            MrtMessage::TableDump(msg) => Some(msg.prefix),
            MrtMessage::TableDumpV2(TableDumpV2Message::RibAfi(rib)) => Some(rib.prefix),
            MrtMessage::TableDumpV2(TableDumpV2Message::PeerIndexTable(_)) => None,
        }
    }
}

impl Display for MrtRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.message {
            MrtMessage::TableDump(msg) => write!(f, "{msg}"),
            MrtMessage::TableDumpV2(msg) => write!(f, "{msg}"),
        }
    }
}

impl Display for TableDumpMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let family = if self.prefix.addr().is_ipv4() {
            "IPv4"
        } else {
            "IPv6"
        };
        write!(
            f,
            "TABLE_DUMP ({family} {}, peer AS{}, seq {})",
            self.prefix, self.peer_asn, self.sequence_number
        )
    }
}

impl Display for TableDumpV2Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TableDumpV2Message::PeerIndexTable(table) => write!(
                f,
                "TABLE_DUMP_V2 (PEER_INDEX_TABLE, collector {}, {} peers)",
                table.collector_bgp_id, table.peer_count
            ),
            TableDumpV2Message::RibAfi(rib) => {
                let family = match rib.rib_type {
                    TableDumpV2Type::RibIpv4Unicast => "RIB_IPV4_UNICAST",
                    TableDumpV2Type::RibIpv6Unicast => "RIB_IPV6_UNICAST",
                    TableDumpV2Type::PeerIndexTable => "PEER_INDEX_TABLE",
                };
                let more = if (rib.entries.len() as u16) < rib.entry_count {
                    "+"
                } else {
                    ""
                };
                write!(
                    f,
                    "TABLE_DUMP_V2 ({family} {}, {}{more} entries)",
                    rib.prefix,
                    rib.entries.len()
                )
            }
        }
    }
}
