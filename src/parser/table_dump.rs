use crate::error::IpasnError;
use crate::models::*;
use crate::parser::attributes::parse_attributes;
use crate::parser::{ParseMode, ReadUtils};
use bytes::Bytes;
use ipnet::{IpNet, Ipv4Net, Ipv6Net};

/// Parse a TABLE_DUMP (v1) message.
///
/// <https://www.rfc-editor.org/rfc/rfc6396#section-4.2>
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |         View Number           |       Sequence Number         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                        Prefix (variable)                      |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | Prefix Length |    Status     |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                         Originated Time                       |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                    Peer IP Address (variable)                 |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |           Peer AS             |       Attribute Length        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                   BGP Attribute... (variable)
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// The prefix occupies the full family width here, unlike the packed form
/// of TABLE_DUMP_V2. Peer ASNs and attribute ASNs are two octets; this
/// type predates four-octet AS support.
pub fn parse_table_dump_message(
    sub_type: u16,
    mut data: Bytes,
    mode: ParseMode,
) -> Result<TableDumpMessage, IpasnError> {
    let afi = match sub_type {
        1 => Afi::Ipv4,
        2 => Afi::Ipv6,
        _ => {
            return Err(IpasnError::UnrecognizedSubType {
                entry_type: EntryType::TABLE_DUMP.into(),
                sub_type,
            })
        }
    };

    let view_number = data.read_u16()?;
    let sequence_number = data.read_u16()?;

    let prefix = match afi {
        Afi::Ipv4 => {
            let addr = data.read_ipv4_address()?;
            let len = data.read_u8()?;
            IpNet::V4(
                Ipv4Net::new(addr, len)
                    .map_err(|_| IpasnError::ParseError(format!("invalid prefix length {len}")))?,
            )
        }
        Afi::Ipv6 => {
            let addr = data.read_ipv6_address()?;
            let len = data.read_u8()?;
            IpNet::V6(
                Ipv6Net::new(addr, len)
                    .map_err(|_| IpasnError::ParseError(format!("invalid prefix length {len}")))?,
            )
        }
    };

    let status = data.read_u8()?;
    // the status octet is unused in TABLE_DUMP and must be set to 1
    if status != 1 {
        return Err(IpasnError::ParseError(format!(
            "TABLE_DUMP status octet is {status}, expected 1"
        )));
    }
    let originated_time = data.read_u32()?;

    let peer_address = data.read_address(afi)?;
    let peer_asn = data.read_asn(AsnLength::Bits16)?;

    if view_number != 0 {
        return Err(IpasnError::ParseError(format!(
            "TABLE_DUMP view number is {view_number}, expected 0"
        )));
    }

    let attribute_length = data.read_u16()? as usize;
    data.require_n_remaining(attribute_length, "TABLE_DUMP attributes")?;
    let attr_data = data.split_to(attribute_length);
    let attributes = parse_attributes(attr_data, mode)?;

    Ok(TableDumpMessage {
        view_number,
        sequence_number,
        prefix,
        status,
        originated_time,
        peer_address,
        peer_asn,
        attributes,
    })
}
