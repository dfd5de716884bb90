use crate::error::IpasnError;
use crate::models::*;
use crate::parser::table_dump::parse_table_dump_message;
use crate::parser::table_dump_v2::parse_table_dump_v2_message;
use crate::parser::ParseMode;
use bytes::{Bytes, BytesMut};
use std::io::Read;

/// Parse the 12-byte MRT common header.
///
/// Types other than TABLE_DUMP / TABLE_DUMP_V2 fail the stream: a RIB
/// archive interleaving anything else is not one this pipeline can
/// convert.
pub fn parse_common_header<T: Read>(input: &mut T) -> Result<CommonHeader, IpasnError> {
    let mut raw_bytes = [0u8; 12];
    input.read_exact(&mut raw_bytes)?;

    let timestamp = u32::from_be_bytes([raw_bytes[0], raw_bytes[1], raw_bytes[2], raw_bytes[3]]);
    let entry_type_raw = u16::from_be_bytes([raw_bytes[4], raw_bytes[5]]);
    let entry_type = EntryType::try_from(entry_type_raw)?;
    let entry_subtype = u16::from_be_bytes([raw_bytes[6], raw_bytes[7]]);
    let length = u32::from_be_bytes([raw_bytes[8], raw_bytes[9], raw_bytes[10], raw_bytes[11]]);

    Ok(CommonHeader {
        timestamp,
        entry_type,
        entry_subtype,
        length,
    })
}

/// An alternative to [parse_common_header] which returns `None` when the
/// stream ends cleanly at a record boundary. An EOF in the middle of the
/// header remains an error.
pub fn try_parse_common_header<T: Read>(
    input: &mut T,
) -> Result<Option<CommonHeader>, IpasnError> {
    let mut first_byte = [0];
    match input.read(&mut first_byte)? {
        0 => Ok(None),
        1 => {
            let mut reader = &first_byte[..];
            parse_common_header(&mut Read::chain(&mut reader, input)).map(Some)
        }
        _ => unreachable!("can only read 0 or 1 bytes into a buffer of length 1"),
    }
}

/// Read one framed record: header, body bytes, decoded body.
pub fn try_parse_mrt_record<T: Read>(
    input: &mut T,
    mode: ParseMode,
) -> Result<Option<MrtRecord>, IpasnError> {
    let common_header = match try_parse_common_header(input)? {
        Some(v) => v,
        None => return Ok(None),
    };

    // read the whole message bytes to buffer; a short read here is fatal
    let mut buffer = BytesMut::zeroed(common_header.length as usize);
    input.read_exact(&mut buffer)?;

    let message = parse_mrt_body(
        common_header.entry_type,
        common_header.entry_subtype,
        buffer.freeze(),
        mode,
    )?;

    Ok(Some(MrtRecord {
        common_header,
        message,
    }))
}

/// Decode a record body according to the type and sub-type from the
/// common header.
pub fn parse_mrt_body(
    entry_type: EntryType,
    entry_subtype: u16,
    data: Bytes,
    mode: ParseMode,
) -> Result<MrtMessage, IpasnError> {
    match entry_type {
        EntryType::TABLE_DUMP => {
            let msg = parse_table_dump_message(entry_subtype, data, mode)?;
            Ok(MrtMessage::TableDump(msg))
        }
        EntryType::TABLE_DUMP_V2 => {
            let msg = parse_table_dump_v2_message(entry_subtype, data, mode)?;
            Ok(MrtMessage::TableDumpV2(msg))
        }
    }
}
