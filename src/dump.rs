/*!
Materializing conversion results: the IPASN text table, and a
human-readable record dump for eyeballing archives.
*/
use crate::error::IpasnError;
use crate::models::*;
use crate::parser::attributes::parse_as_path;
use crate::parser::rib::{record_origin, PrefixOriginMap};
use crate::parser::MrtDumpReader;
use chrono::Local;
use std::io::{Read, Write};

/// Write a prefix-origin table in IPASN text form.
///
/// Lines come out in the map's (MRT-arrival) order. Set origins collapse
/// to their representative unless `debug_write_sets` asks for the full
/// `{a,b,c}` form.
pub fn dump_prefixes_to_writer<W: Write>(
    writer: &mut W,
    prefixes: &PrefixOriginMap,
    source_description: &str,
    debug_write_sets: bool,
) -> Result<(), IpasnError> {
    let n4 = prefixes.keys().filter(|prefix| prefix.addr().is_ipv4()).count();
    let n6 = prefixes.len() - n4;

    writeln!(writer, "; IP-ASN32-DAT file")?;
    writeln!(writer, "; Original source: {source_description}")?;
    writeln!(
        writer,
        "; Converted on  : {}",
        Local::now().format("%a %b %e %H:%M:%S %Y")
    )?;
    writeln!(writer, "; Prefixes-v4   : {n4}")?;
    writeln!(writer, "; Prefixes-v6   : {n6}")?;
    writeln!(writer, "; ")?;

    for (prefix, origin) in prefixes {
        match origin {
            OriginAs::Set(_) if debug_write_sets => {
                writeln!(writer, "{prefix}\t{origin}")?;
            }
            origin => {
                writeln!(writer, "{prefix}\t{}", origin.representative())?;
            }
        }
    }
    Ok(())
}

/// Write the table to a file; with `compress` the output goes to
/// `<path>.gz` instead.
///
/// Returns the path actually written.
pub fn dump_prefixes_to_file(
    prefixes: &PrefixOriginMap,
    path: &str,
    source_description: &str,
    compress: bool,
) -> Result<String, IpasnError> {
    let out_path = if compress {
        format!("{path}.gz")
    } else {
        path.to_string()
    };
    let mut writer = oneio::get_writer(&out_path)?;
    dump_prefixes_to_writer(&mut writer, prefixes, source_description, false)?;
    writer.flush()?;
    Ok(out_path)
}

/// Render an archive record by record, attributes and all, with the
/// per-record origin choice. Debugging surface; decodes strictly and so
/// also flags malformed attribute blocks lazy conversion would skip
/// over.
pub fn dump_screen<R: Read, W: Write>(
    mut reader: MrtDumpReader<R>,
    screen: &mut W,
    record_from: Option<usize>,
    record_to: Option<usize>,
) -> Result<(), IpasnError> {
    writeln!(screen, "Dumping MRT/RIB archive to screen:")?;
    let policy = BogusAsnPolicy::default();
    let mut n = 0usize;

    while let Some(record) = reader.next_record()? {
        n += 1;
        if record_from.is_some_and(|from| n < from) {
            continue;
        }
        if record_to.is_some_and(|to| n > to) {
            break;
        }

        writeln!(screen, "\nRecord #{n:06}: {record}")?;
        match &record.message {
            MrtMessage::TableDump(msg) => {
                for attr in &msg.attributes {
                    write_attr(screen, attr, AsnLength::Bits16)?;
                }
                write_origin_choice(screen, &record, &policy)?;
            }
            MrtMessage::TableDumpV2(TableDumpV2Message::RibAfi(rib)) => {
                for (i, entry) in rib.entries.iter().enumerate() {
                    writeln!(screen, "    Entry {:02}", i + 1)?;
                    for attr in &entry.attributes {
                        write_attr(screen, attr, AsnLength::Bits32)?;
                    }
                }
                write_origin_choice(screen, &record, &policy)?;
            }
            MrtMessage::TableDumpV2(TableDumpV2Message::PeerIndexTable(_)) => {}
        }
    }
    Ok(())
}

fn write_attr<W: Write>(
    screen: &mut W,
    attr: &BgpAttribute,
    asn_len: AsnLength,
) -> Result<(), IpasnError> {
    if attr.attr_type == AttrType::AS_PATH {
        match parse_as_path(attr.data.clone(), asn_len) {
            Ok(path) => writeln!(screen, "        AS_PATH: {path}")?,
            Err(err) => writeln!(screen, "        AS_PATH: <undecodable: {err}>")?,
        }
    } else {
        writeln!(screen, "        {attr}")?;
    }
    Ok(())
}

fn write_origin_choice<W: Write>(
    screen: &mut W,
    record: &MrtRecord,
    policy: &BogusAsnPolicy,
) -> Result<(), IpasnError> {
    match record_origin(record, policy) {
        Ok(origin) => writeln!(screen, "    => origin choice: AS {origin}")?,
        Err(_) => writeln!(screen, "    => origin choice: <none>")?,
    }
    Ok(())
}
