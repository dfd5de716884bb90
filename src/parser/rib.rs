//! RIB archive to prefix-origin table conversion.

use crate::error::IpasnError;
use crate::models::*;
use crate::parser::attributes::as_path_of;
use crate::parser::MrtDumpReader;
use indexmap::IndexMap;
use ipnet::IpNet;
use log::{info, warn};
use std::io::Read;
use std::str::FromStr;

/// Prefix to origin mapping in MRT-arrival order (first occurrence wins).
pub type PrefixOriginMap = IndexMap<IpNet, OriginAs>;

/// Knobs for a conversion run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertOptions {
    /// Log a progress line every couple hundred thousand records.
    pub show_progress: bool,
    /// Downgrade per-record failures to warnings and drop the record.
    /// Stream-level failures stay fatal.
    pub skip_on_error: bool,
    /// Keep `0.0.0.0/0` / `::/0` instead of stripping them at the end.
    pub keep_default_route: bool,
    pub bogus_policy: BogusAsnPolicy,
}

/// Derive the origin of a per-prefix record from its first table entry.
///
/// TABLE_DUMP records carry a single entry with two-octet path members;
/// TABLE_DUMP_V2 RIB records may carry many entries but only entry 0 is
/// consulted.
pub fn record_origin(
    record: &MrtRecord,
    policy: &BogusAsnPolicy,
) -> Result<OriginAs, IpasnError> {
    let path = match &record.message {
        MrtMessage::TableDump(msg) => as_path_of(&msg.attributes, AsnLength::Bits16)?,
        MrtMessage::TableDumpV2(TableDumpV2Message::RibAfi(rib)) => {
            let entry = rib.entries.first().ok_or_else(|| {
                IpasnError::ParseError(format!("RIB record for {} has no entries", rib.prefix))
            })?;
            as_path_of(&entry.attributes, AsnLength::Bits32)?
        }
        MrtMessage::TableDumpV2(TableDumpV2Message::PeerIndexTable(_)) => {
            return Err(IpasnError::ParseError(
                "peer index table carries no origin".to_string(),
            ))
        }
    };
    path.origin(policy)
}

/// Convert an MRT/RIB archive into a prefix-origin table.
///
/// Semantics preserved from years of archived-dump behavior:
/// - first occurrence of a prefix wins; a TABLE_DUMP_V2 repeat whose
///   origin differs is logged, never an error;
/// - default routes are dropped after the pass unless
///   `keep_default_route`;
/// - with `skip_on_error`, a record that fails decoding or yields no
///   usable origin is logged and dropped.
pub fn parse_rib_dump<R: Read>(
    reader: MrtDumpReader<R>,
    opts: &ConvertOptions,
) -> Result<PrefixOriginMap, IpasnError> {
    let mut prefixes = PrefixOriginMap::new();
    let mut n: u64 = 0;

    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(err) if opts.skip_on_error && err.is_record_level() => {
                warn!("skipping undecodable record: {err}");
                continue;
            }
            Err(err) => return Err(err),
        };

        let prefix = match record.prefix() {
            Some(prefix) => prefix,
            None => {
                // peer index table or other non-prefix record
                if opts.show_progress {
                    info!("parsing MRT/RIB archive .. {record}");
                }
                continue;
            }
        };

        match prefixes.get(&prefix) {
            None => match record_origin(&record, &opts.bogus_policy) {
                Ok(origin) => {
                    prefixes.insert(prefix, origin);
                }
                Err(err) if opts.skip_on_error && err.is_record_level() => {
                    warn!("cannot derive origin for prefix {prefix}: {err}");
                    continue;
                }
                Err(err) => return Err(err),
            },
            Some(first) => {
                // Repeated prefix. In TABLE_DUMP repeats were routine and
                // first-match always applied; TABLE_DUMP_V2 archives began
                // repeating prefixes again around 2017, mostly but not
                // always with the same origin. Keep the first, log the
                // difference.
                if record.common_header.entry_type == EntryType::TABLE_DUMP_V2 {
                    if let Ok(repeat) = record_origin(&record, &opts.bogus_policy) {
                        if repeat != *first {
                            warn!(
                                "repeated prefix '{prefix}' maps to different origin ({first} vs {repeat})"
                            );
                        }
                    }
                }
            }
        }

        n += 1;
        let step = match record.common_header.entry_type {
            EntryType::TABLE_DUMP => 500_000,
            EntryType::TABLE_DUMP_V2 => 100_000,
        };
        if opts.show_progress && n % step == 0 {
            info!("  MRT record {n}");
        }
    }

    if !opts.keep_default_route {
        prefixes.shift_remove(&IpNet::from_str("0.0.0.0/0").expect("valid literal"));
        prefixes.shift_remove(&IpNet::from_str("::/0").expect("valid literal"));
    }

    Ok(prefixes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParseMode;
    use bytes::{BufMut, BytesMut};

    /// One TABLE_DUMP_V2 RIB_IPV4_UNICAST record advertising `prefix_len`
    /// bits of `prefix_octets` with the given 32-bit AS_PATH sequence.
    fn rib_v4_record(seq: u32, prefix_octets: &[u8], prefix_len: u8, path: &[u32]) -> BytesMut {
        let mut attr_value = BytesMut::new();
        attr_value.put_u8(2); // AS_SEQUENCE
        attr_value.put_u8(path.len() as u8);
        for asn in path {
            attr_value.put_u32(*asn);
        }

        let mut entry = BytesMut::new();
        entry.put_u16(0); // peer index
        entry.put_u32(0); // originated time
        entry.put_u16((attr_value.len() + 3) as u16);
        entry.put_u8(0x40);
        entry.put_u8(2); // AS_PATH
        entry.put_u8(attr_value.len() as u8);
        entry.extend(&attr_value);

        let mut body = BytesMut::new();
        body.put_u32(seq);
        body.put_u8(prefix_len);
        body.put_slice(prefix_octets);
        body.put_u16(1);
        body.extend(&entry);

        let mut record = BytesMut::new();
        record.put_u32(1400824800);
        record.put_u16(13);
        record.put_u16(2); // RIB_IPV4_UNICAST
        record.put_u32(body.len() as u32);
        record.extend(&body);
        record
    }

    fn opts() -> ConvertOptions {
        ConvertOptions::default()
    }

    #[test]
    fn test_first_occurrence_wins() {
        let mut stream = rib_v4_record(0, &[8, 8, 8], 24, &[701, 15169]);
        stream.extend(rib_v4_record(1, &[8, 8, 8], 24, &[701, 3356]));
        let data = stream.freeze();
        let reader = MrtDumpReader::new(data.as_ref());
        let map = parse_rib_dump(reader, &opts()).unwrap();
        assert_eq!(1, map.len());
        assert_eq!(
            &OriginAs::Single(Asn::new(15169)),
            map.get(&"8.8.8.0/24".parse::<IpNet>().unwrap()).unwrap()
        );
    }

    #[test]
    fn test_default_route_stripped() {
        let mut stream = rib_v4_record(0, &[], 0, &[2905, 65023, 16637]);
        stream.extend(rib_v4_record(1, &[1, 0, 0], 24, &[701, 6453, 15169]));
        let data = stream.freeze();
        let reader = MrtDumpReader::new(data.as_ref());
        let map = parse_rib_dump(reader, &opts()).unwrap();
        assert_eq!(1, map.len());
        assert!(map.contains_key(&"1.0.0.0/24".parse::<IpNet>().unwrap()));
    }

    #[test]
    fn test_default_route_kept_on_request() {
        let stream = rib_v4_record(0, &[], 0, &[2905, 16637]);
        let data = stream.freeze();
        let reader = MrtDumpReader::new(data.as_ref());
        let map = parse_rib_dump(
            reader,
            &ConvertOptions {
                keep_default_route: true,
                ..ConvertOptions::default()
            },
        )
        .unwrap();
        assert!(map.contains_key(&"0.0.0.0/0".parse::<IpNet>().unwrap()));
    }

    #[test]
    fn test_arrival_order_preserved() {
        let mut stream = rib_v4_record(0, &[9, 9, 9], 24, &[701, 13335]);
        stream.extend(rib_v4_record(1, &[1, 0, 0], 24, &[701, 15169]));
        stream.extend(rib_v4_record(2, &[5, 128], 14, &[701, 31200]));
        let data = stream.freeze();
        let reader = MrtDumpReader::new(data.as_ref());
        let map = parse_rib_dump(reader, &opts()).unwrap();
        let order: Vec<String> = map.keys().map(|p| p.to_string()).collect();
        assert_eq!(vec!["9.9.9.0/24", "1.0.0.0/24", "5.128.0.0/14"], order);
    }

    #[test]
    fn test_no_origin_aborts_by_default() {
        let stream = rib_v4_record(0, &[8, 8, 8], 24, &[64512, 65534]);
        let data = stream.freeze();
        let reader = MrtDumpReader::new(data.as_ref());
        assert!(matches!(
            parse_rib_dump(reader, &opts()),
            Err(IpasnError::NoOrigin(_))
        ));
    }

    #[test]
    fn test_skip_on_error_drops_record() {
        let mut stream = rib_v4_record(0, &[8, 8, 8], 24, &[64512, 65534]);
        stream.extend(rib_v4_record(1, &[1, 0, 0], 24, &[701, 15169]));
        let data = stream.freeze();
        let reader = MrtDumpReader::new(data.as_ref());
        let map = parse_rib_dump(
            reader,
            &ConvertOptions {
                skip_on_error: true,
                ..ConvertOptions::default()
            },
        )
        .unwrap();
        assert_eq!(1, map.len());
        assert!(map.contains_key(&"1.0.0.0/24".parse::<IpNet>().unwrap()));
    }

    #[test]
    fn test_truncated_stream_fatal_despite_skip() {
        let mut stream = rib_v4_record(0, &[1, 0, 0], 24, &[701, 15169]);
        stream.put_slice(&[0, 0, 0, 1, 0, 13]); // half a header
        let data = stream.freeze();
        let reader = MrtDumpReader::new(data.as_ref());
        assert!(matches!(
            parse_rib_dump(
                reader,
                &ConvertOptions {
                    skip_on_error: true,
                    ..ConvertOptions::default()
                }
            ),
            Err(IpasnError::EofError(_))
        ));
    }

    #[test]
    fn test_record_origin_uses_first_entry() {
        let stream = rib_v4_record(0, &[1, 0, 0], 24, &[701, 6453, 15169]);
        let data = stream.freeze();
        let mut reader = MrtDumpReader::with_mode(data.as_ref(), ParseMode::Lazy);
        let record = reader.next_record().unwrap().unwrap();
        let origin = record_origin(&record, &BogusAsnPolicy::default()).unwrap();
        assert_eq!(OriginAs::Single(Asn::new(15169)), origin);
    }
}
