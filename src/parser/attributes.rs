use crate::error::IpasnError;
use crate::models::*;
use crate::parser::{ParseMode, ReadUtils};
use bytes::{Buf, Bytes};
use log::debug;

/// Scan a record's attribute block into raw attributes.
///
/// Under [ParseMode::Lazy] scanning stops as soon as AS_PATH has been
/// captured: conversion reads nothing else, and skipping the remainder
/// saves a substantial share of decode time on real dumps. Under
/// [ParseMode::Strict] every attribute is walked and the block must be
/// consumed exactly.
pub fn parse_attributes(
    mut data: Bytes,
    mode: ParseMode,
) -> Result<Vec<BgpAttribute>, IpasnError> {
    let mut attributes: Vec<BgpAttribute> = Vec::with_capacity(8);

    while data.remaining() > 0 {
        data.require_n_remaining(3, "attribute header")?;
        let flags = data.get_u8();
        let attr_type = AttrType::from(data.get_u8());
        let attr_length = match flags & ATTR_FLAG_EXTENDED_LENGTH != 0 {
            false => data.read_u8()? as usize,
            true => data.read_u16()? as usize,
        };

        debug!("reading attribute: type -- {attr_type}, length -- {attr_length}");

        data.require_n_remaining(attr_length, "attribute value")?;
        let value = data.split_to(attr_length);

        let stop = mode == ParseMode::Lazy && attr_type == AttrType::AS_PATH;
        attributes.push(BgpAttribute {
            flags,
            attr_type,
            data: value,
        });
        if stop {
            break;
        }
    }

    Ok(attributes)
}

/// Decode an AS_PATH attribute value into its segments.
///
/// `asn_len` is dictated by the enclosing record family: two-byte in
/// TABLE_DUMP, four-byte in TABLE_DUMP_V2.
pub fn parse_as_path(mut data: Bytes, asn_len: AsnLength) -> Result<AsPath, IpasnError> {
    let mut segments = Vec::with_capacity(2);
    while data.remaining() > 0 {
        segments.push(parse_as_path_segment(&mut data, asn_len)?);
    }
    Ok(AsPath::from_segments(segments))
}

fn parse_as_path_segment(
    data: &mut Bytes,
    asn_len: AsnLength,
) -> Result<AsPathSegment, IpasnError> {
    data.require_n_remaining(2, "AS_PATH segment header")?;
    let segment_type = SegmentType::try_from(data.get_u8())?;
    let count = data.get_u8() as usize;

    let mut asns = Vec::with_capacity(count);
    for _ in 0..count {
        asns.push(data.read_asn(asn_len)?);
    }

    Ok(match segment_type {
        SegmentType::AS_SET => AsPathSegment::AsSet(asns),
        SegmentType::AS_SEQUENCE => AsPathSegment::AsSequence(asns),
        SegmentType::AS_CONFED_SEQUENCE => AsPathSegment::ConfedSequence(asns),
        SegmentType::AS_CONFED_SET => AsPathSegment::ConfedSet(asns),
    })
}

/// Pull the AS_PATH out of a scanned attribute list and decode it.
///
/// A well-formed entry carries the attribute exactly once; repeats are a
/// structural record error.
pub fn as_path_of(
    attributes: &[BgpAttribute],
    asn_len: AsnLength,
) -> Result<AsPath, IpasnError> {
    let mut found: Option<&BgpAttribute> = None;
    for attr in attributes {
        if attr.attr_type == AttrType::AS_PATH {
            if found.is_some() {
                return Err(IpasnError::ParseError(
                    "duplicate AS_PATH attribute in one entry".to_string(),
                ));
            }
            found = Some(attr);
        }
    }
    match found {
        Some(attr) => parse_as_path(attr.data.clone(), asn_len),
        None => Err(IpasnError::NoOrigin(
            "entry carries no AS_PATH attribute".to_string(),
        )),
    }
}
