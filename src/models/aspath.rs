use crate::error::IpasnError;
use crate::models::{Asn, BogusAsnPolicy, OriginAs};
use itertools::Itertools;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt::{Display, Formatter};

/// AS_PATH segment type codes (RFC 4271 section 4.3, RFC 5065).
#[allow(non_camel_case_types)]
#[derive(Debug, TryFromPrimitive, IntoPrimitive, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum SegmentType {
    AS_SET = 1,
    AS_SEQUENCE = 2,
    AS_CONFED_SEQUENCE = 3,
    AS_CONFED_SET = 4,
}

/// One AS_PATH segment: an ordered sequence, an unordered set, or their
/// confederation-internal counterparts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsPathSegment {
    AsSequence(Vec<Asn>),
    AsSet(Vec<Asn>),
    ConfedSequence(Vec<Asn>),
    ConfedSet(Vec<Asn>),
}

impl AsPathSegment {
    /// Shorthand for building an `AsSequence` segment.
    pub fn sequence<S: AsRef<[u32]>>(asns: S) -> Self {
        AsPathSegment::AsSequence(asns.as_ref().iter().copied().map(Asn::new).collect())
    }

    /// Shorthand for building an `AsSet` segment.
    pub fn set<S: AsRef<[u32]>>(asns: S) -> Self {
        AsPathSegment::AsSet(asns.as_ref().iter().copied().map(Asn::new).collect())
    }
}

impl Display for AsPathSegment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let (label, asns) = match self {
            AsPathSegment::AsSequence(v) => ("sequence", v),
            AsPathSegment::AsSet(v) => ("set", v),
            AsPathSegment::ConfedSequence(v) => ("confed-sequence", v),
            AsPathSegment::ConfedSet(v) => ("confed-set", v),
        };
        write!(f, "{label}[{}]", asns.iter().join(", "))
    }
}

/// An AS_PATH attribute value: the concatenation of its segments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AsPath {
    pub segments: Vec<AsPathSegment>,
}

impl AsPath {
    pub fn from_segments(segments: Vec<AsPathSegment>) -> Self {
        AsPath { segments }
    }

    /// Derive the originating AS for the route this path was advertised
    /// with.
    ///
    /// A well-formed producer path starts with AS_SEQUENCE (RFC 4271
    /// update rules). Walking segments back-to-front: the rightmost
    /// non-bogus member of a sequence names the origin outright, while a
    /// set (created by route aggregation) yields every surviving member.
    /// Confederation segments are transparent. Archived dumps do contain
    /// reserved and unallocated ASNs in terminal position, so filtering
    /// happens here rather than at decode time.
    pub fn origin(&self, policy: &BogusAsnPolicy) -> Result<OriginAs, IpasnError> {
        match self.segments.first() {
            Some(AsPathSegment::AsSequence(_)) => {}
            Some(_) => {
                return Err(IpasnError::NoOrigin(
                    "AS_PATH does not start with an AS_SEQUENCE segment".to_string(),
                ))
            }
            None => return Err(IpasnError::NoOrigin("empty AS_PATH".to_string())),
        }

        for segment in self.segments.iter().rev() {
            match segment {
                AsPathSegment::AsSequence(asns) => {
                    if let Some(origin) = asns.iter().rev().find(|asn| !policy.is_bogus(**asn)) {
                        return Ok(OriginAs::Single(*origin));
                    }
                }
                AsPathSegment::AsSet(asns) => {
                    let survivors: Vec<Asn> = asns
                        .iter()
                        .copied()
                        .filter(|asn| !policy.is_bogus(*asn))
                        .collect();
                    if !survivors.is_empty() {
                        return Ok(OriginAs::Set(survivors));
                    }
                }
                AsPathSegment::ConfedSequence(_) | AsPathSegment::ConfedSet(_) => {}
            }
        }

        Err(IpasnError::NoOrigin(
            "all AS_PATH members are bogus".to_string(),
        ))
    }
}

impl Display for AsPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.iter().join(", "))
    }
}
