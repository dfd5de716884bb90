use crate::error::IpasnError;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// ASN -- Autonomous System Number
///
/// A plain 32-bit identifier. Two-octet ASNs from TABLE_DUMP records widen
/// losslessly; the byte width on the wire is a property of the enclosing
/// record, not of the number itself.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Asn(u32);

impl Asn {
    #[inline]
    pub const fn new(asn: u32) -> Self {
        Asn(asn)
    }

    /// Return AS number as u32.
    #[inline]
    pub const fn to_u32(&self) -> u32 {
        self.0
    }

    /// Render in ASDOT notation (RFC 5396): `AS<H>.<L>` with the high part
    /// elided when zero.
    pub fn to_asdot(&self) -> String {
        let high = self.0 >> 16;
        let low = self.0 & 0xFFFF;
        if high == 0 {
            format!("AS{low}")
        } else {
            format!("AS{high}.{low}")
        }
    }

    /// Parse ASDOT notation: `AS<d+>` or `AS<H>.<L>`, with a
    /// case-insensitive `AS` prefix. Anything else is rejected.
    pub fn from_asdot(s: &str) -> Result<Asn, IpasnError> {
        let malformed = || IpasnError::MalformedAsdot(s.to_string());
        let rest = s
            .strip_prefix("AS")
            .or_else(|| s.strip_prefix("as"))
            .or_else(|| s.strip_prefix("As"))
            .or_else(|| s.strip_prefix("aS"))
            .ok_or_else(malformed)?;
        match rest.split_once('.') {
            None => {
                let plain: u32 = rest.parse().map_err(|_| malformed())?;
                Ok(Asn(plain))
            }
            Some((high, low)) => {
                let high: u16 = high.parse().map_err(|_| malformed())?;
                let low: u16 = low.parse().map_err(|_| malformed())?;
                Ok(Asn(((high as u32) << 16) + low as u32))
            }
        }
    }
}

impl From<u32> for Asn {
    #[inline]
    fn from(v: u32) -> Self {
        Asn(v)
    }
}

impl From<u16> for Asn {
    #[inline]
    fn from(v: u16) -> Self {
        Asn(v as u32)
    }
}

impl From<Asn> for u32 {
    #[inline]
    fn from(value: Asn) -> Self {
        value.0
    }
}

impl PartialEq<u32> for Asn {
    #[inline]
    fn eq(&self, other: &u32) -> bool {
        self.0 == *other
    }
}

impl Display for Asn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Debug for Asn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parse an ASN matching `[0-9]+`, `AS[0-9]+` or ASDOT form.
impl FromStr for Asn {
    type Err = IpasnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(plain) = s.parse::<u32>() {
            return Ok(Asn(plain));
        }
        Asn::from_asdot(s)
    }
}

/// Predicate for ASNs that must never be reported as a route origin.
///
/// The reserved and private-use ranges are fixed (IANA special-purpose
/// registry, RFC 6996 / RFC 7300 / RFC 5398). The allocation ceiling is a
/// heuristic guard against garbage in archived paths: any ASN at or above
/// it is treated as unallocated. Raise it as the registries grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BogusAsnPolicy {
    pub allocation_ceiling: u32,
}

impl Default for BogusAsnPolicy {
    fn default() -> Self {
        BogusAsnPolicy {
            allocation_ceiling: 1_000_000,
        }
    }
}

impl BogusAsnPolicy {
    pub fn is_bogus(&self, asn: Asn) -> bool {
        let n = asn.to_u32();
        // AS0 is never a valid origin (RFC 7607).
        n == 0
            || (64198..=131071).contains(&n)
            || n >= 4_200_000_000
            || n >= self.allocation_ceiling
    }
}
