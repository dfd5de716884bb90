/*!
error module defines the error types used across ipasn.
*/
use crate::models::{Afi, EntryType, SegmentType};
use num_enum::TryFromPrimitiveError;
use oneio::OneIoError;
use std::fmt::{Display, Formatter};
use std::io::ErrorKind;
use std::{error::Error, fmt, io};

#[derive(Debug)]
pub enum IpasnError {
    IoError(io::Error),
    /// Truncated input: the stream ended inside a record frame.
    EofError(io::Error),
    RemoteError(OneIoError),
    /// A query or DB literal that is not a valid address of the named family.
    MalformedAddress { family: Afi, input: String },
    /// An ASN string that is neither `AS<d>` nor `AS<H>.<L>`.
    MalformedAsdot(String),
    /// MRT type outside TABLE_DUMP / TABLE_DUMP_V2.
    UnrecognizedMrtType(u16),
    /// Known MRT type carrying a sub-type the origin pipeline does not accept.
    UnrecognizedSubType { entry_type: u16, sub_type: u16 },
    /// Structural problem inside a single record body.
    ParseError(String),
    /// A length field claimed more bytes than the enclosing buffer holds.
    TruncatedMsg(String),
    /// AS_PATH segment type outside AS_SET/AS_SEQUENCE/AS_CONFED_*.
    UnsupportedSegment(u8),
    /// AS_PATH present but no non-bogus origin could be derived.
    NoOrigin(String),
    /// AS-names operation requested but no names table was loaded.
    AsNamesNotLoaded,
}

impl Error for IpasnError {}

impl Display for IpasnError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            IpasnError::IoError(e) => write!(f, "Error: {e}"),
            IpasnError::EofError(e) => write!(f, "Error: unexpected end of stream: {e}"),
            IpasnError::RemoteError(e) => write!(f, "Error: {e}"),
            IpasnError::MalformedAddress { family, input } => match family {
                Afi::Ipv4 => write!(f, "Error: invalid v4 address '{input}'"),
                Afi::Ipv6 => write!(f, "Error: invalid v6 address '{input}'"),
            },
            IpasnError::MalformedAsdot(s) => write!(f, "Error: invalid ASDOT string '{s}'"),
            IpasnError::UnrecognizedMrtType(t) => {
                write!(f, "Error: unknown MRT record type {t}")
            }
            IpasnError::UnrecognizedSubType {
                entry_type,
                sub_type,
            } => write!(
                f,
                "Error: unsupported sub-type {sub_type} for MRT type {entry_type}"
            ),
            IpasnError::ParseError(s) => write!(f, "Error: {s}"),
            IpasnError::TruncatedMsg(s) => write!(f, "Error: {s}"),
            IpasnError::UnsupportedSegment(t) => {
                write!(f, "Error: invalid AS_PATH segment type {t}")
            }
            IpasnError::NoOrigin(s) => write!(f, "Error: no origin AS: {s}"),
            IpasnError::AsNamesNotLoaded => {
                write!(f, "Error: autonomous system names were not loaded")
            }
        }
    }
}

impl From<io::Error> for IpasnError {
    fn from(io_error: io::Error) -> Self {
        match io_error.kind() {
            ErrorKind::UnexpectedEof => IpasnError::EofError(io_error),
            _ => IpasnError::IoError(io_error),
        }
    }
}

impl From<OneIoError> for IpasnError {
    fn from(error: OneIoError) -> Self {
        IpasnError::RemoteError(error)
    }
}

impl From<TryFromPrimitiveError<EntryType>> for IpasnError {
    fn from(value: TryFromPrimitiveError<EntryType>) -> Self {
        IpasnError::UnrecognizedMrtType(value.number)
    }
}

impl From<TryFromPrimitiveError<SegmentType>> for IpasnError {
    fn from(value: TryFromPrimitiveError<SegmentType>) -> Self {
        IpasnError::UnsupportedSegment(value.number)
    }
}

impl IpasnError {
    /// Whether the error concerns a single record rather than the stream as a
    /// whole. Only these may be downgraded to warnings by `skip_on_error`.
    pub fn is_record_level(&self) -> bool {
        matches!(
            self,
            IpasnError::ParseError(_)
                | IpasnError::TruncatedMsg(_)
                | IpasnError::UnsupportedSegment(_)
                | IpasnError::NoOrigin(_)
        )
    }
}
