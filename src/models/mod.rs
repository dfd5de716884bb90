//! Common structs shared by the parser, the lookup engine and the CLI.

mod asn;
mod aspath;
mod attr;
mod mrt;
mod origin;

pub use asn::*;
pub use aspath::*;
pub use attr::*;
pub use mrt::*;
pub use origin::*;

/// ASN byte width on the wire: 16-bit in TABLE_DUMP attributes, 32-bit in
/// TABLE_DUMP_V2 attributes (RFC 4893 capable collectors).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsnLength {
    Bits16,
    Bits32,
}
