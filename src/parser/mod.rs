/*!
MRT table-dump stream reading: framed record iteration and the
RIB-to-prefix-table conversion driver.
*/
pub mod attributes;
pub mod mrt_record;
pub mod rib;
pub mod table_dump;
pub mod table_dump_v2;
pub mod utils;

pub use attributes::{as_path_of, parse_as_path, parse_attributes};
pub use mrt_record::{parse_common_header, try_parse_common_header, try_parse_mrt_record};
pub use rib::{parse_rib_dump, record_origin, ConvertOptions, PrefixOriginMap};
pub use utils::ReadUtils;

use crate::error::IpasnError;
use crate::io::open_archive;
use crate::models::MrtRecord;
use std::io::Read;
use std::path::Path;

/// How much of each record body to decode.
///
/// Origin extraction needs nothing past AS_PATH of entry 0, so `Lazy`
/// stops there. `Strict` decodes every entry and every attribute and
/// verifies that declared lengths are consumed exactly; the screen dump
/// uses it, and it doubles as a format validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Lazy,
    Strict,
}

/// A pull reader over a stream of framed MRT table-dump records.
///
/// One record body is resident at a time; memory use is bounded by the
/// largest record in the stream.
pub struct MrtDumpReader<R> {
    reader: R,
    mode: ParseMode,
}

impl MrtDumpReader<Box<dyn Read>> {
    /// Open a local archive, transparently decompressing gzip or bzip2
    /// framing detected from the file's magic bytes.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IpasnError> {
        Ok(MrtDumpReader::new(open_archive(path.as_ref())?))
    }

    /// Like [MrtDumpReader::open] with an explicit [ParseMode].
    pub fn open_with_mode(path: impl AsRef<Path>, mode: ParseMode) -> Result<Self, IpasnError> {
        Ok(MrtDumpReader::with_mode(open_archive(path.as_ref())?, mode))
    }
}

impl<R: Read> MrtDumpReader<R> {
    pub fn new(reader: R) -> Self {
        MrtDumpReader {
            reader,
            mode: ParseMode::Lazy,
        }
    }

    pub fn with_mode(reader: R, mode: ParseMode) -> Self {
        MrtDumpReader { reader, mode }
    }

    /// Read the next record; `Ok(None)` at a clean end of stream.
    pub fn next_record(&mut self) -> Result<Option<MrtRecord>, IpasnError> {
        try_parse_mrt_record(&mut self.reader, self.mode)
    }

    pub fn records(self) -> RecordIter<R> {
        RecordIter {
            parser: self,
            had_fatal_error: false,
        }
    }
}

/// Iterator adapter over [MrtDumpReader].
///
/// Record-level decode errors are yielded and iteration continues at the
/// next frame (the body bytes were already consumed). Stream-level errors
/// (truncated frame, unknown MRT type) are yielded once, after which the
/// iterator fuses.
pub struct RecordIter<R> {
    parser: MrtDumpReader<R>,
    had_fatal_error: bool,
}

impl<R: Read> Iterator for RecordIter<R> {
    type Item = Result<MrtRecord, IpasnError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.had_fatal_error {
            return None;
        }
        match self.parser.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(err) => {
                if !err.is_record_level() {
                    self.had_fatal_error = true;
                }
                Some(Err(err))
            }
        }
    }
}
