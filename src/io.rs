use crate::error::IpasnError;
use bzip2::read::BzDecoder;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const BZ2_MAGIC: [u8; 3] = [0x42, 0x5a, 0x68]; // "BZh"

/// Open a local file, transparently undoing gzip or bzip2 framing.
///
/// Detection goes by magic bytes rather than file suffix, so renamed
/// archives and suffix-less temp files work the same. Anything else is
/// read as plain bytes.
pub fn open_archive(path: &Path) -> Result<Box<dyn Read>, IpasnError> {
    let mut file = File::open(path)?;
    let mut magic = [0u8; 3];
    let mut filled = 0;
    while filled < magic.len() {
        match file.read(&mut magic[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    file.seek(SeekFrom::Start(0))?;

    let reader: Box<dyn Read> = if filled >= 2 && magic[..2] == GZIP_MAGIC {
        Box::new(BufReader::new(MultiGzDecoder::new(file)))
    } else if filled >= 3 && magic == BZ2_MAGIC {
        Box::new(BufReader::new(BzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(reader)
}
