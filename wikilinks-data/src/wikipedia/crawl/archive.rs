//! Opening plain or bzip2-compressed XML exports.

use std::io::{BufRead, BufReader};

use bzip2::bufread::MultiBzDecoder;
use camino::Utf8Path;
use wikilinks_fs::open_utf8_file;

use super::CrawlError;

const BZIP2_MAGIC: &[u8; 3] = b"BZh";
const ARCHIVE_BUFFER_BYTES: usize = 1 << 20;

/// Open the export at `path`, transparently decompressing bzip2 archives.
///
/// Compression is detected from the file contents rather than the
/// extension. Multistream archives are decoded in full.
pub fn open_archive(path: &Utf8Path) -> Result<Box<dyn BufRead>, CrawlError> {
    let open_error = |source| CrawlError::OpenArchive {
        path: path.to_path_buf(),
        source,
    };
    let file = open_utf8_file(path).map_err(open_error)?;
    let mut buffered = BufReader::with_capacity(ARCHIVE_BUFFER_BYTES, file.into_std());
    if is_bzip2(&mut buffered).map_err(open_error)? {
        log::debug!("{path} is bzip2 compressed");
        let decoder = MultiBzDecoder::new(buffered);
        Ok(Box::new(BufReader::with_capacity(
            ARCHIVE_BUFFER_BYTES,
            decoder,
        )))
    } else {
        Ok(Box::new(buffered))
    }
}

pub(crate) fn is_bzip2<R: BufRead>(reader: &mut R) -> std::io::Result<bool> {
    let head = reader.fill_buf()?;
    Ok(head.starts_with(BZIP2_MAGIC))
}

