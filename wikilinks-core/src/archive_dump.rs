//! Archive dump file format.
//!
//! An archive dump caches the [`ArticleMap`] extracted from a Wikipedia XML
//! export so the expensive crawl runs once. The file starts with the `WLAD`
//! magic and a little-endian `u16` format version, followed by the `bincode`
//! encoding of the map.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use bincode::{deserialize_from, serialize_into};
use thiserror::Error;

use crate::ArticleMap;

/// File identifier for archive dumps.
pub const ARCHIVE_DUMP_MAGIC: [u8; 4] = *b"WLAD";

/// Supported archive dump format version.
pub const ARCHIVE_DUMP_VERSION: u16 = 1;

/// Error emitted when loading an archive dump.
#[derive(Debug, Error)]
pub enum ArchiveDumpError {
    /// The dump could not be read from disk.
    #[error("failed to read archive dump from {path}: {source}")]
    Io {
        /// Location of the archive dump.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The payload could not be decoded.
    #[error("failed to decode archive dump from {path}: {source}")]
    Decode {
        /// Location of the archive dump.
        path: PathBuf,
        /// Decoder error returned by `bincode`.
        #[source]
        source: bincode::Error,
    },
    /// The file did not start with the archive dump magic.
    #[error("invalid archive dump magic: expected {expected:?}, found {found:?}")]
    InvalidMagic {
        /// Expected byte sequence.
        expected: [u8; 4],
        /// Sequence read from the file.
        found: [u8; 4],
    },
    /// The file was written by an incompatible format version.
    #[error("unsupported archive dump version {found}; supported version is {supported}")]
    UnsupportedVersion {
        /// Version present in the file header.
        found: u16,
        /// Version understood by this build.
        supported: u16,
    },
}

/// Error emitted when writing an archive dump.
#[derive(Debug, Error)]
pub enum ArchiveDumpWriteError {
    /// Writing bytes to disk failed.
    #[error("failed to write archive dump to {path}: {source}")]
    Io {
        /// Destination file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The map could not be encoded.
    #[error("failed to encode archive dump for {path}: {source}")]
    Encode {
        /// Destination file path.
        path: PathBuf,
        /// Encoder failure from `bincode`.
        #[source]
        source: bincode::Error,
    },
}

/// Persist `map` as an archive dump, truncating any existing file.
///
/// # Examples
///
/// ```
/// use wikilinks_core::{ArticleMap, read_archive_dump, write_archive_dump};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dir = tempfile::tempdir()?;
/// let path = dir.path().join("archive_dump.bincode");
/// let mut map = ArticleMap::default();
/// let source = map.insert_article("Ferris");
/// let target = map.insert_article("Crab");
/// map.insert_link(source, target);
///
/// write_archive_dump(&path, &map)?;
/// assert_eq!(read_archive_dump(&path)?, map);
/// # Ok(())
/// # }
/// ```
pub fn write_archive_dump(path: &Path, map: &ArticleMap) -> Result<(), ArchiveDumpWriteError> {
    let io_error = |source| ArchiveDumpWriteError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&ARCHIVE_DUMP_MAGIC).map_err(io_error)?;
    writer
        .write_all(&ARCHIVE_DUMP_VERSION.to_le_bytes())
        .map_err(io_error)?;
    serialize_into(&mut writer, map).map_err(|source| ArchiveDumpWriteError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    let file = writer
        .into_inner()
        .map_err(|err| io_error(err.into_error()))?;
    file.sync_all().map_err(io_error)
}

/// Load an archive dump written by [`write_archive_dump`].
pub fn read_archive_dump(path: &Path) -> Result<ArticleMap, ArchiveDumpError> {
    let io_error = |source| ArchiveDumpError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(io_error)?;
    let mut reader = BufReader::new(file);

    let mut magic = [0_u8; 4];
    reader.read_exact(&mut magic).map_err(io_error)?;
    if magic != ARCHIVE_DUMP_MAGIC {
        return Err(ArchiveDumpError::InvalidMagic {
            expected: ARCHIVE_DUMP_MAGIC,
            found: magic,
        });
    }

    let mut version_bytes = [0_u8; 2];
    reader.read_exact(&mut version_bytes).map_err(io_error)?;
    let version = u16::from_le_bytes(version_bytes);
    if version != ARCHIVE_DUMP_VERSION {
        return Err(ArchiveDumpError::UnsupportedVersion {
            found: version,
            supported: ARCHIVE_DUMP_VERSION,
        });
    }

    deserialize_from(&mut reader).map_err(|source| ArchiveDumpError::Decode {
        path: path.to_path_buf(),
        source,
    })
}
