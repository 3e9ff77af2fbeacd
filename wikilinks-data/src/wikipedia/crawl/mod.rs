//! Extracting the article link map from a MediaWiki XML export.
//!
//! [`crawl_archive`] streams a (possibly bzip2-compressed) export and builds an
//! [`ArticleMap`]. [`load_article_map`] adds the archive dump cache in front of
//! it so repeated runs skip the expensive parse.

mod archive;
mod links;
mod pages;

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use wikilinks_core::{
    ArchiveDumpError, ArchiveDumpWriteError, ArticleMap, read_archive_dump, write_archive_dump,
};
use wikilinks_fs::{ensure_parent_dir, path_exists};

pub use archive::open_archive;
pub use links::extract_links;
pub use pages::{PROGRESS_INTERVAL, read_archive};

/// Receives progress notifications while an archive is parsed.
pub trait CrawlProgress {
    /// Called whenever roughly [`PROGRESS_INTERVAL`] more articles are known.
    fn articles_read(&self, articles: u64);

    /// Called once parsing completes.
    fn finished(&self, articles: u64) {
        let _ = articles;
    }
}

impl CrawlProgress for () {
    fn articles_read(&self, _articles: u64) {}
}

/// Errors raised while crawling an export.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The archive could not be opened.
    #[error("failed to open archive {path}: {source}")]
    OpenArchive {
        /// Archive location.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The XML stream was malformed or could not be read.
    #[error("malformed XML near byte {position}: {source}")]
    Xml {
        /// Byte offset in the decompressed stream.
        position: u64,
        /// Parser error.
        #[source]
        source: quick_xml::Error,
    },
    /// Checking or preparing a cache location failed.
    #[error("failed to access {path}: {source}")]
    Io {
        /// Location being accessed.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The archive dump cache exists but could not be read.
    #[error(transparent)]
    ReadDump(#[from] ArchiveDumpError),
    /// The archive dump cache could not be written.
    #[error(transparent)]
    WriteDump(#[from] ArchiveDumpWriteError),
}

/// Where a loaded [`ArticleMap`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapOrigin {
    /// Read from an existing archive dump.
    Cache,
    /// Parsed from the XML export; the dump was written afterwards.
    Archive,
}

/// An article map together with its origin.
#[derive(Debug)]
pub struct LoadedArticleMap {
    /// The link map.
    pub map: ArticleMap,
    /// How it was obtained.
    pub origin: MapOrigin,
}

/// Open and parse the export at `path`.
pub fn crawl_archive(
    path: &Utf8Path,
    progress: &dyn CrawlProgress,
) -> Result<ArticleMap, CrawlError> {
    log::info!("reading archive {path}");
    let reader = open_archive(path)?;
    read_archive(reader, progress)
}

/// Load the article map from `dump_path`, or crawl `archive_path` and cache
/// the result there.
///
/// An existing dump always wins, even when the archive is newer. Delete the
/// dump to force a fresh crawl.
pub fn load_article_map(
    archive_path: &Utf8Path,
    dump_path: &Utf8Path,
    progress: &dyn CrawlProgress,
) -> Result<LoadedArticleMap, CrawlError> {
    let cached = path_exists(dump_path).map_err(|source| CrawlError::Io {
        path: dump_path.to_path_buf(),
        source,
    })?;
    if cached {
        log::info!("reading archive dump {dump_path}");
        let map = read_archive_dump(dump_path.as_std_path())?;
        log::info!(
            "reading archive dump: done ({} articles, {} links)",
            map.article_len(),
            map.link_len()
        );
        return Ok(LoadedArticleMap {
            map,
            origin: MapOrigin::Cache,
        });
    }

    let map = crawl_archive(archive_path, progress)?;
    ensure_parent_dir(dump_path).map_err(|source| CrawlError::Io {
        path: dump_path.to_path_buf(),
        source,
    })?;
    write_archive_dump(dump_path.as_std_path(), &map)?;
    log::info!("wrote archive dump {dump_path}");
    Ok(LoadedArticleMap {
        map,
        origin: MapOrigin::Archive,
    })
}
