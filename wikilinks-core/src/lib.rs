//! Core domain types for the wikilinks pipeline.
//!
//! Articles are identified by the BLAKE2b digest of their name, crawled
//! dumps are held in an [`ArticleMap`], and the persisted link graph is read
//! through the [`LinkGraph`] trait. The archive dump format and the SQLite
//! schema live here so the crawler, the inserter and the explorer agree on
//! them.
#![forbid(unsafe_code)]

mod article;
#[cfg(feature = "serde")]
mod archive_dump;
pub mod graph;
mod map;
mod titles;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use article::{ARTICLE_ID_LEN, Article, ArticleId};
#[cfg(feature = "serde")]
pub use archive_dump::{
    ARCHIVE_DUMP_MAGIC, ARCHIVE_DUMP_VERSION, ArchiveDumpError, ArchiveDumpWriteError,
    read_archive_dump, write_archive_dump,
};
pub use graph::{GraphSummary, LinkDirection, LinkGraph, LinkGraphError, RankedArticle};
#[cfg(feature = "store-sqlite")]
pub use graph::{SqliteLinkGraph, SqliteLinkGraphError};
pub use map::ArticleMap;
pub use titles::{
    REDIRECT_MARKER, TITLE_PREFIX_BLACKLIST, is_blacklisted_title, is_redirect_text,
    normalise_link_target,
};
