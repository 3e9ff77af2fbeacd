//! Facade crate for the wikilinks pipeline.
//!
//! This crate re-exports the core domain types: article identity, the crawled
//! [`ArticleMap`], the archive dump format and the [`LinkGraph`] query trait.
//! The SQLite store sits behind the `store-sqlite` feature.

#![forbid(unsafe_code)]

pub use wikilinks_core::{
    ARTICLE_ID_LEN, Article, ArticleId, ArticleMap, GraphSummary, LinkDirection, LinkGraph,
    LinkGraphError, REDIRECT_MARKER, RankedArticle, TITLE_PREFIX_BLACKLIST, is_blacklisted_title,
    is_redirect_text, normalise_link_target,
};

#[cfg(feature = "serde")]
pub use wikilinks_core::{
    ARCHIVE_DUMP_MAGIC, ARCHIVE_DUMP_VERSION, ArchiveDumpError, ArchiveDumpWriteError,
    read_archive_dump, write_archive_dump,
};

#[cfg(feature = "store-sqlite")]
pub use wikilinks_core::{SqliteLinkGraph, SqliteLinkGraphError};

#[cfg(feature = "test-support")]
pub use wikilinks_core::test_support;
