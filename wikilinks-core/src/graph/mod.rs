//! Read-only access to the persisted link graph.
//!
//! The `LinkGraph` trait is what the explorer and the statistics command query.
//! The SQLite implementation lives behind the `store-sqlite` feature together
//! with the schema it reads; the bulk inserter in `wikilinks-data` writes that
//! same schema.

use std::error::Error as StdError;

use thiserror::Error;

use crate::{Article, ArticleId};

#[cfg(feature = "store-sqlite")]
pub mod schema;
#[cfg(feature = "store-sqlite")]
mod sqlite;

#[cfg(feature = "store-sqlite")]
pub use sqlite::{SqliteLinkGraph, SqliteLinkGraphError};

/// Which side of an article's links to traverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkDirection {
    /// Links from the article to other articles.
    Outbound,
    /// Links from other articles to the article.
    Inbound,
}

/// Article and link totals for a graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphSummary {
    /// Number of stored articles.
    pub articles: u64,
    /// Number of stored links.
    pub links: u64,
}

/// An article together with the number of articles linking to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedArticle {
    /// The ranked article.
    pub article: Article,
    /// In-degree of the article.
    pub inbound: u64,
}

/// Errors surfaced by [`LinkGraph`] implementations.
#[derive(Debug, Error)]
pub enum LinkGraphError {
    /// The storage backend failed while performing `operation`.
    #[error("link graph backend failed to {operation}: {source}")]
    Backend {
        /// Short description of the failed operation.
        operation: &'static str,
        /// Backend-specific error.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
    /// A stored article id did not have the expected width.
    #[error("stored article id has {len} bytes; expected 16")]
    CorruptId {
        /// Width of the offending id.
        len: usize,
    },
    /// A previous panic poisoned the backend's connection lock.
    #[error("link graph connection lock was poisoned")]
    Poisoned,
}

/// Read-only queries over a directed article link graph.
///
/// # Examples
///
/// ```
/// use wikilinks_core::{ArticleMap, LinkDirection, LinkGraph};
/// use wikilinks_core::test_support::MemoryLinkGraph;
///
/// let mut map = ArticleMap::default();
/// let rust = map.insert_article("Rust");
/// let cargo = map.insert_article("Cargo");
/// map.insert_link(rust, cargo);
/// let graph = MemoryLinkGraph::from_map(&map);
///
/// let article = graph.article_by_name("Rust")?.expect("article exists");
/// assert_eq!(graph.link_count(article.id, LinkDirection::Outbound)?, 1);
/// # Ok::<(), wikilinks_core::LinkGraphError>(())
/// ```
pub trait LinkGraph {
    /// Fetch an article by id.
    fn article(&self, id: ArticleId) -> Result<Option<Article>, LinkGraphError>;

    /// Fetch an article by name.
    fn article_by_name(&self, name: &str) -> Result<Option<Article>, LinkGraphError> {
        self.article(ArticleId::from_name(name))
    }

    /// Count the links on one side of an article.
    fn link_count(&self, id: ArticleId, direction: LinkDirection) -> Result<u64, LinkGraphError>;

    /// List up to `limit` neighbours on one side of an article, sorted by name.
    fn links(
        &self,
        id: ArticleId,
        direction: LinkDirection,
        limit: usize,
    ) -> Result<Vec<Article>, LinkGraphError>;

    /// Article and link totals.
    fn summary(&self) -> Result<GraphSummary, LinkGraphError>;

    /// The `limit` articles with the most inbound links, highest first.
    ///
    /// Ties are broken by article name.
    fn most_linked(&self, limit: usize) -> Result<Vec<RankedArticle>, LinkGraphError>;
}
