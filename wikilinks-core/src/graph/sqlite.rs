//! SQLite-backed [`LinkGraph`] implementation.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use rusqlite::{Connection, OpenFlags, OptionalExtension, Row};
use thiserror::Error;

use crate::{Article, ArticleId};

use super::schema::{GRAPH_SCHEMA_VERSION, read_graph_schema_version};
use super::{GraphSummary, LinkDirection, LinkGraph, LinkGraphError, RankedArticle};

/// Error raised when opening a persisted link graph.
#[derive(Debug, Error)]
pub enum SqliteLinkGraphError {
    /// Opening the SQLite database failed.
    #[error("failed to open link graph database at {path}: {source}")]
    OpenDatabase {
        /// Location of the database on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// The database has never been initialised with the link graph schema.
    #[error("{path} does not contain a link graph; run the crawl command first")]
    MissingSchema {
        /// Location of the database on disk.
        path: PathBuf,
    },
    /// The database was written by an incompatible schema version.
    #[error("link graph schema version {found} is not supported (expected {expected})")]
    VersionMismatch {
        /// Version this build reads.
        expected: i64,
        /// Version recorded in the database.
        found: i64,
    },
    /// Generic SQLite error while validating the database.
    #[error(transparent)]
    Database(#[from] rusqlite::Error),
}

/// Read-only link graph stored in SQLite.
///
/// The connection is guarded by a mutex so one graph can be shared between
/// threads; queries are serialised.
pub struct SqliteLinkGraph {
    connection: Mutex<Connection>,
}

impl fmt::Debug for SqliteLinkGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteLinkGraph").finish_non_exhaustive()
    }
}

impl SqliteLinkGraph {
    /// Open the link graph stored at `path` in read-only mode.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SqliteLinkGraphError> {
        let path = path.as_ref();
        let connection = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|source| SqliteLinkGraphError::OpenDatabase {
                path: path.to_path_buf(),
                source,
            })?;
        match read_graph_schema_version(&connection)? {
            None => Err(SqliteLinkGraphError::MissingSchema {
                path: path.to_path_buf(),
            }),
            Some(_) => Self::from_connection(connection),
        }
    }

    /// Wrap an existing connection whose schema is already initialised.
    pub fn from_connection(connection: Connection) -> Result<Self, SqliteLinkGraphError> {
        if let Some(found) = read_graph_schema_version(&connection)?
            && found != GRAPH_SCHEMA_VERSION
        {
            return Err(SqliteLinkGraphError::VersionMismatch {
                expected: GRAPH_SCHEMA_VERSION,
                found,
            });
        }
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, LinkGraphError> {
        self.connection.lock().map_err(|_| LinkGraphError::Poisoned)
    }
}

fn backend(operation: &'static str) -> impl FnOnce(rusqlite::Error) -> LinkGraphError {
    move |source| LinkGraphError::Backend {
        operation,
        source: Box::new(source),
    }
}

fn count_to_u64(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}

fn limit_to_i64(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// Decode an `(id, name)` row, rejecting ids that are not 16 bytes wide.
fn article_from_row(row: &Row<'_>) -> rusqlite::Result<Result<Article, LinkGraphError>> {
    let id: Vec<u8> = row.get(0)?;
    let name: String = row.get(1)?;
    Ok(ArticleId::from_slice(&id)
        .map(|id| Article { id, name })
        .ok_or(LinkGraphError::CorruptId { len: id.len() }))
}

impl LinkGraph for SqliteLinkGraph {
    fn article(&self, id: ArticleId) -> Result<Option<Article>, LinkGraphError> {
        let connection = self.lock()?;
        let name: Option<String> = connection
            .query_row(
                "SELECT name FROM articles WHERE id = ?1",
                [id.as_bytes().as_slice()],
                |row| row.get(0),
            )
            .optional()
            .map_err(backend("look up article"))?;
        Ok(name.map(|name| Article { id, name }))
    }

    fn link_count(&self, id: ArticleId, direction: LinkDirection) -> Result<u64, LinkGraphError> {
        let sql = match direction {
            LinkDirection::Outbound => "SELECT COUNT(*) FROM links WHERE source = ?1",
            LinkDirection::Inbound => "SELECT COUNT(*) FROM links WHERE target = ?1",
        };
        let connection = self.lock()?;
        let count: i64 = connection
            .query_row(sql, [id.as_bytes().as_slice()], |row| row.get(0))
            .map_err(backend("count links"))?;
        Ok(count_to_u64(count))
    }

    fn links(
        &self,
        id: ArticleId,
        direction: LinkDirection,
        limit: usize,
    ) -> Result<Vec<Article>, LinkGraphError> {
        let sql = match direction {
            LinkDirection::Outbound => {
                "SELECT a.id, a.name FROM links l JOIN articles a ON a.id = l.target
                 WHERE l.source = ?1 ORDER BY a.name LIMIT ?2"
            }
            LinkDirection::Inbound => {
                "SELECT a.id, a.name FROM links l JOIN articles a ON a.id = l.source
                 WHERE l.target = ?1 ORDER BY a.name LIMIT ?2"
            }
        };
        let connection = self.lock()?;
        let mut statement = connection
            .prepare_cached(sql)
            .map_err(backend("prepare link query"))?;
        let rows = statement
            .query_map(
                (id.as_bytes().as_slice(), limit_to_i64(limit)),
                article_from_row,
            )
            .map_err(backend("list links"))?;
        let mut articles = Vec::new();
        for row in rows {
            articles.push(row.map_err(backend("read link row"))??);
        }
        Ok(articles)
    }

    fn summary(&self) -> Result<GraphSummary, LinkGraphError> {
        let connection = self.lock()?;
        let (articles, links): (i64, i64) = connection
            .query_row(
                "SELECT (SELECT COUNT(*) FROM articles), (SELECT COUNT(*) FROM links)",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map_err(backend("summarise graph"))?;
        Ok(GraphSummary {
            articles: count_to_u64(articles),
            links: count_to_u64(links),
        })
    }

    fn most_linked(&self, limit: usize) -> Result<Vec<RankedArticle>, LinkGraphError> {
        let connection = self.lock()?;
        let mut statement = connection
            .prepare_cached(
                "SELECT a.id, a.name, ranked.inbound
                 FROM (SELECT target, COUNT(*) AS inbound FROM links GROUP BY target) AS ranked
                 JOIN articles a ON a.id = ranked.target
                 ORDER BY ranked.inbound DESC, a.name ASC
                 LIMIT ?1",
            )
            .map_err(backend("prepare ranking query"))?;
        let rows = statement
            .query_map([limit_to_i64(limit)], |row| {
                let inbound: i64 = row.get(2)?;
                Ok(article_from_row(row)?.map(|article| RankedArticle {
                    article,
                    inbound: count_to_u64(inbound),
                }))
            })
            .map_err(backend("rank articles"))?;
        let mut ranked = Vec::new();
        for row in rows {
            ranked.push(row.map_err(backend("read ranking row"))??);
        }
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::schema::initialise_graph_schema;
    use crate::test_support::write_link_graph;
    use crate::ArticleMap;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn star() -> ArticleMap {
        let mut map = ArticleMap::default();
        let hub = map.insert_article("Hub");
        for name in ["Delta", "Alpha", "Charlie", "Bravo"] {
            let spoke = map.insert_article(name);
            map.insert_link(spoke, hub);
            map.insert_link(hub, spoke);
        }
        let alpha = map.insert_article("Alpha");
        let bravo = map.insert_article("Bravo");
        map.insert_link(bravo, alpha);
        map
    }

    #[fixture]
    fn graph(star: ArticleMap) -> (TempDir, SqliteLinkGraph) {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("wikipedia.db");
        write_link_graph(&path, &star).expect("persist graph");
        let graph = SqliteLinkGraph::open(&path).expect("open graph");
        (dir, graph)
    }

    #[rstest]
    fn summarises_articles_and_links(graph: (TempDir, SqliteLinkGraph)) {
        let (_dir, graph) = graph;
        let summary = graph.summary().expect("summary");
        assert_eq!(summary, GraphSummary { articles: 5, links: 9 });
    }

    #[rstest]
    fn looks_up_articles_by_name(graph: (TempDir, SqliteLinkGraph)) {
        let (_dir, graph) = graph;
        let hub = graph.article_by_name("Hub").expect("query").expect("hub exists");
        assert_eq!(hub.id, ArticleId::from_name("Hub"));
        assert!(graph.article_by_name("Nowhere").expect("query").is_none());
    }

    #[rstest]
    #[case(LinkDirection::Outbound, 4)]
    #[case(LinkDirection::Inbound, 4)]
    fn counts_links_per_direction(
        graph: (TempDir, SqliteLinkGraph),
        #[case] direction: LinkDirection,
        #[case] expected: u64,
    ) {
        let (_dir, graph) = graph;
        let hub = ArticleId::from_name("Hub");
        assert_eq!(graph.link_count(hub, direction).expect("count"), expected);
    }

    #[rstest]
    fn lists_neighbours_sorted_and_limited(graph: (TempDir, SqliteLinkGraph)) {
        let (_dir, graph) = graph;
        let hub = ArticleId::from_name("Hub");
        let names: Vec<_> = graph
            .links(hub, LinkDirection::Outbound, 3)
            .expect("links")
            .into_iter()
            .map(|article| article.name)
            .collect();
        assert_eq!(names, ["Alpha", "Bravo", "Charlie"]);
    }

    #[rstest]
    fn ranks_by_inbound_links(graph: (TempDir, SqliteLinkGraph)) {
        let (_dir, graph) = graph;
        let ranked = graph.most_linked(2).expect("ranking");
        let summary: Vec<_> = ranked
            .iter()
            .map(|entry| (entry.article.name.as_str(), entry.inbound))
            .collect();
        assert_eq!(summary, [("Hub", 4), ("Alpha", 2)]);
    }

    #[rstest]
    fn open_rejects_databases_without_schema() {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("empty.db");
        Connection::open(&path)
            .and_then(|conn| conn.execute("CREATE TABLE unrelated (x INTEGER)", []))
            .expect("create unrelated database");
        let err = SqliteLinkGraph::open(&path).expect_err("schema missing");
        assert!(matches!(err, SqliteLinkGraphError::MissingSchema { .. }));
    }

    #[rstest]
    fn open_reports_missing_files() {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("absent.db");
        let err = SqliteLinkGraph::open(&path).expect_err("database missing");
        assert!(matches!(err, SqliteLinkGraphError::OpenDatabase { .. }));
    }

    #[rstest]
    fn from_connection_rejects_version_mismatch() {
        let mut connection = Connection::open_in_memory().expect("open database");
        initialise_graph_schema(&mut connection).expect("initialise schema");
        connection
            .execute("UPDATE graph_schema_version SET version = 2", [])
            .expect("bump version");
        let err = SqliteLinkGraph::from_connection(connection).expect_err("mismatch");
        assert!(matches!(
            err,
            SqliteLinkGraphError::VersionMismatch { expected: 1, found: 2 }
        ));
    }
}
