//! Bulk loading of an [`ArticleMap`] into the SQLite link graph.

mod writer;

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use rusqlite::Connection;
use thiserror::Error;
use wikilinks_core::{
    ArticleMap,
    graph::schema::{GraphSchemaError, initialise_graph_schema},
};
use wikilinks_fs::ensure_parent_dir;

pub use writer::{BulkInserter, GraphItem};

/// Items per write batch.
pub const REQUEST_BUFFER_SIZE: usize = 10_000;

/// Batches allowed to queue for the writer thread.
pub const CHANNEL_CAPACITY: usize = 10;

/// Tuning switches for [`insert_article_map`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertOptions {
    /// Trade durability for load speed: WAL journaling, `synchronous = OFF`
    /// and no foreign key checks while loading.
    pub bulk_load_optimized: bool,
}

/// Rows written by a bulk load. Rows already present are not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertReport {
    /// Article rows inserted.
    pub articles: u64,
    /// Link rows inserted.
    pub links: u64,
    /// Transactions committed.
    pub batches: u64,
}

/// The two passes of a bulk load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPhase {
    /// Article rows.
    Articles,
    /// Link rows.
    Links,
}

impl InsertPhase {
    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Articles => "indexing articles",
            Self::Links => "indexing links",
        }
    }
}

/// Receives progress notifications during [`insert_article_map`].
pub trait InsertProgress {
    /// A phase is starting with `total` items to queue.
    fn phase_started(&self, phase: InsertPhase, total: u64);
    /// `items` more items were handed to the writer.
    fn items_queued(&self, phase: InsertPhase, items: u64);
    /// A phase has queued all of its items.
    fn phase_finished(&self, phase: InsertPhase) {
        let _ = phase;
    }
}

impl InsertProgress for () {
    fn phase_started(&self, _phase: InsertPhase, _total: u64) {}

    fn items_queued(&self, _phase: InsertPhase, _items: u64) {}
}

/// Errors raised during a bulk load.
#[derive(Debug, Error)]
pub enum InsertError {
    /// The database directory could not be prepared.
    #[error("failed to prepare directory for {path}: {source}")]
    Directory {
        /// Database location.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The database could not be opened.
    #[error("failed to open link graph database {path}: {source}")]
    Open {
        /// Database location.
        path: Utf8PathBuf,
        /// Underlying SQLite error.
        #[source]
        source: rusqlite::Error,
    },
    /// The link graph schema could not be created.
    #[error(transparent)]
    Schema(#[from] GraphSchemaError),
    /// A SQLite statement failed.
    #[error("SQLite error during {operation}: {source}")]
    Sqlite {
        /// Operation that failed.
        operation: &'static str,
        /// Underlying SQLite error.
        #[source]
        source: rusqlite::Error,
    },
    /// The writer thread could not be started.
    #[error("failed to start the insert writer thread: {source}")]
    SpawnWriter {
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The writer thread stopped accepting batches.
    #[error("the insert writer stopped before all batches were queued")]
    WriterStopped,
    /// The writer thread panicked.
    #[error("the insert writer thread panicked")]
    WriterPanicked,
}

impl InsertError {
    pub(crate) const fn sqlite(operation: &'static str, source: rusqlite::Error) -> Self {
        Self::Sqlite { operation, source }
    }
}

/// Load `map` into the link graph database at `path`.
///
/// The schema is created when missing. All articles are queued before any
/// link. Re-running against a populated database only adds missing rows.
///
/// # Examples
/// ```
/// use camino::Utf8PathBuf;
/// use wikilinks_core::ArticleMap;
/// use wikilinks_data::wikipedia::insert::{InsertOptions, insert_article_map};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let temp = tempfile::tempdir()?;
/// let path = Utf8PathBuf::try_from(temp.path().join("wikipedia.db"))?;
/// let mut map = ArticleMap::default();
/// let rust = map.insert_article("Rust");
/// let llvm = map.insert_article("LLVM");
/// map.insert_link(rust, llvm);
///
/// let report = insert_article_map(&path, &map, InsertOptions::default(), &())?;
/// assert_eq!((report.articles, report.links), (2, 1));
/// # Ok(())
/// # }
/// ```
pub fn insert_article_map(
    path: &Utf8Path,
    map: &ArticleMap,
    options: InsertOptions,
    progress: &dyn InsertProgress,
) -> Result<InsertReport, InsertError> {
    let connection = open_database(path, options)?;
    let mut inserter = BulkInserter::spawn(connection)?;

    if let Err(err) = queue_map(&mut inserter, map, progress) {
        // A stopped writer holds the real failure.
        return Err(match inserter.finish() {
            Err(writer_err) => writer_err,
            Ok(_) => err,
        });
    }

    let report = inserter.finish()?;
    log::info!(
        "inserted {} articles and {} links in {} batches",
        report.articles,
        report.links,
        report.batches
    );
    Ok(report)
}

fn queue_map(
    inserter: &mut BulkInserter,
    map: &ArticleMap,
    progress: &dyn InsertProgress,
) -> Result<(), InsertError> {
    progress.phase_started(InsertPhase::Articles, map.article_len());
    queue_items(
        inserter,
        InsertPhase::Articles,
        progress,
        map.articles().map(|(name, id)| GraphItem::Article {
            id,
            name: name.to_owned(),
        }),
    )?;
    progress.phase_finished(InsertPhase::Articles);

    progress.phase_started(InsertPhase::Links, map.link_len());
    queue_items(
        inserter,
        InsertPhase::Links,
        progress,
        map.links()
            .map(|(source, target)| GraphItem::Link { source, target }),
    )?;
    progress.phase_finished(InsertPhase::Links);
    Ok(())
}

fn open_database(path: &Utf8Path, options: InsertOptions) -> Result<Connection, InsertError> {
    ensure_parent_dir(path).map_err(|source| InsertError::Directory {
        path: path.to_path_buf(),
        source,
    })?;
    let mut connection = Connection::open(path).map_err(|source| InsertError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    initialise_graph_schema(&mut connection)?;
    if options.bulk_load_optimized {
        connection
            .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))
            .map_err(|source| InsertError::sqlite("enable WAL journaling", source))?;
        connection
            .pragma_update(None, "synchronous", "OFF")
            .map_err(|source| InsertError::sqlite("disable synchronous writes", source))?;
        connection
            .pragma_update(None, "foreign_keys", false)
            .map_err(|source| InsertError::sqlite("disable foreign keys", source))?;
    }
    Ok(connection)
}

fn queue_items(
    inserter: &mut BulkInserter,
    phase: InsertPhase,
    progress: &dyn InsertProgress,
    items: impl Iterator<Item = GraphItem>,
) -> Result<(), InsertError> {
    let mut pending = 0_u64;
    for item in items {
        inserter.push(item)?;
        pending += 1;
        if inserter.buffered() == 0 {
            progress.items_queued(phase, pending);
            pending = 0;
        }
    }
    inserter.flush()?;
    if pending > 0 {
        progress.items_queued(phase, pending);
    }
    Ok(())
}
