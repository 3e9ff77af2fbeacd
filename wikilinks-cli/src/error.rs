//! Error types emitted by the wikilinks CLI.
//!
//! Most subcommand helpers return `Result<_, CliError>`, so library errors are
//! wrapped with `#[from]` rather than flattened into strings.

use std::{io, net::AddrParseError, sync::Arc};

use camino::Utf8PathBuf;
use thiserror::Error;
use wikilinks_core::{LinkGraphError, SqliteLinkGraphError};
use wikilinks_data::DatabaseUrlError;
use wikilinks_data::wikipedia::{
    crawl::CrawlError, dump::WikipediaDumpError, export::ExportError, insert::InsertError,
};
use wikilinks_explorer::ExplorerError;

/// Errors emitted by the wikilinks CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Name of the missing flag.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Flag that named the path.
        field: &'static str,
        /// The missing path.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Flag that named the path.
        field: &'static str,
        /// The offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Flag that named the path.
        field: &'static str,
        /// The path being inspected.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The database URL was rejected.
    #[error("invalid --database-url: {0}")]
    DatabaseUrl(#[from] DatabaseUrlError),
    /// The listen address could not be parsed.
    #[error("invalid --listen address {value:?}: {source}")]
    ListenAddress {
        /// The rejected value.
        value: String,
        /// Parser failure.
        #[source]
        source: AddrParseError,
    },
    /// The logging subscriber could not be installed.
    #[error("failed to initialise logging: {source}")]
    Logging {
        /// Subscriber installation failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The async runtime could not be started.
    #[error("failed to start async runtime: {source}")]
    Runtime {
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Resolving or downloading a dump failed.
    #[error("failed to fetch Wikipedia dump: {0}")]
    Fetch(#[from] WikipediaDumpError),
    /// Crawling the export or reading its cache failed.
    #[error("failed to load article map: {0}")]
    Crawl(#[from] CrawlError),
    /// Loading the graph store failed.
    #[error("failed to insert link graph: {0}")]
    Insert(#[from] InsertError),
    /// Writing the links export failed.
    #[error("failed to export links: {0}")]
    Export(#[from] ExportError),
    /// The graph store could not be opened.
    #[error("failed to open link graph at {path}: {source}")]
    OpenGraph {
        /// Database location.
        path: Utf8PathBuf,
        /// Underlying store error.
        #[source]
        source: SqliteLinkGraphError,
    },
    /// A graph query failed.
    #[error("link graph query failed: {0}")]
    Graph(#[from] LinkGraphError),
    /// The explorer server failed.
    #[error(transparent)]
    Explorer(#[from] ExplorerError),
    /// An output location could not be prepared.
    #[error("failed to prepare {path}: {source}")]
    PrepareOutput {
        /// Location being prepared.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Writing command output failed.
    #[error("failed to write output: {source}")]
    WriteOutput {
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}
