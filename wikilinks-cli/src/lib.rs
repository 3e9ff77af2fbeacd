//! Command-line interface for the wikilinks pipeline.
//!
//! The `wikilinks` binary fetches a Wikipedia dump, crawls it into an article
//! map, loads that map into the SQLite link graph and serves the explorer over
//! the result. Every subcommand layers its options from CLI flags,
//! `WIKILINKS_*` environment variables and configuration files.
#![forbid(unsafe_code)]

use std::io;

use camino::Utf8Path;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod crawl;
mod error;
mod explore;
mod fetch;
mod progress;

pub use error::CliError;

use crawl::{CrawlArgs, ExportLinksArgs};
use explore::{ExploreArgs, StatsArgs};
use fetch::FetchArgs;

/// Default location of the SQLite link graph.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/wikipedia.db";

const ARG_DATABASE_URL: &str = "database-url";
const DEFAULT_LOG_FILTER: &str = "info";

/// Run the wikilinks CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // Help and version output are not failures.
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => return Err(CliError::ArgumentParsing(err)),
    };
    init_logging()?;
    execute(cli.command)
}

fn execute(command: Command) -> Result<(), CliError> {
    match command {
        Command::Fetch(args) => fetch::run_fetch(args),
        Command::Crawl(args) => crawl::run_crawl(args),
        Command::ExportLinks(args) => crawl::run_export_links(args),
        Command::Explore(args) => explore::run_explore(args),
        Command::Stats(args) => explore::run_stats(args),
    }
}

fn init_logging() -> Result<(), CliError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|source| CliError::Logging { source })
}

#[derive(Debug, Parser)]
#[command(
    name = "wikilinks",
    about = "Build and explore the link graph of a Wikipedia dump",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Download a `pages-articles` dump from a Wikimedia mirror.
    Fetch(FetchArgs),
    /// Crawl a dump into an article map and load it into the link graph.
    Crawl(CrawlArgs),
    /// Write the article map as an indented plain-text link listing.
    ExportLinks(ExportLinksArgs),
    /// Serve the link graph explorer over HTTP.
    Explore(ExploreArgs),
    /// Print link graph totals and the most linked articles.
    Stats(StatsArgs),
}

/// Check that `path` names an existing regular file.
fn require_file(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match wikilinks_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Err(CliError::MissingSourceFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Resolve a layered switch. Unset means off.
const fn flag_enabled(value: Option<bool>) -> bool {
    matches!(value, Some(true))
}

#[cfg(test)]
mod tests;
