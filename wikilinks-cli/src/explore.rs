//! The `explore` and `stats` subcommands, both read-only over the link graph.

use std::{
    io::{self, Write},
    net::SocketAddr,
    sync::Arc,
};

use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use wikilinks_core::{LinkGraph, SqliteLinkGraph};
use wikilinks_data::DatabaseUrl;

use crate::{ARG_DATABASE_URL, CliError, DEFAULT_DATABASE_URL, require_file};

const ARG_LISTEN: &str = "listen";
const ARG_TOP: &str = "top";

/// Default explorer bind address.
pub(crate) const DEFAULT_LISTEN: &str = "127.0.0.1:8080";
/// Default number of ranked articles printed by `stats`.
pub(crate) const DEFAULT_TOP: usize = 10;

/// CLI arguments for the `explore` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(name = "explore", about = "Serve the link graph explorer over HTTP")]
#[ortho_config(prefix = "WIKILINKS")]
pub(crate) struct ExploreArgs {
    /// Link graph location (`sqlite://<path>`).
    #[arg(long = ARG_DATABASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) database_url: Option<String>,
    /// Socket address to listen on.
    #[arg(long = ARG_LISTEN, value_name = "addr")]
    #[serde(default)]
    pub(crate) listen: Option<String>,
}

impl ExploreArgs {
    fn into_config(self) -> Result<ExploreConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ExploreConfig::try_from(merged)
    }
}

/// CLI arguments for the `stats` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(name = "stats", about = "Print link graph totals and rankings")]
#[ortho_config(prefix = "WIKILINKS")]
pub(crate) struct StatsArgs {
    /// Link graph location (`sqlite://<path>`).
    #[arg(long = ARG_DATABASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) database_url: Option<String>,
    /// How many of the most linked articles to list.
    #[arg(long = ARG_TOP, value_name = "n")]
    #[serde(default)]
    pub(crate) top: Option<usize>,
}

impl StatsArgs {
    fn into_config(self) -> Result<StatsConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        StatsConfig::try_from(merged)
    }
}

/// Resolved `explore` settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ExploreConfig {
    pub(crate) database: DatabaseUrl,
    pub(crate) listen: SocketAddr,
}

impl TryFrom<ExploreArgs> for ExploreConfig {
    type Error = CliError;

    fn try_from(args: ExploreArgs) -> Result<Self, Self::Error> {
        let database = parse_database_url(args.database_url.as_deref())?;
        let raw = args.listen.as_deref().unwrap_or(DEFAULT_LISTEN);
        let listen = raw.parse().map_err(|source| CliError::ListenAddress {
            value: raw.to_owned(),
            source,
        })?;
        Ok(Self { database, listen })
    }
}

/// Resolved `stats` settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StatsConfig {
    pub(crate) database: DatabaseUrl,
    pub(crate) top: usize,
}

impl TryFrom<StatsArgs> for StatsConfig {
    type Error = CliError;

    fn try_from(args: StatsArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            database: parse_database_url(args.database_url.as_deref())?,
            top: args.top.unwrap_or(DEFAULT_TOP),
        })
    }
}

fn parse_database_url(raw: Option<&str>) -> Result<DatabaseUrl, CliError> {
    Ok(DatabaseUrl::parse(raw.unwrap_or(DEFAULT_DATABASE_URL))?)
}

pub(crate) fn open_graph(database: &DatabaseUrl) -> Result<SqliteLinkGraph, CliError> {
    let path = database.path();
    require_file(path, ARG_DATABASE_URL)?;
    SqliteLinkGraph::open(path).map_err(|source| CliError::OpenGraph {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn run_explore(args: ExploreArgs) -> Result<(), CliError> {
    let config = args.into_config()?;
    let graph = open_graph(&config.database)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|source| CliError::Runtime { source })?;
    runtime.block_on(wikilinks_explorer::serve(config.listen, Arc::new(graph)))?;
    Ok(())
}

pub(crate) fn run_stats(args: StatsArgs) -> Result<(), CliError> {
    let config = args.into_config()?;
    let graph = open_graph(&config.database)?;
    let stdout = io::stdout();
    write_stats(&graph, config.top, &mut stdout.lock())
}

/// Print totals followed by the `top` most linked articles.
pub(crate) fn write_stats(
    graph: &dyn LinkGraph,
    top: usize,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let summary = graph.summary()?;
    let ranked = graph.most_linked(top)?;
    let write = |out: &mut dyn Write| -> io::Result<()> {
        writeln!(out, "articles: {}", summary.articles)?;
        writeln!(out, "links: {}", summary.links)?;
        if !ranked.is_empty() {
            writeln!(out, "most linked:")?;
        }
        for (rank, entry) in ranked.iter().enumerate() {
            writeln!(
                out,
                "{:>4}. {} ({} inbound)",
                rank + 1,
                entry.article.name,
                entry.inbound
            )?;
        }
        out.flush()
    };
    write(out).map_err(|source| CliError::WriteOutput { source })
}
