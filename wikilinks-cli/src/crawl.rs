//! The `crawl` and `export-links` subcommands.
//!
//! Both start from the same pair of inputs: the XML export and the archive
//! dump that caches its parsed article map.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use wikilinks_data::DatabaseUrl;
use wikilinks_data::wikipedia::{
    crawl::{LoadedArticleMap, MapOrigin, load_article_map},
    export::export_links_text,
    insert::{InsertOptions, insert_article_map},
};
use wikilinks_fs::path_exists;

use crate::progress::{CrawlSpinner, InsertBars};
use crate::{ARG_DATABASE_URL, CliError, DEFAULT_DATABASE_URL, flag_enabled, require_file};

pub(crate) const ARG_ARCHIVE: &str = "archive";
pub(crate) const ARG_DUMP: &str = "dump";
pub(crate) const ARG_OUTPUT: &str = "output";
const ARG_BULK_LOAD_OPTIMIZED: &str = "bulk-load-optimized";
const ARG_SKIP_INSERT: &str = "skip-insert";
pub(crate) const ENV_CRAWL_ARCHIVE: &str = "WIKILINKS_CMDS_CRAWL_ARCHIVE";
pub(crate) const ENV_CRAWL_DUMP: &str = "WIKILINKS_CMDS_CRAWL_DUMP";
pub(crate) const ENV_EXPORT_ARCHIVE: &str = "WIKILINKS_CMDS_EXPORT_LINKS_ARCHIVE";
pub(crate) const ENV_EXPORT_DUMP: &str = "WIKILINKS_CMDS_EXPORT_LINKS_DUMP";

/// Default location of the links listing.
pub(crate) const DEFAULT_LINKS_OUTPUT: &str = "data/links.txt";

/// CLI arguments for the `crawl` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "crawl",
    about = "Crawl a dump into an article map and load it into the link graph",
    long_about = "Parse a MediaWiki XML export (plain or bzip2) into an article \
                  map, caching it in an archive dump, then bulk-load the map \
                  into the SQLite link graph. An existing archive dump is \
                  reused instead of re-parsing the export."
)]
#[ortho_config(prefix = "WIKILINKS")]
pub(crate) struct CrawlArgs {
    /// Path to the `pages-articles` XML export.
    #[arg(value_name = "archive")]
    #[serde(default)]
    pub(crate) archive: Option<Utf8PathBuf>,
    /// Path of the archive dump cache.
    #[arg(value_name = "dump")]
    #[serde(default)]
    pub(crate) dump: Option<Utf8PathBuf>,
    /// Link graph location (`sqlite://<path>`).
    #[arg(long = ARG_DATABASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) database_url: Option<String>,
    /// Use WAL journaling and relaxed durability while loading.
    #[arg(
        long = ARG_BULK_LOAD_OPTIMIZED,
        num_args = 0..=1,
        default_missing_value = "true",
        value_name = "bool"
    )]
    #[serde(default)]
    pub(crate) bulk_load_optimized: Option<bool>,
    /// Stop after the article map is built.
    #[arg(
        long = ARG_SKIP_INSERT,
        num_args = 0..=1,
        default_missing_value = "true",
        value_name = "bool"
    )]
    #[serde(default)]
    pub(crate) skip_insert: Option<bool>,
}

impl CrawlArgs {
    fn into_config(self) -> Result<CrawlConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        CrawlConfig::try_from(merged)
    }
}

/// CLI arguments for the `export-links` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "export-links",
    about = "Write the article map as a plain-text link listing"
)]
#[ortho_config(prefix = "WIKILINKS")]
pub(crate) struct ExportLinksArgs {
    /// Path to the `pages-articles` XML export.
    #[arg(value_name = "archive")]
    #[serde(default)]
    pub(crate) archive: Option<Utf8PathBuf>,
    /// Path of the archive dump cache.
    #[arg(value_name = "dump")]
    #[serde(default)]
    pub(crate) dump: Option<Utf8PathBuf>,
    /// Destination of the listing.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
}

impl ExportLinksArgs {
    fn into_config(self) -> Result<ExportLinksConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ExportLinksConfig::try_from(merged)
    }
}

/// The export and its cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MapSources {
    pub(crate) archive: Utf8PathBuf,
    pub(crate) dump: Utf8PathBuf,
}

impl MapSources {
    fn resolve(
        archive: Option<Utf8PathBuf>,
        dump: Option<Utf8PathBuf>,
        envs: (&'static str, &'static str),
    ) -> Result<Self, CliError> {
        let archive = archive.ok_or(CliError::MissingArgument {
            field: ARG_ARCHIVE,
            env: envs.0,
        })?;
        let dump = dump.ok_or(CliError::MissingArgument {
            field: ARG_DUMP,
            env: envs.1,
        })?;
        Ok(Self { archive, dump })
    }

    /// Check the inputs that will actually be read.
    ///
    /// A present dump is read instead of the export, so the export only has
    /// to exist when the dump does not.
    pub(crate) fn validate(&self) -> Result<(), CliError> {
        let cached = path_exists(&self.dump).map_err(|source| CliError::InspectSourcePath {
            field: ARG_DUMP,
            path: self.dump.clone(),
            source,
        })?;
        if cached {
            require_file(&self.dump, ARG_DUMP)
        } else {
            require_file(&self.archive, ARG_ARCHIVE)
        }
    }

    pub(crate) fn load(&self) -> Result<LoadedArticleMap, CliError> {
        self.validate()?;
        let spinner = CrawlSpinner::new();
        let loaded = load_article_map(&self.archive, &self.dump, &spinner)?;
        let origin = match loaded.origin {
            MapOrigin::Cache => "archive dump",
            MapOrigin::Archive => "export",
        };
        tracing::info!(
            articles = loaded.map.article_len(),
            links = loaded.map.link_len(),
            "loaded article map from {origin}"
        );
        Ok(loaded)
    }
}

/// Resolved `crawl` settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CrawlConfig {
    pub(crate) sources: MapSources,
    pub(crate) database: DatabaseUrl,
    pub(crate) options: InsertOptions,
    pub(crate) skip_insert: bool,
}

impl TryFrom<CrawlArgs> for CrawlConfig {
    type Error = CliError;

    fn try_from(args: CrawlArgs) -> Result<Self, Self::Error> {
        let sources = MapSources::resolve(
            args.archive,
            args.dump,
            (ENV_CRAWL_ARCHIVE, ENV_CRAWL_DUMP),
        )?;
        let database = DatabaseUrl::parse(
            args.database_url
                .as_deref()
                .unwrap_or(DEFAULT_DATABASE_URL),
        )?;
        Ok(Self {
            sources,
            database,
            options: InsertOptions {
                bulk_load_optimized: flag_enabled(args.bulk_load_optimized),
            },
            skip_insert: flag_enabled(args.skip_insert),
        })
    }
}

/// Resolved `export-links` settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ExportLinksConfig {
    pub(crate) sources: MapSources,
    pub(crate) output: Utf8PathBuf,
}

impl TryFrom<ExportLinksArgs> for ExportLinksConfig {
    type Error = CliError;

    fn try_from(args: ExportLinksArgs) -> Result<Self, Self::Error> {
        let sources = MapSources::resolve(
            args.archive,
            args.dump,
            (ENV_EXPORT_ARCHIVE, ENV_EXPORT_DUMP),
        )?;
        let output = args
            .output
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_LINKS_OUTPUT));
        Ok(Self { sources, output })
    }
}

pub(crate) fn run_crawl(args: CrawlArgs) -> Result<(), CliError> {
    let config = args.into_config()?;
    crawl(&config)
}

pub(crate) fn crawl(config: &CrawlConfig) -> Result<(), CliError> {
    let loaded = config.sources.load()?;
    if config.skip_insert {
        tracing::info!("skipping link graph insert");
        return Ok(());
    }
    insert_into(config.database.path(), &loaded, config.options)
}

fn insert_into(
    database: &Utf8Path,
    loaded: &LoadedArticleMap,
    options: InsertOptions,
) -> Result<(), CliError> {
    let bars = InsertBars::new();
    let report = insert_article_map(database, &loaded.map, options, &bars)?;
    tracing::info!(
        articles = report.articles,
        links = report.links,
        batches = report.batches,
        "link graph written to {database}"
    );
    Ok(())
}

pub(crate) fn run_export_links(args: ExportLinksArgs) -> Result<(), CliError> {
    let config = args.into_config()?;
    export_links(&config)
}

pub(crate) fn export_links(config: &ExportLinksConfig) -> Result<(), CliError> {
    let loaded = config.sources.load()?;
    let report = export_links_text(&loaded.map, &config.output)?;
    tracing::info!(
        articles = report.articles,
        links = report.links,
        "links written to {}",
        config.output
    );
    Ok(())
}
