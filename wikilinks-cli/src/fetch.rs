//! The `fetch` subcommand.

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use wikilinks_data::wikipedia::dump::{
    DEFAULT_BASE_URL, DEFAULT_USER_AGENT, DEFAULT_WIKI, DownloadLog, DownloadOptions,
    DownloadReport, DumpRequest, DumpSource, HttpDumpSource, LATEST_DUMP_DATE,
    download_descriptor, resolve_descriptor,
};
use wikilinks_fs::ensure_parent_dir;

use crate::{CliError, flag_enabled};

const ARG_OUTPUT_DIR: &str = "output-dir";
const ARG_WIKI: &str = "wiki";
const ARG_DATE: &str = "date";
const ARG_ENDPOINT: &str = "endpoint";
const ARG_USER_AGENT: &str = "user-agent";
const ARG_METADATA: &str = "metadata";
const ARG_OVERWRITE: &str = "overwrite";

/// Default download directory.
pub(crate) const DEFAULT_OUTPUT_DIR: &str = "data";

/// CLI arguments for the `fetch` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "fetch",
    about = "Download a pages-articles dump",
    long_about = "Resolve the pages-articles archive of a dump run and stream \
                  it to the output directory. The rolling `latest` run is \
                  fetched by its well-known name; dated runs are looked up in \
                  the run's dumpstatus.json manifest."
)]
#[ortho_config(prefix = "WIKILINKS")]
pub(crate) struct FetchArgs {
    /// Directory that receives the archive.
    #[arg(long = ARG_OUTPUT_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) output_dir: Option<Utf8PathBuf>,
    /// Wiki database name, such as `enwiki`.
    #[arg(long = ARG_WIKI, value_name = "name")]
    #[serde(default)]
    pub(crate) wiki: Option<String>,
    /// Dump run date (`YYYYMMDD`) or `latest`.
    #[arg(long = ARG_DATE, value_name = "date")]
    #[serde(default)]
    pub(crate) date: Option<String>,
    /// Base URL of the dump mirror.
    #[arg(long = ARG_ENDPOINT, value_name = "url")]
    #[serde(default)]
    pub(crate) endpoint: Option<String>,
    /// User agent sent to the mirror.
    #[arg(long = ARG_USER_AGENT, value_name = "agent")]
    #[serde(default)]
    pub(crate) user_agent: Option<String>,
    /// SQLite file recording completed downloads.
    #[arg(long = ARG_METADATA, value_name = "path")]
    #[serde(default)]
    pub(crate) metadata: Option<Utf8PathBuf>,
    /// Replace an existing archive.
    #[arg(
        long = ARG_OVERWRITE,
        num_args = 0..=1,
        default_missing_value = "true",
        value_name = "bool"
    )]
    #[serde(default)]
    pub(crate) overwrite: Option<bool>,
}

impl FetchArgs {
    fn into_config(self) -> Result<FetchConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        Ok(FetchConfig::from(merged))
    }
}

/// Resolved `fetch` settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FetchConfig {
    pub(crate) output_dir: Utf8PathBuf,
    pub(crate) request: DumpRequest,
    pub(crate) endpoint: String,
    pub(crate) user_agent: String,
    pub(crate) metadata: Option<Utf8PathBuf>,
    pub(crate) overwrite: bool,
}

impl From<FetchArgs> for FetchConfig {
    fn from(args: FetchArgs) -> Self {
        let wiki = args.wiki.unwrap_or_else(|| DEFAULT_WIKI.to_owned());
        let date = args.date.unwrap_or_else(|| LATEST_DUMP_DATE.to_owned());
        Self {
            output_dir: args
                .output_dir
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_OUTPUT_DIR)),
            request: DumpRequest::new(wiki, date),
            endpoint: args
                .endpoint
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            user_agent: args
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned()),
            metadata: args.metadata,
            overwrite: flag_enabled(args.overwrite),
        }
    }
}

pub(crate) fn run_fetch(args: FetchArgs) -> Result<(), CliError> {
    let config = args.into_config()?;
    let source = HttpDumpSource::new(config.endpoint.as_str()).with_user_agent(&config.user_agent);
    // `DumpSource` futures are not `Send`, so drive them on this thread.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|source| CliError::Runtime { source })?;
    let report = runtime.block_on(fetch(&source, &config))?;
    tracing::info!(
        bytes = report.bytes_written,
        "downloaded {} to {}",
        report.descriptor.file_name,
        report.output_path.display()
    );
    Ok(())
}

/// Resolve the requested archive and download it into the output directory.
pub(crate) async fn fetch<S: DumpSource + ?Sized>(
    source: &S,
    config: &FetchConfig,
) -> Result<DownloadReport, CliError> {
    let log = match config.metadata.as_deref() {
        Some(path) => {
            ensure_parent_dir(path).map_err(|source| CliError::PrepareOutput {
                path: path.to_path_buf(),
                source,
            })?;
            Some(DownloadLog::initialise(path.as_std_path())?)
        }
        None => None,
    };
    let descriptor = resolve_descriptor(source, &config.request).await?;
    let output = config.output_dir.join(&*descriptor.file_name);
    let mut options = DownloadOptions::new(output.as_std_path()).with_overwrite(config.overwrite);
    if let Some(log) = log.as_ref() {
        options = options.with_log(log);
    }
    Ok(download_descriptor(source, descriptor, options).await?)
}
