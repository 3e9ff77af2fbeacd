use std::{
    collections::HashMap,
    fs::{self, File},
    io::{self, BufRead, BufWriter, Write},
    path::{Path, PathBuf},
};

use simd_json::serde::from_reader;
use url::Url;

use super::source::DumpSource;
use super::{
    BaseUrl, DownloadOptions, DownloadReport, DumpDescriptor, DumpFileName, DumpRequest, DumpUrl,
    WikipediaDumpError,
};

/// Jobs that publish the single-file articles archive, in order of preference.
const ARTICLE_JOBS: [&str; 2] = ["articlesdumprecombine", "articlesdump"];
const ARTICLES_DUMP_SUFFIX: &str = "-pages-articles.xml.bz2";

/// Resolve and download the articles dump named by `request`.
///
/// # Examples
/// ```
/// # use tempfile::tempdir;
/// # use wikilinks_data::wikipedia::dump::{
/// #     download_dump, block_on_for_tests, DownloadOptions, DumpRequest, StubSource,
/// # };
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let source = StubSource::with_manifest(Vec::new(), b"BZh".to_vec());
/// let temp = tempdir()?;
/// let output = temp.path().join("enwiki-latest-pages-articles.xml.bz2");
/// let report = block_on_for_tests(download_dump(
///     &source,
///     &DumpRequest::default(),
///     DownloadOptions::new(&output),
/// ))?;
/// assert_eq!(report.bytes_written, 3);
/// assert_eq!(
///     report.descriptor.url.as_ref(),
///     "https://example.org/enwiki/latest/enwiki-latest-pages-articles.xml.bz2",
/// );
/// # Ok(())
/// # }
/// # example().expect("example should run");
/// ```
pub async fn download_dump<S: DumpSource + ?Sized>(
    source: &S,
    request: &DumpRequest,
    options: DownloadOptions<'_>,
) -> Result<DownloadReport, WikipediaDumpError> {
    let descriptor = resolve_descriptor(source, request).await?;
    download_descriptor(source, descriptor, options).await
}

/// Work out which archive satisfies `request`.
///
/// The rolling `latest` alias maps directly onto a well-known file name. Dated
/// runs are looked up in the run's `dumpstatus.json` manifest, which also
/// supplies the expected size and checksum.
pub async fn resolve_descriptor<S: DumpSource + ?Sized>(
    source: &S,
    request: &DumpRequest,
) -> Result<DumpDescriptor, WikipediaDumpError> {
    if request.is_latest() {
        return latest_descriptor(source.base_url(), request);
    }
    let mut manifest = source
        .fetch_status(request)
        .await
        .map_err(|source| WikipediaDumpError::StatusFetch { source })?;
    select_dump(manifest.as_mut(), source.base_url())
}

/// Download the archive described by `descriptor`.
///
/// Without `overwrite` an existing file at the output path is left untouched
/// and [`WikipediaDumpError::OutputExists`] is returned. Bytes are staged in a
/// sibling `.part` file that only replaces the output once the download is
/// complete, so a failed transfer never leaves a truncated archive behind.
pub async fn download_descriptor<S: DumpSource + ?Sized>(
    source: &S,
    descriptor: DumpDescriptor,
    options: DownloadOptions<'_>,
) -> Result<DownloadReport, WikipediaDumpError> {
    let output_path = options.output_path;
    if let Some(parent) = output_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| WikipediaDumpError::CreateDir {
            source,
            path: parent.to_path_buf(),
        })?;
    }
    let exists = output_path
        .try_exists()
        .map_err(|source| WikipediaDumpError::WriteDump {
            source,
            path: output_path.to_path_buf(),
        })?;
    if exists && !options.overwrite {
        return Err(WikipediaDumpError::OutputExists {
            path: output_path.to_path_buf(),
        });
    }

    let partial = partial_path(output_path);
    log::info!("downloading {} to {}", descriptor.url, output_path.display());
    let bytes_written = match stage_archive(source, &descriptor, &partial).await {
        Ok(bytes) => bytes,
        Err(err) => {
            if let Err(cleanup) = fs::remove_file(&partial)
                && cleanup.kind() != io::ErrorKind::NotFound
            {
                log::warn!("failed to remove {}: {cleanup}", partial.display());
            }
            return Err(err);
        }
    };
    fs::rename(&partial, output_path).map_err(|source| WikipediaDumpError::WriteDump {
        source,
        path: output_path.to_path_buf(),
    })?;

    let report = DownloadReport {
        descriptor,
        bytes_written,
        output_path: output_path.to_path_buf(),
    };
    if let Some(log) = options.log {
        log.record(&report)?;
    }
    Ok(report)
}

/// Staging location for an in-flight download of `output`.
pub(crate) fn partial_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

async fn stage_archive<S: DumpSource + ?Sized>(
    source: &S,
    descriptor: &DumpDescriptor,
    partial: &Path,
) -> Result<u64, WikipediaDumpError> {
    let write_error = |source: io::Error| WikipediaDumpError::WriteDump {
        source,
        path: partial.to_path_buf(),
    };
    let file = File::create(partial).map_err(write_error)?;
    let mut writer = BufWriter::new(file);
    let bytes_written = source
        .download_archive(&descriptor.url, &mut writer)
        .await
        .map_err(|source| WikipediaDumpError::Download { source })?;
    writer.flush().map_err(write_error)?;
    if let Some(expected) = descriptor.size
        && expected != bytes_written
    {
        return Err(WikipediaDumpError::SizeMismatch {
            expected,
            actual: bytes_written,
        });
    }
    Ok(bytes_written)
}

pub(crate) fn latest_descriptor(
    base_url: &BaseUrl,
    request: &DumpRequest,
) -> Result<DumpDescriptor, WikipediaDumpError> {
    let wiki = request.wiki();
    let file_name = format!("{wiki}-latest{ARTICLES_DUMP_SUFFIX}");
    let relative = format!("/{wiki}/latest/{file_name}");
    let url = normalise_url(base_url, &relative).map_err(|source| {
        WikipediaDumpError::InvalidUrl {
            url: relative.clone(),
            source,
        }
    })?;
    Ok(DumpDescriptor {
        file_name: DumpFileName::new(file_name),
        url,
        size: None,
        sha1: None,
    })
}

pub(crate) fn select_dump(
    manifest_reader: &mut dyn BufRead,
    base_url: &BaseUrl,
) -> Result<DumpDescriptor, WikipediaDumpError> {
    let status: DumpStatus = from_reader(manifest_reader)
        .map_err(|source| WikipediaDumpError::ParseManifest { source })?;
    ARTICLE_JOBS
        .iter()
        .filter_map(|name| status.jobs.get(*name))
        .filter(|job| job.is_done())
        .flat_map(|job| job.files.iter())
        .find_map(|(file_name, entry)| {
            if file_name.ends_with(ARTICLES_DUMP_SUFFIX) {
                DumpDescriptor::from_manifest_entry(file_name, entry, base_url)
            } else {
                None
            }
        })
        .ok_or(WikipediaDumpError::MissingDump)
}

pub(crate) fn normalise_url(
    base_url: &BaseUrl,
    relative: &str,
) -> Result<DumpUrl, url::ParseError> {
    let absolute = if relative.starts_with("http://") || relative.starts_with("https://") {
        relative.to_owned()
    } else if relative.starts_with('/') {
        format!("{base_url}{relative}")
    } else {
        format!("{base_url}/{relative}")
    };
    Url::parse(&absolute).map(Into::into)
}

#[derive(Debug, serde::Deserialize)]
struct DumpStatus {
    #[serde(default)]
    jobs: HashMap<String, DumpJob>,
}

#[derive(Debug, serde::Deserialize)]
struct DumpJob {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    files: HashMap<String, DumpFile>,
}

impl DumpJob {
    fn is_done(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|value| value.eq_ignore_ascii_case("done"))
    }
}

#[derive(Debug, serde::Deserialize)]
struct DumpFile {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    sha1: Option<String>,
}

impl DumpDescriptor {
    fn from_manifest_entry(file_name: &str, entry: &DumpFile, base_url: &BaseUrl) -> Option<Self> {
        let relative = entry.url.as_deref()?;
        let url = normalise_url(base_url, relative).ok()?;
        Some(Self {
            file_name: DumpFileName::from(file_name),
            url,
            size: entry.size,
            sha1: entry.sha1.clone(),
        })
    }
}
