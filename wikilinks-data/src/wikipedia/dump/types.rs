//! Typed wrappers for dump endpoints, requests and download results.

use std::path::{Path, PathBuf};

use url::Url;

use super::log::DownloadLog;

/// Wiki database name used when none is configured.
pub const DEFAULT_WIKI: &str = "enwiki";

/// Dump date that selects the rolling `latest` alias.
pub const LATEST_DUMP_DATE: &str = "latest";

macro_rules! string_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Construct a new [`", stringify!($name), "`].")]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Consume the wrapper and return the inner [`String`].
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_newtype!(
    /// Base URL of a Wikimedia dump mirror.
    ///
    /// # Examples
    /// ```
    /// # use wikilinks_data::wikipedia::dump::BaseUrl;
    /// let url = BaseUrl::new("https://dumps.wikimedia.org");
    /// assert_eq!(url.as_ref(), "https://dumps.wikimedia.org");
    /// ```
    BaseUrl
);

string_newtype!(
    /// File name of a dump artefact, for example `enwiki-20240901-pages-articles.xml.bz2`.
    DumpFileName
);

string_newtype!(
    /// Fully qualified URL pointing to a dump artefact.
    ///
    /// # Examples
    /// ```
    /// # use wikilinks_data::wikipedia::dump::DumpUrl;
    /// let url = DumpUrl::try_from("https://example.test/enwiki/latest/x.xml.bz2")?;
    /// assert!(url.starts_with("https://"));
    /// # Ok::<(), url::ParseError>(())
    /// ```
    DumpUrl
);

impl From<&str> for BaseUrl {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<&str> for DumpFileName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<Url> for DumpUrl {
    fn from(value: Url) -> Self {
        Self(value.into())
    }
}

impl TryFrom<&str> for DumpUrl {
    type Error = url::ParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Url::parse(value).map(Into::into)
    }
}

/// Which dump run of which wiki to fetch.
///
/// # Examples
/// ```
/// # use wikilinks_data::wikipedia::dump::DumpRequest;
/// let request = DumpRequest::default();
/// assert_eq!(request.wiki(), "enwiki");
/// assert!(request.is_latest());
///
/// let dated = DumpRequest::new("simplewiki", "20240901");
/// assert!(!dated.is_latest());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpRequest {
    wiki: String,
    date: String,
}

impl DumpRequest {
    /// Request the dump of `wiki` produced on `date` (`YYYYMMDD` or `latest`).
    pub fn new(wiki: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            wiki: wiki.into(),
            date: date.into(),
        }
    }

    /// Request the rolling `latest` dump of `wiki`.
    pub fn latest(wiki: impl Into<String>) -> Self {
        Self::new(wiki, LATEST_DUMP_DATE)
    }

    /// Wiki database name, such as `enwiki`.
    #[must_use]
    pub fn wiki(&self) -> &str {
        &self.wiki
    }

    /// Dump run date.
    #[must_use]
    pub fn date(&self) -> &str {
        &self.date
    }

    /// Whether the request targets the rolling `latest` alias.
    #[must_use]
    pub fn is_latest(&self) -> bool {
        self.date.eq_ignore_ascii_case(LATEST_DUMP_DATE)
    }

    /// Path of the run's status manifest relative to the mirror root.
    #[must_use]
    pub fn status_path(&self) -> String {
        format!("/{}/{}/dumpstatus.json", self.wiki, self.date)
    }
}

impl Default for DumpRequest {
    fn default() -> Self {
        Self::latest(DEFAULT_WIKI)
    }
}

/// Describes the dump artefact that should be downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpDescriptor {
    /// File name of the archive.
    pub file_name: DumpFileName,
    /// Absolute download URL.
    pub url: DumpUrl,
    /// Archive size in bytes, when the manifest reports it.
    pub size: Option<u64>,
    /// SHA-1 checksum, when the manifest reports it.
    pub sha1: Option<String>,
}

/// Summary of a completed download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    /// Descriptor of the downloaded artefact.
    pub descriptor: DumpDescriptor,
    /// Number of bytes written to disk.
    pub bytes_written: u64,
    /// Final location of the archive.
    pub output_path: PathBuf,
}

/// Options controlling how a dump is materialised on disk.
///
/// # Examples
/// ```
/// # use tempfile::tempdir;
/// # use wikilinks_data::wikipedia::dump::{DownloadLog, DownloadOptions};
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let temp = tempdir()?;
/// let output = temp.path().join("enwiki-latest-pages-articles.xml.bz2");
/// let log = DownloadLog::initialise(&temp.path().join("downloads.sqlite"))?;
/// let options = DownloadOptions::new(output.as_path())
///     .with_log(&log)
///     .with_overwrite(true);
/// assert!(options.log.is_some());
/// assert!(options.overwrite);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DownloadOptions<'a> {
    /// Destination path for the archive.
    pub output_path: &'a Path,
    /// Optional audit log.
    pub log: Option<&'a DownloadLog>,
    /// Whether an existing file may be replaced.
    pub overwrite: bool,
}

impl<'a> DownloadOptions<'a> {
    /// Target `output_path` without logging and without overwriting.
    #[must_use]
    pub const fn new(output_path: &'a Path) -> Self {
        Self {
            output_path,
            log: None,
            overwrite: false,
        }
    }

    /// Record the download in `log`.
    #[must_use]
    pub const fn with_log(mut self, log: &'a DownloadLog) -> Self {
        self.log = Some(log);
        self
    }

    /// Allow replacing an existing file at the output path.
    #[must_use]
    pub const fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}
