//! Error types produced by the dump helpers.

use std::{error::Error as StdError, io, path::PathBuf};

use thiserror::Error;

/// Errors produced while resolving or downloading a Wikipedia dump.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WikipediaDumpError {
    /// The dump status manifest could not be fetched.
    #[error("failed to fetch dump status: {source}")]
    StatusFetch {
        /// Transport failure.
        source: super::TransportError,
    },
    /// The dump archive could not be downloaded.
    #[error("failed to download dump archive: {source}")]
    Download {
        /// Transport failure.
        source: super::TransportError,
    },
    /// Parsing the manifest failed.
    #[error("failed to parse dump status manifest: {source}")]
    ParseManifest {
        /// JSON decoding failure.
        source: simd_json::Error,
    },
    /// A URL derived from the mirror or the manifest was malformed.
    #[error("invalid dump URL {url:?}: {source}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Parser failure.
        source: url::ParseError,
    },
    /// The manifest did not list a finished articles dump.
    #[error("manifest did not contain a completed pages-articles dump")]
    MissingDump,
    /// Preparing the output directory failed.
    #[error("failed to create output directory {path:?}: {source}")]
    CreateDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The output file exists and overwriting was not requested.
    #[error("output file {path:?} already exists (pass --overwrite)")]
    OutputExists {
        /// Existing file.
        path: PathBuf,
    },
    /// Writing the dump to disk failed.
    #[error("failed to write dump to {path:?}: {source}")]
    WriteDump {
        /// Destination file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The downloaded archive size did not match the manifest.
    #[error("downloaded size {actual} did not match manifest size {expected}")]
    SizeMismatch {
        /// Size reported by the manifest.
        expected: u64,
        /// Bytes actually written.
        actual: u64,
    },
    /// Opening or creating the download log failed.
    #[error("failed to initialise download log at {path:?}: {source}")]
    InitialiseLog {
        /// Log database location.
        path: PathBuf,
        /// Underlying SQLite error.
        source: rusqlite::Error,
    },
    /// Writing a log entry failed.
    #[error("failed to record download metadata: {source}")]
    RecordLogSql {
        /// Underlying SQLite error.
        source: rusqlite::Error,
    },
    /// A value could not be converted for storage in the log.
    #[error("failed to prepare download metadata for persistence ({what}): {source}")]
    RecordLogValue {
        /// Description of the value that failed to convert.
        what: &'static str,
        /// Underlying conversion error.
        source: Box<dyn StdError + Send + Sync>,
    },
}

/// Transport-level errors encountered while issuing HTTP requests.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportError {
    /// The server returned an HTTP error status.
    #[error("request to {url} failed with status {status}: {message}")]
    Http {
        /// Fully qualified request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Short error description.
        message: String,
    },
    /// The request or the response body failed.
    #[error("network error contacting {url}: {source}")]
    Network {
        /// Fully qualified request URL.
        url: String,
        /// I/O error reported by the transport.
        source: io::Error,
    },
    /// The local sink rejected downloaded bytes.
    #[error("failed to store bytes downloaded from {url}: {source}")]
    Sink {
        /// Fully qualified request URL.
        url: String,
        /// I/O error reported by the sink.
        source: io::Error,
    },
}
