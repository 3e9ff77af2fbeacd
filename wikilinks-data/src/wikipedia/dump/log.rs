use std::{
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use rusqlite::{Connection, params};

use super::{DownloadReport, WikipediaDumpError};

/// Persisted audit trail of dump downloads.
#[derive(Debug)]
pub struct DownloadLog {
    connection: Connection,
    location: PathBuf,
}

impl DownloadLog {
    /// Open (or create) the download log at `path`.
    pub fn initialise(path: &Path) -> Result<Self, WikipediaDumpError> {
        let initialise_error = |source| WikipediaDumpError::InitialiseLog {
            source,
            path: path.to_path_buf(),
        };
        let connection = Connection::open(path).map_err(initialise_error)?;
        connection
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS downloads (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    file_name TEXT NOT NULL,
                    url TEXT NOT NULL,
                    sha1 TEXT,
                    size_bytes INTEGER,
                    bytes_written INTEGER NOT NULL,
                    output_path TEXT NOT NULL,
                    downloaded_at INTEGER NOT NULL
                );",
            )
            .map_err(initialise_error)?;
        Ok(Self {
            connection,
            location: path.to_path_buf(),
        })
    }

    /// Record a completed download.
    pub fn record(&self, report: &DownloadReport) -> Result<(), WikipediaDumpError> {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|err| value_error("download timestamp", err))?;
        let timestamp =
            i64::try_from(elapsed.as_secs()).map_err(|err| value_error("download timestamp", err))?;
        let size = report
            .descriptor
            .size
            .map(|value| i64::try_from(value).map_err(|err| value_error("manifest size", err)))
            .transpose()?;
        let bytes = i64::try_from(report.bytes_written)
            .map_err(|err| value_error("bytes written", err))?;
        self.connection
            .execute(
                "INSERT INTO downloads (
                    file_name,
                    url,
                    sha1,
                    size_bytes,
                    bytes_written,
                    output_path,
                    downloaded_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    report.descriptor.file_name.as_ref(),
                    report.descriptor.url.as_ref(),
                    report.descriptor.sha1.as_deref(),
                    size,
                    bytes,
                    report.output_path.to_string_lossy(),
                    timestamp
                ],
            )
            .map_err(|source| WikipediaDumpError::RecordLogSql { source })?;
        Ok(())
    }

    /// Number of downloads recorded so far.
    pub fn entry_count(&self) -> Result<u64, WikipediaDumpError> {
        let count: i64 = self
            .connection
            .query_row("SELECT COUNT(*) FROM downloads", [], |row| row.get(0))
            .map_err(|source| WikipediaDumpError::RecordLogSql { source })?;
        u64::try_from(count).map_err(|err| value_error("entry count", err))
    }

    /// Location of the underlying SQLite database.
    pub fn path(&self) -> &Path {
        &self.location
    }
}

fn value_error(
    what: &'static str,
    err: impl std::error::Error + Send + Sync + 'static,
) -> WikipediaDumpError {
    WikipediaDumpError::RecordLogValue {
        what,
        source: Box::new(err),
    }
}
