//! Parsing of link graph database locations.

use std::{fmt, str::FromStr};

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

const SQLITE_SCHEME: &str = "sqlite://";

/// Location of the SQLite link graph.
///
/// Accepts `sqlite://<path>` or a bare filesystem path.
///
/// # Examples
/// ```
/// use wikilinks_data::store_url::DatabaseUrl;
///
/// let url = DatabaseUrl::parse("sqlite://data/wikipedia.db")?;
/// assert_eq!(url.path().as_str(), "data/wikipedia.db");
/// assert_eq!(url.to_string(), "sqlite://data/wikipedia.db");
///
/// let bare = DatabaseUrl::parse("/var/lib/wikilinks.db")?;
/// assert_eq!(bare.path().as_str(), "/var/lib/wikilinks.db");
///
/// assert!(DatabaseUrl::parse("rocksdb://data/wikipedia.rdb").is_err());
/// # Ok::<(), wikilinks_data::store_url::DatabaseUrlError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseUrl {
    path: Utf8PathBuf,
}

/// Reasons a database URL is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatabaseUrlError {
    /// The URL names a storage engine other than SQLite.
    #[error("unsupported database scheme '{scheme}'; use sqlite://<path>")]
    UnsupportedScheme {
        /// The rejected scheme.
        scheme: String,
    },
    /// The URL carries no path.
    #[error("database URL does not name a path")]
    Empty,
}

impl DatabaseUrl {
    /// Parse `raw` into a database location.
    pub fn parse(raw: &str) -> Result<Self, DatabaseUrlError> {
        let trimmed = raw.trim();
        let path = if let Some(rest) = trimmed.strip_prefix(SQLITE_SCHEME) {
            rest
        } else if let Some((scheme, _)) = trimmed.split_once("://") {
            return Err(DatabaseUrlError::UnsupportedScheme {
                scheme: scheme.to_owned(),
            });
        } else {
            trimmed
        };
        if path.is_empty() {
            return Err(DatabaseUrlError::Empty);
        }
        Ok(Self {
            path: Utf8PathBuf::from(path),
        })
    }

    /// Filesystem path of the database.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl FromStr for DatabaseUrl {
    type Err = DatabaseUrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SQLITE_SCHEME}{}", self.path)
    }
}
