//! SQLite schema backing the link graph.

use rusqlite::{Connection, Error as SqliteError, OptionalExtension, Transaction};
use thiserror::Error;

/// Version recorded in `graph_schema_version` by [`initialise_graph_schema`].
pub const GRAPH_SCHEMA_VERSION: i64 = 1;

/// Create the link graph tables inside `connection`, or validate existing ones.
///
/// Enables foreign keys, creates the `articles` and `links` tables plus the
/// reverse-link index, and records the schema version. Databases carrying a
/// different version are rejected.
///
/// # Examples
/// ```
/// use rusqlite::Connection;
/// use wikilinks_core::graph::schema::{GRAPH_SCHEMA_VERSION, initialise_graph_schema};
///
/// let mut conn = Connection::open_in_memory().expect("create in-memory database");
/// initialise_graph_schema(&mut conn).expect("create graph schema");
/// initialise_graph_schema(&mut conn).expect("schema creation is idempotent");
///
/// let version: i64 = conn
///     .query_row("SELECT version FROM graph_schema_version", [], |row| row.get(0))
///     .expect("read schema version");
/// assert_eq!(version, GRAPH_SCHEMA_VERSION);
/// ```
pub fn initialise_graph_schema(connection: &mut Connection) -> Result<(), GraphSchemaError> {
    connection
        .pragma_update(None, "foreign_keys", true)
        .map_err(|source| GraphSchemaError::ForeignKeys { source })?;

    let transaction = connection
        .transaction()
        .map_err(|source| GraphSchemaError::Migration {
            step: "begin schema transaction",
            source,
        })?;

    create_tables(&transaction)?;
    ensure_schema_version(&transaction)?;

    transaction
        .commit()
        .map_err(|source| GraphSchemaError::Migration {
            step: "commit schema transaction",
            source,
        })
}

/// Read the recorded schema version, if the version table exists.
pub fn read_graph_schema_version(connection: &Connection) -> Result<Option<i64>, SqliteError> {
    let has_table: bool = connection.query_row(
        "SELECT EXISTS (
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'graph_schema_version'
        )",
        [],
        |row| row.get(0),
    )?;
    if !has_table {
        return Ok(None);
    }
    connection
        .query_row("SELECT version FROM graph_schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .optional()
}

fn create_tables(transaction: &Transaction<'_>) -> Result<(), GraphSchemaError> {
    run_migration_step(
        transaction,
        "create articles",
        "CREATE TABLE IF NOT EXISTS articles (
            id BLOB PRIMARY KEY CHECK (length(id) = 16),
            name TEXT NOT NULL UNIQUE
        )",
    )?;
    run_migration_step(
        transaction,
        "create links",
        "CREATE TABLE IF NOT EXISTS links (
            source BLOB NOT NULL,
            target BLOB NOT NULL,
            PRIMARY KEY (source, target),
            FOREIGN KEY (source) REFERENCES articles(id) ON DELETE CASCADE,
            FOREIGN KEY (target) REFERENCES articles(id) ON DELETE CASCADE
        ) WITHOUT ROWID",
    )?;
    run_migration_step(
        transaction,
        "index links by target",
        "CREATE INDEX IF NOT EXISTS idx_links_target ON links(target, source)",
    )
}

fn ensure_schema_version(transaction: &Transaction<'_>) -> Result<(), GraphSchemaError> {
    run_migration_step(
        transaction,
        "create schema version table",
        "CREATE TABLE IF NOT EXISTS graph_schema_version (
            version INTEGER PRIMARY KEY CHECK (version > 0),
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
        ) WITHOUT ROWID",
    )?;

    let existing_version: Option<i64> = transaction
        .query_row(
            "SELECT version FROM graph_schema_version LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(|source| GraphSchemaError::Migration {
            step: "read schema version",
            source,
        })?;

    match existing_version {
        Some(version) if version == GRAPH_SCHEMA_VERSION => Ok(()),
        Some(found) => Err(GraphSchemaError::VersionMismatch {
            expected: GRAPH_SCHEMA_VERSION,
            found,
        }),
        None => transaction
            .execute(
                "INSERT INTO graph_schema_version (version) VALUES (?1)",
                [GRAPH_SCHEMA_VERSION],
            )
            .map(|_| ())
            .map_err(|source| GraphSchemaError::Migration {
                step: "record schema version",
                source,
            }),
    }
}

fn run_migration_step(
    transaction: &Transaction<'_>,
    step: &'static str,
    sql: &str,
) -> Result<(), GraphSchemaError> {
    transaction
        .execute(sql, [])
        .map(|_| ())
        .map_err(|source| GraphSchemaError::Migration { step, source })
}

/// Errors raised when initialising the link graph schema.
#[derive(Debug, Error)]
pub enum GraphSchemaError {
    /// Foreign key enforcement could not be enabled.
    #[error("failed to enable SQLite foreign keys")]
    ForeignKeys {
        /// Underlying SQLite error.
        #[source]
        source: SqliteError,
    },
    /// A migration statement failed.
    #[error("failed to execute migration step '{step}'")]
    Migration {
        /// Name of the failing step.
        step: &'static str,
        /// Underlying SQLite error.
        #[source]
        source: SqliteError,
    },
    /// The database was created by an incompatible schema version.
    #[error(
        "expected link graph schema version {expected} but found {found}; rebuild the database"
    )]
    VersionMismatch {
        /// Version this build writes.
        expected: i64,
        /// Version recorded in the database.
        found: i64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn connection() -> Connection {
        Connection::open_in_memory().expect("open in-memory database")
    }

    #[rstest]
    fn records_current_version(mut connection: Connection) {
        assert_eq!(read_graph_schema_version(&connection).expect("probe"), None);
        initialise_graph_schema(&mut connection).expect("initialise schema");
        assert_eq!(
            read_graph_schema_version(&connection).expect("probe"),
            Some(GRAPH_SCHEMA_VERSION)
        );
    }

    #[rstest]
    fn rejects_other_versions(mut connection: Connection) {
        initialise_graph_schema(&mut connection).expect("initialise schema");
        connection
            .execute("UPDATE graph_schema_version SET version = 9", [])
            .expect("tamper with version");
        let err = initialise_graph_schema(&mut connection).expect_err("mismatch expected");
        assert!(matches!(
            err,
            GraphSchemaError::VersionMismatch { expected: GRAPH_SCHEMA_VERSION, found: 9 }
        ));
    }

    #[rstest]
    fn links_require_known_articles(mut connection: Connection) {
        initialise_graph_schema(&mut connection).expect("initialise schema");
        let outcome = connection.execute(
            "INSERT INTO links (source, target) VALUES (?1, ?2)",
            (vec![1_u8; 16], vec![2_u8; 16]),
        );
        assert!(outcome.is_err(), "foreign keys should reject dangling links");
    }

    #[rstest]
    fn ids_must_be_sixteen_bytes(mut connection: Connection) {
        initialise_graph_schema(&mut connection).expect("initialise schema");
        let outcome = connection.execute(
            "INSERT INTO articles (id, name) VALUES (?1, ?2)",
            (vec![1_u8; 4], "Short"),
        );
        assert!(outcome.is_err(), "check constraint should reject short ids");
    }
}
