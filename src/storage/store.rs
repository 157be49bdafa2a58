//! Store handle: connection ownership, version probing, bootstrap.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};

use super::migrate;
use super::schema::{self, CURRENT_VERSION, TABLE_INFO, VERSION_PROPERTY};
use crate::outcome::{Outcome, Report, Severity};
use crate::{Error, Result};

/// Handle owning the connection to one store file.
///
/// A handle is always returned from [`Store::open`], even when the
/// underlying file could not be opened; a closed handle short-circuits
/// every operation to a failure instead of touching a connection. The
/// connection is released exactly once, on [`Store::close`] or drop.
pub struct Store {
    path: String,
    conn: Option<Connection>,
    reports: Vec<Report>,
}

impl Store {
    /// Open (creating if absent) the store file at `path`.
    ///
    /// Never fails outright: an open failure yields a closed handle whose
    /// diagnostic severity is Error.
    pub fn open(path: &Path) -> Store {
        let mut store = Store {
            path: path.display().to_string(),
            conn: None,
            reports: Vec::new(),
        };

        match Connection::open(path) {
            Ok(conn) => {
                store.conn = Some(conn);
                let text = format!("Opened store at \"{}\".", store.path);
                store.report(Severity::Info, text);
            }
            Err(e) => {
                let text = format!("Failed to open store at \"{}\": {}", store.path, e);
                store.report(Severity::Error, text);
            }
        }

        store
    }

    /// Open an in-memory store (for testing and tooling)
    pub fn open_in_memory() -> Store {
        let mut store = Store {
            path: ":memory:".to_string(),
            conn: None,
            reports: Vec::new(),
        };

        match Connection::open_in_memory() {
            Ok(conn) => {
                store.conn = Some(conn);
                store.report(Severity::Info, "Opened in-memory store.".to_string());
            }
            Err(e) => {
                let text = format!("Failed to open in-memory store: {e}");
                store.report(Severity::Error, text);
            }
        }

        store
    }

    /// Whether a connection is currently held
    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// Path this handle was opened with
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Most recent diagnostic text, empty if none recorded
    pub fn message(&self) -> &str {
        self.reports.last().map(|r| r.text.as_str()).unwrap_or("")
    }

    /// Severity of the most recent diagnostic
    pub fn severity(&self) -> Severity {
        self.reports
            .last()
            .map(|r| r.severity)
            .unwrap_or(Severity::None)
    }

    /// Full diagnostic log, oldest first
    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    /// Release the connection. Idempotent; a failure to close is reported
    /// as a diagnostic, never propagated.
    pub fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            let text = format!("Closing store \"{}\".", self.path);
            self.report(Severity::Info, text);
            if let Err((_conn, e)) = conn.close() {
                let text = format!("Failed to close store \"{}\": {}", self.path, e);
                self.report(Severity::Warning, text);
            }
        }
    }

    /// Read the schema version recorded in the store.
    ///
    /// None when the handle is closed, the metadata table or version row is
    /// missing, or the stored value is not a non-negative integer. All of
    /// those mean the same thing to the caller: no usable version.
    pub fn probe_version(&self) -> Option<u32> {
        probe_version(self.conn.as_ref()?)
    }

    /// Bring the store schema to [`CURRENT_VERSION`].
    ///
    /// Probes the stored version, then bootstraps an absent store, migrates
    /// a stale one, or does nothing when already current. Safe to call
    /// repeatedly; a second call on a current store performs no writes.
    pub fn initialize(&mut self) -> Outcome<()> {
        let Some(conn) = self.conn.as_mut() else {
            self.report(Severity::Error, "No store opened.".to_string());
            return Outcome::failure(vec![Error::NotOpen]);
        };

        let probed = probe_version(conn);
        let errors = match probed {
            None => {
                tracing::info!("No schema version found; bootstrapping store");
                build_schema(conn)
            }
            Some(v) if v == CURRENT_VERSION => Vec::new(),
            Some(v) if v < CURRENT_VERSION => migrate::migrate(conn, v, CURRENT_VERSION)
                .err()
                .into_iter()
                .collect(),
            Some(v) => vec![Error::VersionFromFuture {
                stored: v,
                target: CURRENT_VERSION,
            }],
        };

        for err in &errors {
            let text = err.to_string();
            self.report(Severity::Error, text);
        }

        if errors.is_empty() {
            let text = match probed {
                None => format!("Created store schema at version {CURRENT_VERSION}."),
                Some(v) if v < CURRENT_VERSION => {
                    format!("Migrated store schema from version {v} to {CURRENT_VERSION}.")
                }
                _ => format!("Store schema is current at version {CURRENT_VERSION}."),
            };
            self.report(Severity::Info, text);
        }

        Outcome::from_errors(errors)
    }

    /// Row counts for the application tables
    pub fn stats(&self) -> Result<StoreStats> {
        let conn = self.conn.as_ref().ok_or(Error::NotOpen)?;
        Ok(StoreStats {
            activity_types: count_rows(conn, schema::TABLE_ACTIVITY_TYPE)?,
            users: count_rows(conn, schema::TABLE_USER)?,
            sessions: count_rows(conn, schema::TABLE_SESSION)?,
        })
    }

    fn report(&mut self, severity: Severity, text: String) {
        match severity {
            Severity::Error => tracing::error!("{}", text),
            Severity::Warning => tracing::warn!("{}", text),
            _ => tracing::info!("{}", text),
        }
        self.reports.push(Report::new(severity, text));
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> Option<&Connection> {
        self.conn.as_ref()
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        self.close();
    }
}

/// Typed optional-scalar read of the stored version.
///
/// A missing table, missing row, and unparsable value all fold into None;
/// an unreadable version is indistinguishable from "not yet created" and
/// the bootstrap path handles both the same way.
fn probe_version(conn: &Connection) -> Option<u32> {
    let value: Option<String> = conn
        .query_row(
            &format!("SELECT value FROM {TABLE_INFO} WHERE property = ?1"),
            [VERSION_PROPERTY],
            |row| row.get(0),
        )
        .optional()
        .ok()
        .flatten()?;

    value?.parse().ok()
}

/// Create all tables in dependency order, then seed the version row and
/// default activity types.
///
/// Best-effort: every statement is attempted even after a failure so the
/// returned error list covers everything that went wrong, not just the
/// first statement.
fn build_schema(conn: &Connection) -> Vec<Error> {
    let mut errors = Vec::new();

    for table in &schema::TABLES {
        if let Err(source) = conn.execute(&table.create_sql(), []) {
            errors.push(Error::TableCreation {
                table: table.name,
                source,
            });
        }
    }

    if let Err(source) = conn.execute(
        &format!("INSERT INTO {TABLE_INFO}(property, value) VALUES (?1, ?2)"),
        params![VERSION_PROPERTY, CURRENT_VERSION.to_string()],
    ) {
        errors.push(Error::SeedInsert {
            what: "version row",
            source,
        });
    }

    for (short_name, full_name, description) in schema::ACTIVITY_SEEDS {
        if let Err(source) = conn.execute(
            &format!(
                "INSERT INTO {}(short_name, full_name, description) VALUES (?1, ?2, ?3)",
                schema::TABLE_ACTIVITY_TYPE
            ),
            params![short_name, full_name, description],
        ) {
            errors.push(Error::SeedInsert {
                what: "default activity types",
                source,
            });
        }
    }

    errors
}

fn count_rows(conn: &Connection, table: &str) -> Result<usize> {
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
        row.get(0)
    })?;
    Ok(count as usize)
}

/// Row counts for the application tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    pub activity_types: usize,
    pub users: usize,
    pub sessions: usize,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Store contents:")?;
        writeln!(f, "  Activity types: {}", self.activity_types)?;
        writeln!(f, "  Users: {}", self.users)?;
        writeln!(f, "  Sessions: {}", self.sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bootstrapped_store() -> Store {
        let mut store = Store::open_in_memory();
        assert!(store.initialize().successful());
        store
    }

    #[test]
    fn test_fresh_bootstrap() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pomotrack.db");

        let mut store = Store::open(&path);
        assert!(store.is_open());

        let outcome = store.initialize();
        assert!(outcome.successful());
        assert_eq!(store.probe_version(), Some(CURRENT_VERSION));
        assert_eq!(store.severity(), Severity::Info);
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let mut store = bootstrapped_store();
        let before = store.stats().unwrap();

        let outcome = store.initialize();
        assert!(outcome.successful());
        assert_eq!(store.stats().unwrap(), before);
        assert_eq!(store.probe_version(), Some(CURRENT_VERSION));
    }

    #[test]
    fn test_reopened_store_stays_current() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pomotrack.db");

        {
            let mut store = Store::open(&path);
            assert!(store.initialize().successful());
        }

        let mut store = Store::open(&path);
        assert!(store.initialize().successful());
        assert_eq!(store.stats().unwrap().activity_types, 3);
        assert_eq!(store.severity(), Severity::Info);
    }

    #[test]
    fn test_probe_without_schema_is_none() {
        let store = Store::open_in_memory();
        assert_eq!(store.probe_version(), None);
    }

    #[test]
    fn test_probe_unparsable_version_is_none() {
        let store = Store::open_in_memory();
        let conn = store.connection().unwrap();
        conn.execute(&schema::TABLES[0].create_sql(), []).unwrap();
        conn.execute(
            "INSERT INTO db_info(property, value) VALUES ('version', 'banana')",
            [],
        )
        .unwrap();

        assert_eq!(store.probe_version(), None);
    }

    #[test]
    fn test_probe_on_closed_handle_is_none() {
        let mut store = Store::open_in_memory();
        store.close();
        assert_eq!(store.probe_version(), None);
    }

    #[test]
    fn test_seed_rows() {
        let store = bootstrapped_store();
        let conn = store.connection().unwrap();

        let mut stmt = conn
            .prepare("SELECT short_name, full_name FROM activity_type ORDER BY short_name")
            .unwrap();
        let rows: Vec<(String, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();

        let short_names: Vec<&str> = rows.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(short_names, ["long_break", "short_break", "work"]);
        assert!(rows.iter().all(|(_, full)| !full.is_empty()));
    }

    #[test]
    fn test_single_version_row() {
        let store = bootstrapped_store();
        let conn = store.connection().unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM db_info WHERE property = 'version'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);

        let value: String = conn
            .query_row(
                "SELECT value FROM db_info WHERE property = 'version'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(value, CURRENT_VERSION.to_string());
    }

    #[test]
    fn test_table_creation_failure_is_reported() {
        let mut store = Store::open_in_memory();
        // Pre-existing table with a conflicting shape forces the create to fail
        store
            .connection()
            .unwrap()
            .execute("CREATE TABLE user(nickname TEXT)", [])
            .unwrap();

        let outcome = store.initialize();
        assert!(!outcome.successful());
        assert!(
            outcome
                .errors()
                .iter()
                .any(|e| matches!(e, Error::TableCreation { table: "user", .. }))
        );
        assert_eq!(store.severity(), Severity::Error);
        assert!(store.message().contains("user"));
    }

    #[test]
    fn test_future_version_fails_fast() {
        let mut store = Store::open_in_memory();
        {
            let conn = store.connection().unwrap();
            conn.execute(&schema::TABLES[0].create_sql(), []).unwrap();
            conn.execute(
                "INSERT INTO db_info(property, value) VALUES ('version', '99')",
                [],
            )
            .unwrap();
        }

        let outcome = store.initialize();
        assert!(!outcome.successful());
        assert!(matches!(
            outcome.errors()[0],
            Error::VersionFromFuture {
                stored: 99,
                target: CURRENT_VERSION
            }
        ));
        assert!(store.message().contains("newer"));
    }

    #[test]
    fn test_closed_handle_short_circuits() {
        let dir = tempfile::tempdir().unwrap();
        // Parent directory does not exist, so the open fails
        let path = dir.path().join("missing").join("pomotrack.db");

        let mut store = Store::open(&path);
        assert!(!store.is_open());
        assert_eq!(store.severity(), Severity::Error);

        let outcome = store.initialize();
        assert!(!outcome.successful());
        assert!(matches!(outcome.errors()[0], Error::NotOpen));
        assert_eq!(store.message(), "No store opened.");
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut store = Store::open_in_memory();
        store.close();
        assert!(!store.is_open());
        let reports_after_first = store.reports().len();

        store.close();
        assert_eq!(store.reports().len(), reports_after_first);
    }

    #[test]
    fn test_stats_on_closed_handle_fails() {
        let mut store = Store::open_in_memory();
        store.close();
        assert!(matches!(store.stats(), Err(Error::NotOpen)));
    }
}
