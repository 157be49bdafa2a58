//! # Pomotrack - Store Lifecycle Manager
//!
//! Schema lifecycle management for the pomotrack time-tracking store.
//!
//! Pomotrack provides:
//! - A `Store` handle owning the connection to the SQLite-backed store file
//! - Version probing against the store's `db_info` metadata table
//! - One-shot schema bootstrap with fixed seed data
//! - Forward migrations applied one version step at a time
//! - An `Outcome` envelope carrying success or accumulated structured errors

pub mod config;
pub mod outcome;
pub mod storage;

// Re-exports for convenient access
pub use outcome::{Outcome, Report, Severity};
pub use storage::schema::CURRENT_VERSION;
pub use storage::{Store, StoreStats};

/// Result type alias for Pomotrack operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Pomotrack operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to open store at \"{path}\": {source}")]
    Open {
        path: String,
        source: rusqlite::Error,
    },

    #[error("No store opened")]
    NotOpen,

    #[error("Creation of table \"{table}\" failed: {source}")]
    TableCreation {
        table: &'static str,
        source: rusqlite::Error,
    },

    #[error("Failed to insert {what}: {source}")]
    SeedInsert {
        what: &'static str,
        source: rusqlite::Error,
    },

    #[error("Migration step {from} -> {to} failed: {source}")]
    MigrationStep {
        from: u32,
        to: u32,
        source: rusqlite::Error,
    },

    #[error("No migration step defined for version {from}")]
    MissingMigrationStep { from: u32 },

    #[error("Store version {stored} is newer than supported version {target}")]
    VersionFromFuture { stored: u32, target: u32 },

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}
