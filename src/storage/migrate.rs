//! Forward schema migrations
//!
//! Each step carries the version it upgrades from and a body run inside a
//! transaction together with the version-row bump, so a failed step leaves
//! the store at its starting version rather than in a half-migrated state.

use rusqlite::{Connection, Transaction, params};

use super::schema::{TABLE_INFO, VERSION_PROPERTY};
use crate::{Error, Result};

/// One atomic schema transition from version `from` to `from + 1`
pub struct MigrationStep {
    pub from: u32,
    pub apply: fn(&Transaction) -> rusqlite::Result<()>,
}

/// Registered migration steps, ordered by `from`.
///
/// Empty while only schema version 1 exists; new steps are appended here
/// when the schema next changes.
pub const STEPS: &[MigrationStep] = &[];

/// Migrate the store from version `from` up to version `to`.
///
/// No-op when already at the target. A stored version beyond the target is
/// refused outright; downgrades are never attempted.
pub fn migrate(conn: &mut Connection, from: u32, to: u32) -> Result<()> {
    run_steps(conn, STEPS, from, to)
}

fn run_steps(conn: &mut Connection, steps: &[MigrationStep], from: u32, to: u32) -> Result<()> {
    if from == to {
        return Ok(());
    }
    if from > to {
        return Err(Error::VersionFromFuture {
            stored: from,
            target: to,
        });
    }

    for version in from..to {
        let step = steps
            .iter()
            .find(|s| s.from == version)
            .ok_or(Error::MissingMigrationStep { from: version })?;

        tracing::info!("Migrating store schema {} -> {}", version, version + 1);
        apply_step(conn, step, version).map_err(|source| Error::MigrationStep {
            from: version,
            to: version + 1,
            source,
        })?;
    }

    Ok(())
}

fn apply_step(conn: &mut Connection, step: &MigrationStep, version: u32) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;
    (step.apply)(&tx)?;
    tx.execute(
        &format!("UPDATE {TABLE_INFO} SET value = ?1 WHERE property = ?2"),
        params![(version + 1).to_string(), VERSION_PROPERTY],
    )?;
    tx.commit()
}
