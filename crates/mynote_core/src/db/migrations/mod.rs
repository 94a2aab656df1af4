//! SQLite migration registry and executor.
//!
//! # Responsibility
//! - Register note schema migrations in strictly increasing order.
//! - Apply every pending migration in one transaction.
//!
//! # Invariants
//! - `version` values must remain monotonic.
//! - Applied migration version is mirrored to `PRAGMA user_version`.
//! - Version 1 is the legacy single-`text` layout; databases created by the
//!   earlier app release already report `user_version = 1`.

use crate::db::{DbError, DbResult};
use log::{info, warn};
use rusqlite::{Connection, Transaction};
use std::time::Instant;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "legacy_notes",
        sql: include_str!("0001_legacy_notes.sql"),
    },
    Migration {
        version: 2,
        name: "note_title",
        sql: include_str!("0002_note_title.sql"),
    },
];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings the note schema on `conn` up to [`latest_version`].
///
/// Pending steps share one transaction, so a legacy database either reaches
/// the current layout with every row copied or keeps its old layout. A
/// failing step is reported as [`DbError::Migration`].
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = current_user_version(conn)?;
    let latest = latest_version();
    if from > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: latest,
        });
    }

    let pending: Vec<&Migration> = MIGRATIONS
        .iter()
        .filter(|migration| migration.version > from)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let started = Instant::now();
    let tx = conn.transaction()?;
    for migration in &pending {
        run_step(&tx, migration).map_err(|source| {
            warn!(
                "event=db_migrate module=db status=error from={from} version={} name={}",
                migration.version, migration.name
            );
            DbError::Migration {
                version: migration.version,
                name: migration.name,
                source,
            }
        })?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from={from} to={latest} steps={} duration_ms={}",
        pending.len(),
        started.elapsed().as_millis()
    );
    Ok(())
}

fn run_step(tx: &Transaction<'_>, migration: &Migration) -> rusqlite::Result<()> {
    tx.execute_batch(migration.sql)?;
    tx.pragma_update(None, "user_version", migration.version)
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
