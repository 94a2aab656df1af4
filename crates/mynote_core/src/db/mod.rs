//! SQLite bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure the note database connection.
//! - Bring legacy and fresh databases to the current schema before use.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - No note row is read or written before migrations succeed.
//! - A failed upgrade reports which step broke and leaves `user_version`
//!   at the last fully applied step.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    /// Connection setup, pragma or query failure outside a migration step.
    Sqlite(rusqlite::Error),
    /// A migration script failed; the whole upgrade was rolled back.
    Migration {
        version: u32,
        name: &'static str,
        source: rusqlite::Error,
    },
    /// The file was written by a newer app release.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl DbError {
    /// Schema version the failing operation was working towards, if any.
    pub fn target_version(&self) -> Option<u32> {
        match self {
            Self::Migration { version, .. } => Some(*version),
            Self::Sqlite(_) | Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "note database error: {err}"),
            Self::Migration {
                version,
                name,
                source,
            } => write!(f, "note schema upgrade to v{version} ({name}) failed: {source}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "note database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::Migration { source: err, .. } => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
