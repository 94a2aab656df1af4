//! Durable note storage.
//!
//! # Responsibility
//! - Own the single SQLite connection used for note CRUD.
//! - Publish the full ordered note list after every committed write.
//!
//! # Invariants
//! - Writes are serialized through one connection lock.
//! - Subscribers observe emissions in commit order.

use crate::db::DbError;
use crate::model::note::NoteId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod note_store;

pub type StoreResult<T> = Result<T, StoreError>;

/// Error returned by note storage operations.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying persistence I/O failure.
    Storage(DbError),
    /// Update referenced a note id that does not exist.
    NotFound(NoteId),
    /// Caller passed a note that violates the operation contract.
    InvalidNote(&'static str),
    /// Connection lock was poisoned by a panicking writer.
    Unavailable,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::InvalidNote(message) => write!(f, "invalid note: {message}"),
            Self::Unavailable => write!(f, "note store is unavailable"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Storage(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(DbError::Sqlite(value))
    }
}
