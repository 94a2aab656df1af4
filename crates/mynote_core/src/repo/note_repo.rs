//! Note repository contract and SQLite pass-through.
//!
//! # Responsibility
//! - Expose the store feed and mutations behind a swappable trait.
//!
//! # Invariants
//! - `StoreNoteRepository` forwards every call unchanged.

use crate::model::note::{Note, NoteId};
use crate::store::note_store::{NotesFeed, SqliteNoteStore};
use crate::store::StoreResult;
use std::sync::Arc;

/// Storage-agnostic note access used by the view-model layer.
pub trait NoteRepository {
    /// Live feed of all notes, newest first.
    fn observe_all(&self) -> NotesFeed;
    /// Inserts an unsaved note and returns its assigned id.
    fn insert(&self, note: &Note) -> StoreResult<NoteId>;
    /// Replaces an existing note; missing id is `StoreError::NotFound`.
    fn update(&self, note: &Note) -> StoreResult<()>;
    /// Insert-or-replace by id. Maintenance paths only.
    fn upsert(&self, note: &Note) -> StoreResult<NoteId>;
    /// Deletes by id; missing id is a successful no-op.
    fn delete(&self, note: &Note) -> StoreResult<()>;
}

impl<T: NoteRepository + ?Sized> NoteRepository for Arc<T> {
    fn observe_all(&self) -> NotesFeed {
        (**self).observe_all()
    }

    fn insert(&self, note: &Note) -> StoreResult<NoteId> {
        (**self).insert(note)
    }

    fn update(&self, note: &Note) -> StoreResult<()> {
        (**self).update(note)
    }

    fn upsert(&self, note: &Note) -> StoreResult<NoteId> {
        (**self).upsert(note)
    }

    fn delete(&self, note: &Note) -> StoreResult<()> {
        (**self).delete(note)
    }
}

/// Repository backed by the shared SQLite store.
#[derive(Clone)]
pub struct StoreNoteRepository {
    store: Arc<SqliteNoteStore>,
}

impl StoreNoteRepository {
    pub fn new(store: Arc<SqliteNoteStore>) -> Self {
        Self { store }
    }

    /// Underlying store, for one-shot reads outside the repository contract.
    pub fn store(&self) -> &Arc<SqliteNoteStore> {
        &self.store
    }
}

impl NoteRepository for StoreNoteRepository {
    fn observe_all(&self) -> NotesFeed {
        self.store.observe_all()
    }

    fn insert(&self, note: &Note) -> StoreResult<NoteId> {
        self.store.insert(note)
    }

    fn update(&self, note: &Note) -> StoreResult<()> {
        self.store.update(note)
    }

    fn upsert(&self, note: &Note) -> StoreResult<NoteId> {
        self.store.upsert(note)
    }

    fn delete(&self, note: &Note) -> StoreResult<()> {
        self.store.delete(note)
    }
}
