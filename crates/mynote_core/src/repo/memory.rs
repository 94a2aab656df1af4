//! In-memory note repository.
//!
//! Mirrors `SqliteNoteStore` semantics (id assignment, ordering, idempotent
//! delete, live feed) without touching disk. Writes can be forced to fail so
//! callers can exercise storage-error paths.

use crate::db::DbError;
use crate::model::note::{Note, NoteId};
use crate::repo::note_repo::NoteRepository;
use crate::store::note_store::NotesFeed;
use crate::store::{StoreError, StoreResult};
use rusqlite::ffi;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;

#[derive(Default)]
struct MemoryState {
    notes: Vec<Note>,
    last_id: NoteId,
}

/// Volatile repository with the same contract as the SQLite store.
pub struct MemoryNoteRepository {
    state: Mutex<MemoryState>,
    feed: watch::Sender<Vec<Note>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl Default for MemoryNoteRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryNoteRepository {
    pub fn new() -> Self {
        let (feed, _) = watch::channel(Vec::new());
        Self {
            state: Mutex::new(MemoryState::default()),
            feed,
            fail_writes: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
        }
    }

    /// Makes every following write fail with an I/O storage error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful insert/update/upsert/delete calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn write<T>(&self, apply: impl FnOnce(&mut MemoryState) -> StoreResult<T>) -> StoreResult<T> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(injected_io_error());
        }

        let mut state = self.lock()?;
        let output = apply(&mut state)?;
        state
            .notes
            .sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.feed.send_replace(state.notes.clone());
        Ok(output)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, MemoryState>> {
        self.state.lock().map_err(|_| StoreError::Unavailable)
    }
}

impl NoteRepository for MemoryNoteRepository {
    fn observe_all(&self) -> NotesFeed {
        self.feed.subscribe()
    }

    fn insert(&self, note: &Note) -> StoreResult<NoteId> {
        if note.id.is_some() {
            return Err(StoreError::InvalidNote("insert requires a note without id"));
        }

        self.write(|state| {
            state.last_id += 1;
            let id = state.last_id;
            state.notes.push(Note {
                id: Some(id),
                ..note.clone()
            });
            Ok(id)
        })
    }

    fn update(&self, note: &Note) -> StoreResult<()> {
        let id = note
            .id
            .ok_or(StoreError::InvalidNote("update requires a persisted note"))?;

        self.write(|state| {
            let slot = state
                .notes
                .iter_mut()
                .find(|existing| existing.id == Some(id))
                .ok_or(StoreError::NotFound(id))?;
            *slot = note.clone();
            Ok(())
        })
    }

    fn upsert(&self, note: &Note) -> StoreResult<NoteId> {
        self.write(|state| {
            let id = match note.id {
                Some(id) => id,
                None => state.last_id + 1,
            };
            state.last_id = state.last_id.max(id);
            state.notes.retain(|existing| existing.id != Some(id));
            state.notes.push(Note {
                id: Some(id),
                ..note.clone()
            });
            Ok(id)
        })
    }

    fn delete(&self, note: &Note) -> StoreResult<()> {
        let Some(id) = note.id else {
            return Ok(());
        };

        self.write(|state| {
            state.notes.retain(|existing| existing.id != Some(id));
            Ok(())
        })
    }
}

fn injected_io_error() -> StoreError {
    StoreError::Storage(DbError::Sqlite(rusqlite::Error::SqliteFailure(
        ffi::Error::new(ffi::SQLITE_IOERR),
        Some("injected write failure".to_string()),
    )))
}
