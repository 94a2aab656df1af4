//! SQLite-backed note store with a live "all notes" feed.
//!
//! # Responsibility
//! - Provide insert/update/upsert/delete over the `notes` table.
//! - Re-read the full list inside each write transaction and publish it.
//!
//! # Invariants
//! - Feed order is `timestamp DESC, id DESC`.
//! - The published list is read in the same transaction as the write, and
//!   sent before the connection lock is released.
//! - Deleting a missing or unsaved note is a successful no-op.

use crate::model::note::{Note, NoteId};
use crate::store::{StoreError, StoreResult};
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;

const NOTE_SELECT_SQL: &str = "SELECT id, title, content, timestamp FROM notes";

/// Live, restartable feed of the complete ordered note list.
///
/// Each receiver starts at the current list; `changed()` resolves after the
/// next committed write.
pub type NotesFeed = watch::Receiver<Vec<Note>>;

/// Note store over one migrated SQLite connection.
pub struct SqliteNoteStore {
    conn: Mutex<Connection>,
    feed: watch::Sender<Vec<Note>>,
}

impl SqliteNoteStore {
    /// Wraps a migrated connection and seeds the live feed.
    pub fn new(conn: Connection) -> StoreResult<Self> {
        let initial = load_all(&conn)?;
        debug!(
            "event=store_open module=store status=ok notes={}",
            initial.len()
        );
        let (feed, _) = watch::channel(initial);
        Ok(Self {
            conn: Mutex::new(conn),
            feed,
        })
    }

    /// Subscribes to the live note list.
    pub fn observe_all(&self) -> NotesFeed {
        self.feed.subscribe()
    }

    /// Reads the current ordered list once.
    pub fn all_notes(&self) -> StoreResult<Vec<Note>> {
        let conn = self.lock()?;
        load_all(&conn)
    }

    /// Reads one note by id.
    pub fn get(&self, id: NoteId) -> StoreResult<Option<Note>> {
        let conn = self.lock()?;
        let note = conn
            .query_row(
                &format!("{NOTE_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_note_row,
            )
            .optional()?;
        Ok(note)
    }

    /// Inserts an unsaved note and returns the assigned id.
    pub fn insert(&self, note: &Note) -> StoreResult<NoteId> {
        if note.id.is_some() {
            return Err(StoreError::InvalidNote("insert requires a note without id"));
        }

        self.write("insert", |tx| {
            tx.execute(
                "INSERT INTO notes (title, content, timestamp) VALUES (?1, ?2, ?3);",
                params![note.title, note.content, note.timestamp],
            )?;
            Ok(tx.last_insert_rowid())
        })
    }

    /// Replaces every field of an existing row.
    pub fn update(&self, note: &Note) -> StoreResult<()> {
        let id = note
            .id
            .ok_or(StoreError::InvalidNote("update requires a persisted note"))?;

        self.write("update", |tx| {
            let changed = tx.execute(
                "UPDATE notes SET title = ?2, content = ?3, timestamp = ?4 WHERE id = ?1;",
                params![id, note.title, note.content, note.timestamp],
            )?;
            if changed == 0 {
                return Err(StoreError::NotFound(id));
            }
            Ok(())
        })
    }

    /// Inserts or replaces by id. A note without id gets a fresh one.
    pub fn upsert(&self, note: &Note) -> StoreResult<NoteId> {
        self.write("upsert", |tx| {
            tx.execute(
                "INSERT OR REPLACE INTO notes (id, title, content, timestamp)
                 VALUES (?1, ?2, ?3, ?4);",
                params![note.id, note.title, note.content, note.timestamp],
            )?;
            Ok(tx.last_insert_rowid())
        })
    }

    /// Deletes the row matching `note.id`.
    pub fn delete(&self, note: &Note) -> StoreResult<()> {
        let Some(id) = note.id else {
            return Ok(());
        };

        self.write("delete", |tx| {
            let changed = tx.execute("DELETE FROM notes WHERE id = ?1;", [id])?;
            if changed == 0 {
                debug!("event=note_delete module=store status=noop note_id={id}");
            }
            Ok(())
        })
    }

    fn write<T>(
        &self,
        op: &'static str,
        apply: impl FnOnce(&Transaction<'_>) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let output = apply(&tx)?;
        let notes = load_all(&tx)?;
        tx.commit()?;

        debug!(
            "event=note_{op} module=store status=ok notes={}",
            notes.len()
        );
        self.feed.send_replace(notes);
        Ok(output)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| {
            warn!("event=store_lock module=store status=error error_code=lock_poisoned");
            StoreError::Unavailable
        })
    }
}

fn load_all(conn: &Connection) -> StoreResult<Vec<Note>> {
    let mut stmt = conn.prepare(&format!(
        "{NOTE_SELECT_SQL} ORDER BY timestamp DESC, id DESC;"
    ))?;
    let notes = stmt
        .query_map([], parse_note_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(notes)
}

fn parse_note_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: Some(row.get("id")?),
        title: row.get("title")?,
        content: row.get("content")?,
        timestamp: row.get("timestamp")?,
    })
}
