//! Edit-screen session with debounced auto-save.
//!
//! # Responsibility
//! - Track the in-progress title/content against the last saved snapshot.
//! - Arm, re-arm and cancel the auto-save timer.
//! - Implement manual save, exit-with-save and delete for one edit screen.
//!
//! # Invariants
//! - At most one timer is armed per session; every edit cancels the previous
//!   one and only the latest generation may write.
//! - A firing timer re-checks the auto-save flag, the dirty flag and the
//!   blank guard under the session lock before writing.
//! - Once a new note is inserted, later saves update that same row.
//! - Manual save, close and delete cancel the timer unconditionally.
//! - A closed or deleted session never writes again. A `close()` whose write
//!   failed leaves the session open so the caller can retry.
//! - The store write behind a timer runs on the blocking pool, not on the
//!   async worker that slept.

use crate::model::note::{is_blank_pair, Note};
use crate::repo::note_repo::NoteRepository;
use crate::service::view_model::{NoteViewModel, SaveOutcome, ViewModelError, ViewModelResult};
use log::{debug, error, info, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

struct EditorState {
    /// Persisted row being edited; `None` until the first insert.
    note: Option<Note>,
    title: String,
    content: String,
    saved_title: String,
    saved_content: String,
    dirty: bool,
    generation: u64,
    timer: Option<JoinHandle<()>>,
    closed: bool,
}

impl EditorState {
    fn is_blank(&self) -> bool {
        is_blank_pair(&self.title, &self.content)
    }

    fn cancel_timer(&mut self) {
        self.generation += 1;
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

struct EditorShared<R> {
    view_model: NoteViewModel<R>,
    state: Mutex<EditorState>,
}

/// One note-editing session, created by `NoteViewModel::open_editor`.
pub struct EditorSession<R> {
    shared: Arc<EditorShared<R>>,
}

impl<R> EditorShared<R>
where
    R: NoteRepository + Send + Sync + 'static,
{
    fn lock(&self) -> MutexGuard<'_, EditorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, state: &mut EditorState) -> ViewModelResult<SaveOutcome> {
        let outcome = match &state.note {
            Some(note) => {
                self.view_model
                    .update_note(note, state.title.as_str(), state.content.as_str())?
            }
            None => self
                .view_model
                .insert_note(state.title.as_str(), state.content.as_str())?,
        };

        if let SaveOutcome::Saved(saved) = &outcome {
            state.note = Some(saved.clone());
            state.saved_title = saved.title.clone();
            state.saved_content = saved.content.clone();
            state.dirty = false;
        }
        Ok(outcome)
    }

    fn fire_auto_save(&self, generation: u64) {
        let mut state = self.lock();
        if state.closed || state.generation != generation {
            return;
        }
        state.timer = None;

        if !self.view_model.is_auto_save_enabled() {
            debug!("event=auto_save module=editor status=skipped reason=disabled");
            return;
        }
        if !state.dirty || state.is_blank() {
            return;
        }

        match self.persist(&mut state) {
            Ok(outcome) => info!(
                "event=auto_save module=editor status=ok note_id={:?}",
                outcome.saved().and_then(|note| note.id)
            ),
            Err(err) => {
                error!("event=auto_save module=editor status=error error={err}");
                self.view_model.show_save_failed_notification();
            }
        }
    }
}

impl<R> EditorSession<R>
where
    R: NoteRepository + Send + Sync + 'static,
{
    pub(crate) fn new(view_model: NoteViewModel<R>, initial: Option<Note>) -> Self {
        let title = initial
            .as_ref()
            .map(|note| note.title.clone())
            .unwrap_or_default();
        let content = initial
            .as_ref()
            .map(|note| note.content.clone())
            .unwrap_or_default();
        let note = initial.filter(Note::is_persisted);

        Self {
            shared: Arc::new(EditorShared {
                view_model,
                state: Mutex::new(EditorState {
                    note,
                    saved_title: title.clone(),
                    saved_content: content.clone(),
                    title,
                    content,
                    dirty: false,
                    generation: 0,
                    timer: None,
                    closed: false,
                }),
            }),
        }
    }

    /// Records the latest title/content and (re)arms the auto-save timer.
    ///
    /// The timer is armed only when the text differs from the last save, is
    /// not blank, and auto-save is enabled. Without a Tokio runtime the edit
    /// is still tracked but no timer is armed.
    pub fn edit(&self, title: impl Into<String>, content: impl Into<String>) {
        let mut state = self.shared.lock();
        if state.closed {
            return;
        }

        state.title = title.into();
        state.content = content.into();
        state.cancel_timer();

        let changed = state.title != state.saved_title || state.content != state.saved_content;
        state.dirty = changed && !state.is_blank();
        if !state.dirty {
            return;
        }

        if !self.shared.view_model.is_auto_save_enabled() {
            return;
        }
        let Ok(runtime) = Handle::try_current() else {
            warn!("event=auto_save module=editor status=skipped reason=no_runtime");
            return;
        };

        let generation = state.generation;
        let delay = self.shared.view_model.auto_save_debounce();
        let shared: Weak<EditorShared<R>> = Arc::downgrade(&self.shared);
        state.timer = Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(shared) = shared.upgrade() else {
                return;
            };
            let write = tokio::task::spawn_blocking(move || shared.fire_auto_save(generation));
            if let Err(err) = write.await {
                error!("event=auto_save module=editor status=error error={err}");
            }
        }));
    }

    /// Explicit save: writes regardless of the auto-save flag and raises a
    /// `Manual` notification when a row was written.
    ///
    /// A blank note is skipped and raises no notification. Fails with
    /// [`ViewModelError::SessionClosed`] after `close()` or `delete()`.
    pub fn save(&self) -> ViewModelResult<SaveOutcome> {
        let mut state = self.shared.lock();
        if state.closed {
            return Err(ViewModelError::SessionClosed);
        }
        state.cancel_timer();

        match self.shared.persist(&mut state) {
            Ok(outcome) => {
                if outcome.saved().is_some() {
                    self.shared.view_model.show_manual_save_notification();
                }
                Ok(outcome)
            }
            Err(err) => {
                self.shared.view_model.show_save_failed_notification();
                Err(err)
            }
        }
    }

    /// Exit/back action. Writes pending changes only when auto-save is
    /// enabled, raising an `Auto` notification. Returns whether a write
    /// happened. Closing a closed session is a no-op.
    ///
    /// If the write fails the error is returned and the session stays open
    /// and dirty, so `close()` may be called again.
    pub fn close(&self) -> ViewModelResult<bool> {
        let mut state = self.shared.lock();
        if state.closed {
            return Ok(false);
        }
        state.cancel_timer();

        let view_model = &self.shared.view_model;
        if !(view_model.is_auto_save_enabled() && state.dirty && !state.is_blank()) {
            state.closed = true;
            return Ok(false);
        }

        match self.shared.persist(&mut state) {
            Ok(SaveOutcome::Saved(_)) => {
                state.closed = true;
                view_model.show_auto_save_notification();
                Ok(true)
            }
            Ok(SaveOutcome::SkippedBlank) => {
                state.closed = true;
                Ok(false)
            }
            Err(err) => {
                view_model.show_save_failed_notification();
                Err(err)
            }
        }
    }

    /// Deletes the note being edited (if it was ever saved) and closes the
    /// session without saving.
    pub fn delete(&self) -> ViewModelResult<()> {
        let mut state = self.shared.lock();
        state.closed = true;
        state.cancel_timer();
        state.dirty = false;

        match state.note.take() {
            Some(note) => self.shared.view_model.delete_note(&note),
            None => Ok(()),
        }
    }

    pub fn title(&self) -> String {
        self.shared.lock().title.clone()
    }

    pub fn content(&self) -> String {
        self.shared.lock().content.clone()
    }

    /// Note as last persisted by this session, or the note it was opened on.
    pub fn note(&self) -> Option<Note> {
        self.shared.lock().note.clone()
    }

    pub fn is_dirty(&self) -> bool {
        self.shared.lock().dirty
    }

    pub fn is_closed(&self) -> bool {
        self.shared.lock().closed
    }

    /// Whether an auto-save timer is armed and has not fired yet.
    pub fn has_pending_auto_save(&self) -> bool {
        self.shared
            .lock()
            .timer
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }
}

impl<R> Drop for EditorSession<R> {
    fn drop(&mut self) {
        let mut state = self.shared.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.closed = true;
        state.cancel_timer();
    }
}
