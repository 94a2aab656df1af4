//! Note list view model.
//!
//! # Responsibility
//! - Combine the repository feed, search text and filter mode into one
//!   derived list.
//! - Own selection mode, save notifications and the auto-save preference.
//! - Apply the blank-note guard before any write.
//!
//! # Invariants
//! - Observers receive whole `NoteListState` snapshots, never partial ones.
//! - Every command pulls the latest feed value before acting, so a command's
//!   own write is visible in the state it leaves behind.
//! - Leaving selection mode always empties the selected set.

use crate::model::note::{is_blank_pair, now_epoch_ms, Note, NoteId};
use crate::repo::note_repo::NoteRepository;
use crate::service::editor::EditorSession;
use crate::service::notification::SaveNotification;
use crate::service::query::{derive_notes, FilterOption};
use crate::settings::{Settings, SettingsError, SettingsStore};
use crate::store::note_store::NotesFeed;
use crate::store::StoreError;
use log::{debug, error, info, warn};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Error surfaced by view-model write commands.
#[derive(Debug)]
pub enum ViewModelError {
    /// Update targeted a note that no longer exists.
    NoteNotFound(NoteId),
    /// Persistence failure.
    Store(StoreError),
    /// Save requested on an editor session that was already closed or deleted.
    SessionClosed,
}

impl Display for ViewModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::SessionClosed => write!(f, "editor session is closed"),
        }
    }
}

impl Error for ViewModelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::NoteNotFound(_) | Self::SessionClosed => None,
        }
    }
}

impl From<StoreError> for ViewModelError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(id) => Self::NoteNotFound(id),
            other => Self::Store(other),
        }
    }
}

pub type ViewModelResult<T> = Result<T, ViewModelError>;

/// Result of a save command that passed storage without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The note as written, with its store id.
    Saved(Note),
    /// Title and content were both blank; nothing was written.
    SkippedBlank,
}

impl SaveOutcome {
    pub fn saved(&self) -> Option<&Note> {
        match self {
            Self::Saved(note) => Some(note),
            Self::SkippedBlank => None,
        }
    }
}

/// Observable snapshot consumed by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NoteListState {
    pub notes: Vec<Note>,
    pub search_query: String,
    pub filter: FilterOption,
    pub is_in_selection_mode: bool,
    pub selected_note_ids: BTreeSet<NoteId>,
    pub save_notification: SaveNotification,
    pub auto_save_enabled: bool,
}

struct ViewState {
    source: Vec<Note>,
    view: NoteListState,
}

impl ViewState {
    fn recompute(&mut self) {
        self.view.notes = derive_notes(&self.source, &self.view.search_query, self.view.filter);
    }
}

struct Shared<R> {
    repo: R,
    settings: Arc<dyn SettingsStore>,
    auto_save_debounce: Duration,
    feed: Mutex<NotesFeed>,
    state: Mutex<ViewState>,
    published: watch::Sender<NoteListState>,
}

impl<R> Shared<R> {
    /// Runs `apply` against the freshest state and publishes the result.
    fn update<T>(&self, apply: impl FnOnce(&mut ViewState) -> T) -> T {
        let mut state = lock(&self.state);
        {
            let mut feed = lock(&self.feed);
            if feed.has_changed().unwrap_or(false) {
                state.source = feed.borrow_and_update().clone();
                state.recompute();
            }
        }

        let output = apply(&mut state);
        state.recompute();
        self.published.send_if_modified(|current| {
            if *current == state.view {
                return false;
            }
            *current = state.view.clone();
            true
        });
        output
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Aggregation layer between the repository and the note screens.
pub struct NoteViewModel<R> {
    shared: Arc<Shared<R>>,
}

impl<R> Clone for NoteViewModel<R> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<R> NoteViewModel<R>
where
    R: NoteRepository + Send + Sync + 'static,
{
    /// Builds the view model over `repo`, reading the auto-save preference
    /// from `settings`. An unreadable settings store falls back to defaults.
    pub fn new(repo: R, settings: Arc<dyn SettingsStore>, auto_save_debounce: Duration) -> Self {
        let preferences = settings.load().unwrap_or_else(|err| {
            warn!("event=settings_load module=view_model status=fallback error={err}");
            Settings::default()
        });

        let feed = repo.observe_all();
        let source = feed.borrow().clone();
        let mut state = ViewState {
            source,
            view: NoteListState {
                auto_save_enabled: preferences.auto_save_enabled,
                ..NoteListState::default()
            },
        };
        state.recompute();
        let (published, _) = watch::channel(state.view.clone());

        Self {
            shared: Arc::new(Shared {
                repo,
                settings,
                auto_save_debounce,
                feed: Mutex::new(feed),
                state: Mutex::new(state),
                published,
            }),
        }
    }

    /// Spawns a task that republishes the derived list whenever the
    /// repository feed changes. Must be called inside a Tokio runtime.
    ///
    /// The task stops when the feed closes or the view model is dropped.
    pub fn watch_repository(&self) -> JoinHandle<()> {
        let mut feed = self.shared.repo.observe_all();
        let shared = Arc::downgrade(&self.shared);
        tokio::spawn(async move {
            while feed.changed().await.is_ok() {
                let Some(shared) = shared.upgrade() else {
                    break;
                };
                shared.update(|_| ());
            }
            debug!("event=feed_listener module=view_model status=stopped");
        })
    }

    /// Subscribes to state snapshots.
    pub fn subscribe(&self) -> watch::Receiver<NoteListState> {
        self.shared.published.subscribe()
    }

    /// Current snapshot, including every write completed so far.
    pub fn state(&self) -> NoteListState {
        self.shared.update(|state| state.view.clone())
    }

    /// Derived (searched + sorted) note list.
    pub fn notes(&self) -> Vec<Note> {
        self.state().notes
    }

    pub fn search_query(&self) -> String {
        self.state().search_query
    }

    pub fn filter_option(&self) -> FilterOption {
        self.state().filter
    }

    pub fn is_in_selection_mode(&self) -> bool {
        self.state().is_in_selection_mode
    }

    pub fn selected_note_ids(&self) -> BTreeSet<NoteId> {
        self.state().selected_note_ids
    }

    pub fn save_notification(&self) -> SaveNotification {
        self.state().save_notification
    }

    pub fn is_auto_save_enabled(&self) -> bool {
        lock(&self.shared.state).view.auto_save_enabled
    }

    pub(crate) fn auto_save_debounce(&self) -> Duration {
        self.shared.auto_save_debounce
    }

    pub fn set_search_query(&self, query: impl Into<String>) {
        let query = query.into();
        self.shared.update(|state| state.view.search_query = query);
    }

    pub fn set_filter_option(&self, filter: FilterOption) {
        self.shared.update(|state| state.view.filter = filter);
    }

    pub fn enter_selection_mode(&self) {
        self.shared
            .update(|state| state.view.is_in_selection_mode = true);
    }

    /// Leaves selection mode and clears the selection. Idempotent.
    pub fn exit_selection_mode(&self) {
        self.shared.update(|state| {
            state.view.is_in_selection_mode = false;
            state.view.selected_note_ids.clear();
        });
    }

    /// Adds `id` to the selection, or removes it when already selected.
    /// Removing the last selected id leaves selection mode.
    pub fn toggle_note_selection(&self, id: NoteId) {
        self.shared.update(|state| {
            let selected = &mut state.view.selected_note_ids;
            if !selected.remove(&id) {
                selected.insert(id);
            }
            if selected.is_empty() {
                state.view.is_in_selection_mode = false;
            }
        });
    }

    /// Inserts a new note stamped with the current time.
    pub fn insert_note(
        &self,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> ViewModelResult<SaveOutcome> {
        let draft = Note::draft(title, content);
        if draft.is_blank() {
            debug!("event=note_insert module=view_model status=skipped reason=blank");
            return Ok(SaveOutcome::SkippedBlank);
        }

        let id = self.shared.repo.insert(&draft).map_err(|err| {
            error!("event=note_insert module=view_model status=error error={err}");
            err
        })?;
        info!("event=note_insert module=view_model status=ok note_id={id}");
        self.shared.update(|_| ());

        Ok(SaveOutcome::Saved(Note {
            id: Some(id),
            ..draft
        }))
    }

    /// Rewrites `note` with new fields and a refreshed timestamp.
    pub fn update_note(
        &self,
        note: &Note,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> ViewModelResult<SaveOutcome> {
        let title = title.into();
        let content = content.into();
        if is_blank_pair(&title, &content) {
            debug!("event=note_update module=view_model status=skipped reason=blank");
            return Ok(SaveOutcome::SkippedBlank);
        }

        let updated = Note {
            id: note.id,
            title,
            content,
            timestamp: now_epoch_ms(),
        };
        self.shared.repo.update(&updated).map_err(|err| {
            error!(
                "event=note_update module=view_model status=error note_id={:?} error={err}",
                updated.id
            );
            err
        })?;
        info!(
            "event=note_update module=view_model status=ok note_id={:?}",
            updated.id
        );
        self.shared.update(|_| ());

        Ok(SaveOutcome::Saved(updated))
    }

    /// Deletes `note`. Deleting a note that is already gone succeeds.
    pub fn delete_note(&self, note: &Note) -> ViewModelResult<()> {
        self.shared.repo.delete(note).map_err(|err| {
            error!(
                "event=note_delete module=view_model status=error note_id={:?} error={err}",
                note.id
            );
            err
        })?;
        info!(
            "event=note_delete module=view_model status=ok note_id={:?}",
            note.id
        );
        self.shared.update(|_| ());
        Ok(())
    }

    /// Deletes every selected note still present in the derived list, then
    /// leaves selection mode. Selected ids without a visible note are
    /// ignored. Selection mode is left even when a delete fails.
    ///
    /// Returns the number of notes deleted.
    pub fn delete_selected_notes(&self) -> ViewModelResult<usize> {
        let targets: Vec<Note> = self.shared.update(|state| {
            state
                .view
                .notes
                .iter()
                .filter(|note| {
                    note.id
                        .is_some_and(|id| state.view.selected_note_ids.contains(&id))
                })
                .cloned()
                .collect()
        });

        let mut deleted = 0;
        let mut outcome: ViewModelResult<()> = Ok(());
        for note in &targets {
            if let Err(err) = self.shared.repo.delete(note) {
                error!(
                    "event=notes_delete_selected module=view_model status=error note_id={:?} error={err}",
                    note.id
                );
                outcome = Err(err.into());
                break;
            }
            deleted += 1;
        }

        self.exit_selection_mode();
        info!(
            "event=notes_delete_selected module=view_model status={} deleted={deleted} requested={}",
            if outcome.is_ok() { "ok" } else { "error" },
            targets.len()
        );
        outcome.map(|()| deleted)
    }

    /// Raises `Auto`, but only while auto-save is enabled.
    pub fn show_auto_save_notification(&self) {
        self.shared.update(|state| {
            if state.view.auto_save_enabled {
                state.view.save_notification = SaveNotification::Auto;
            }
        });
    }

    pub fn show_manual_save_notification(&self) {
        self.shared
            .update(|state| state.view.save_notification = SaveNotification::Manual);
    }

    pub fn show_save_failed_notification(&self) {
        self.shared
            .update(|state| state.view.save_notification = SaveNotification::Failed);
    }

    /// Marks the current notification as displayed.
    pub fn clear_save_notification(&self) {
        self.shared
            .update(|state| state.view.save_notification = SaveNotification::None);
    }

    /// Sets and persists the auto-save preference. Disabling it also drops
    /// any pending notification; pending timers re-check the flag and skip.
    ///
    /// The in-memory flag changes even when persisting the preference fails.
    pub fn set_auto_save_enabled(&self, enabled: bool) -> Result<(), SettingsError> {
        self.shared.update(|state| {
            state.view.auto_save_enabled = enabled;
            if !enabled {
                state.view.save_notification = SaveNotification::None;
            }
        });
        info!("event=auto_save_toggle module=view_model status=ok enabled={enabled}");
        self.shared.settings.save(&Settings {
            auto_save_enabled: enabled,
        })
    }

    /// Flips the auto-save preference and returns the new value.
    pub fn toggle_auto_save(&self) -> Result<bool, SettingsError> {
        let enabled = !self.is_auto_save_enabled();
        self.set_auto_save_enabled(enabled)?;
        Ok(enabled)
    }

    /// Opens an edit session for `initial`, or for a new note when `None`.
    pub fn open_editor(&self, initial: Option<Note>) -> EditorSession<R> {
        EditorSession::new(self.clone(), initial)
    }
}
