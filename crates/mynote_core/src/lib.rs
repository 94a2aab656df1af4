//! Core domain logic for MyNote.
//! This crate owns note persistence, the derived list view and the auto-save
//! policy; presentation layers call into it.

pub mod app;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod settings;
pub mod store;

pub use app::{AppError, NoteApp};
pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::{Note, NoteId};
pub use repo::memory::MemoryNoteRepository;
pub use repo::note_repo::{NoteRepository, StoreNoteRepository};
pub use service::editor::EditorSession;
pub use service::notification::SaveNotification;
pub use service::query::{derive_notes, FilterOption};
pub use service::view_model::{
    NoteListState, NoteViewModel, SaveOutcome, ViewModelError, ViewModelResult,
};
pub use settings::{JsonSettingsStore, MemorySettingsStore, Settings, SettingsError, SettingsStore};
pub use store::note_store::{NotesFeed, SqliteNoteStore};
pub use store::{StoreError, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
