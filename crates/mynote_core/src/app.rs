//! Process-level wiring.
//!
//! Builds the object graph once at startup (database → store → repository →
//! settings → view model) and hands out explicit handles. There is no global
//! store instance.

use crate::config::CoreConfig;
use crate::db::{open_db, DbError};
use crate::repo::note_repo::StoreNoteRepository;
use crate::service::view_model::NoteViewModel;
use crate::settings::{JsonSettingsStore, SettingsStore};
use crate::store::note_store::SqliteNoteStore;
use crate::store::StoreError;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

#[derive(Debug)]
pub enum AppError {
    /// Data directory could not be created.
    Io(std::io::Error),
    /// Database open or migration failed.
    Db(DbError),
    /// Store could not read the initial note list.
    Store(StoreError),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "data directory error: {err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<DbError> for AppError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Fully wired note core for one process.
pub struct NoteApp {
    config: CoreConfig,
    store: Arc<SqliteNoteStore>,
    view_model: NoteViewModel<StoreNoteRepository>,
}

impl NoteApp {
    /// Opens (and migrates) the database under `config.data_dir` and builds
    /// the view model. Logging is left to the host; see `init_logging`.
    pub fn open(config: CoreConfig) -> Result<Self, AppError> {
        std::fs::create_dir_all(config.data_dir())?;

        let conn = open_db(config.db_path()).map_err(|err| {
            error!("event=app_open module=app status=error error={err}");
            err
        })?;
        let store = Arc::new(SqliteNoteStore::new(conn)?);
        let settings: Arc<dyn SettingsStore> =
            Arc::new(JsonSettingsStore::new(config.settings_path()));
        let view_model = NoteViewModel::new(
            StoreNoteRepository::new(Arc::clone(&store)),
            settings,
            config.auto_save_debounce,
        );

        info!(
            "event=app_open module=app status=ok debounce_ms={}",
            config.auto_save_debounce.as_millis()
        );
        Ok(Self {
            config,
            store,
            view_model,
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<SqliteNoteStore> {
        &self.store
    }

    pub fn view_model(&self) -> &NoteViewModel<StoreNoteRepository> {
        &self.view_model
    }
}
