//! Core runtime configuration.
//!
//! # Responsibility
//! - Resolve on-disk locations for the note database and settings file.
//! - Carry tunables (auto-save debounce, log level) into `NoteApp::open`.

use crate::logging::default_log_level;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_DB_FILE_NAME: &str = "note_database.sqlite3";
pub const DEFAULT_SETTINGS_FILE_NAME: &str = "settings.json";
pub const DEFAULT_AUTO_SAVE_DEBOUNCE: Duration = Duration::from_secs(2);

/// Startup configuration for the note core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub data_dir: PathBuf,
    pub db_file_name: String,
    pub settings_file_name: String,
    pub auto_save_debounce: Duration,
    pub log_level: String,
}

impl CoreConfig {
    /// Defaults rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            db_file_name: DEFAULT_DB_FILE_NAME.to_string(),
            settings_file_name: DEFAULT_SETTINGS_FILE_NAME.to_string(),
            auto_save_debounce: DEFAULT_AUTO_SAVE_DEBOUNCE,
            log_level: default_log_level().to_string(),
        }
    }

    pub fn with_auto_save_debounce(mut self, debounce: Duration) -> Self {
        self.auto_save_debounce = debounce;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_file_name)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join(&self.settings_file_name)
    }

    /// Directory for rolling log files.
    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::{CoreConfig, DEFAULT_AUTO_SAVE_DEBOUNCE};
    use std::time::Duration;

    #[test]
    fn paths_are_rooted_at_data_dir() {
        let config = CoreConfig::new("/data/mynote");
        assert_eq!(
            config.db_path().to_str(),
            Some("/data/mynote/note_database.sqlite3")
        );
        assert_eq!(
            config.settings_path().to_str(),
            Some("/data/mynote/settings.json")
        );
        assert_eq!(config.auto_save_debounce, DEFAULT_AUTO_SAVE_DEBOUNCE);
    }

    #[test]
    fn debounce_override_is_kept() {
        let config = CoreConfig::new("/tmp").with_auto_save_debounce(Duration::from_millis(250));
        assert_eq!(config.auto_save_debounce, Duration::from_millis(250));
    }
}
