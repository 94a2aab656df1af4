//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record and its blank-content policy.
//! - Provide the wall-clock helper used for `timestamp` stamping.
//!
//! # Invariants
//! - `id` is `None` until the store assigns one, and never changes afterwards.
//! - `timestamp` is Unix epoch milliseconds.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Store-assigned note identifier (SQLite `INTEGER PRIMARY KEY`).
pub type NoteId = i64;

/// Canonical persisted note record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Note {
    /// `None` for a note that has not been inserted yet.
    pub id: Option<NoteId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Creation time on insert, refreshed on every update.
    #[serde(default)]
    pub timestamp: i64,
}

impl Note {
    /// Creates an unsaved note stamped with the current time.
    pub fn draft(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            content: content.into(),
            timestamp: now_epoch_ms(),
        }
    }

    /// Returns whether both `title` and `content` are empty or whitespace.
    pub fn is_blank(&self) -> bool {
        is_blank_pair(&self.title, &self.content)
    }

    /// Returns whether this note already has a store identity.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

/// Blank guard shared by every save path.
pub fn is_blank_pair(title: &str, content: &str) -> bool {
    title.trim().is_empty() && content.trim().is_empty()
}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::{is_blank_pair, Note};

    #[test]
    fn blank_requires_both_fields_blank() {
        assert!(is_blank_pair("", ""));
        assert!(is_blank_pair("  ", "\n\t"));
        assert!(!is_blank_pair("title", ""));
        assert!(!is_blank_pair("", "body"));
    }

    #[test]
    fn draft_is_unsaved_and_stamped() {
        let note = Note::draft("t", "c");
        assert_eq!(note.id, None);
        assert!(!note.is_persisted());
        assert!(note.timestamp > 0);
    }

    #[test]
    fn deserialize_fills_missing_fields_with_defaults() {
        let note: Note = serde_json::from_str(r#"{"id":3}"#).unwrap();
        assert_eq!(note.id, Some(3));
        assert_eq!(note.title, "");
        assert_eq!(note.content, "");
        assert_eq!(note.timestamp, 0);
    }
}
