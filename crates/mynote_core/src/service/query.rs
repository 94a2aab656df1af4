//! Search + filter derivation over the live note list.
//!
//! # Invariants
//! - `derive_notes` is pure: same inputs, same output, no I/O.
//! - Sorting is stable; equal timestamps keep feed order.

use crate::model::note::Note;
use serde::{Deserialize, Serialize};

/// Sort/filter mode selected on the list screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOption {
    /// Feed order (newest first).
    #[default]
    All,
    /// Timestamp descending.
    Recent,
    /// Timestamp ascending.
    Oldest,
}

/// Applies the search query and filter mode to the feed list.
///
/// A blank query keeps every note. Otherwise a note matches when its title or
/// content contains the query, ignoring case.
pub fn derive_notes(notes: &[Note], query: &str, filter: FilterOption) -> Vec<Note> {
    let mut derived: Vec<Note> = if query.trim().is_empty() {
        notes.to_vec()
    } else {
        let needle = query.to_lowercase();
        notes
            .iter()
            .filter(|note| matches_query(note, &needle))
            .cloned()
            .collect()
    };

    match filter {
        FilterOption::All => {}
        FilterOption::Recent => derived.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
        FilterOption::Oldest => derived.sort_by_key(|note| note.timestamp),
    }

    derived
}

fn matches_query(note: &Note, lowered_needle: &str) -> bool {
    note.title.to_lowercase().contains(lowered_needle)
        || note.content.to_lowercase().contains(lowered_needle)
}

#[cfg(test)]
mod tests {
    use super::{derive_notes, FilterOption};
    use crate::model::note::Note;

    fn note(id: i64, title: &str, content: &str, timestamp: i64) -> Note {
        Note {
            id: Some(id),
            title: title.to_string(),
            content: content.to_string(),
            timestamp,
        }
    }

    fn ids(notes: &[Note]) -> Vec<i64> {
        notes.iter().filter_map(|note| note.id).collect()
    }

    fn feed() -> Vec<Note> {
        vec![
            note(4, "Groceries", "milk, eggs", 400),
            note(3, "", "Call the DENTIST", 300),
            note(2, "Ideas", "rust side project", 300),
            note(1, "Old", "first note", 100),
        ]
    }

    #[test]
    fn blank_query_with_all_keeps_feed_unchanged() {
        let notes = feed();
        assert_eq!(derive_notes(&notes, "", FilterOption::All), notes);
        assert_eq!(derive_notes(&notes, "   ", FilterOption::All), notes);
    }

    #[test]
    fn search_is_case_insensitive_over_title_or_content() {
        let notes = feed();
        assert_eq!(ids(&derive_notes(&notes, "dentist", FilterOption::All)), vec![3]);
        assert_eq!(ids(&derive_notes(&notes, "GROC", FilterOption::All)), vec![4]);
        assert_eq!(ids(&derive_notes(&notes, "note", FilterOption::All)), vec![1]);
        assert!(derive_notes(&notes, "absent", FilterOption::All).is_empty());
    }

    #[test]
    fn recent_is_non_increasing_and_stable_for_ties() {
        let notes = vec![
            note(1, "a", "", 100),
            note(2, "b", "", 300),
            note(3, "c", "", 300),
            note(4, "d", "", 200),
        ];
        let derived = derive_notes(&notes, "", FilterOption::Recent);
        assert_eq!(ids(&derived), vec![2, 3, 4, 1]);
        assert!(derived
            .windows(2)
            .all(|pair| pair[0].timestamp >= pair[1].timestamp));
    }

    #[test]
    fn oldest_is_non_decreasing_and_stable_for_ties() {
        let notes = feed();
        let derived = derive_notes(&notes, "", FilterOption::Oldest);
        assert_eq!(ids(&derived), vec![1, 3, 2, 4]);
        assert!(derived
            .windows(2)
            .all(|pair| pair[0].timestamp <= pair[1].timestamp));
    }

    #[test]
    fn search_and_sort_compose() {
        let notes = feed();
        let derived = derive_notes(&notes, "o", FilterOption::Oldest);
        assert_eq!(ids(&derived), vec![1, 2, 4]);
    }
}
