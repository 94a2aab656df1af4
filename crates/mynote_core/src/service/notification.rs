//! Save notification mailbox shown by the presentation layer.
//!
//! Single slot: a newer notification replaces an older one, and clearing
//! returns the slot to `None`.

use serde::{Deserialize, Serialize};

/// Kind of the most recent save signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveNotification {
    /// Nothing to show.
    #[default]
    None,
    /// Saved on exit because auto-save is enabled.
    Auto,
    /// Saved by the explicit save action.
    Manual,
    /// A save attempt failed.
    Failed,
}

impl SaveNotification {
    pub fn is_visible(self) -> bool {
        self != Self::None
    }
}

#[cfg(test)]
mod tests {
    use super::SaveNotification;

    #[test]
    fn only_none_is_hidden() {
        assert!(!SaveNotification::None.is_visible());
        assert!(SaveNotification::Auto.is_visible());
        assert!(SaveNotification::Manual.is_visible());
        assert!(SaveNotification::Failed.is_visible());
    }
}
