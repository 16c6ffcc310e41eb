//! Configuration for the history system.

/// Number of snapshots kept in the undo log when nothing else is configured.
pub const DEFAULT_MAX_HISTORY: usize = 50;

/// Configuration for an `UndoHistory`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Max snapshots kept in the past log. Oldest are evicted first.
    pub max_history: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
        }
    }
}

impl HistoryConfig {
    /// Creates a config with the given bound, clamped to at least one snapshot.
    pub fn new(max_history: usize) -> Self {
        Self {
            max_history: max_history.max(1),
        }
    }
}
