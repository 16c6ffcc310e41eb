/// Core snapshot undo/redo history.
///
/// The history stores complete snapshots, not edit operations. The caller
/// owns the current state and passes it in on every undo/redo; the history
/// only tracks what lies before and after it.
use crate::config::HistoryConfig;
use crate::equality::{PartialEqSnapshots, SnapshotEq};

/// Bounded linear undo/redo log for one editable unit of state.
///
/// `past` is ordered oldest first and its last element is the tip.
/// `future` is a stack: the most recently undone snapshot is on top.
/// Pushing a new snapshot always discards `future`.
#[derive(Clone)]
pub struct UndoHistory<T, E = PartialEqSnapshots> {
    /// Snapshots up to and including the one being viewed, oldest first.
    past: Vec<T>,
    /// Snapshots available for redo, most recently undone last.
    future: Vec<T>,
    config: HistoryConfig,
    eq: E,
}

impl<T, E> std::fmt::Debug for UndoHistory<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UndoHistory")
            .field("past_len", &self.past.len())
            .field("future_len", &self.future.len())
            .field("max_history", &self.config.max_history)
            .finish()
    }
}

impl<T: Clone + PartialEq> Default for UndoHistory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + PartialEq> UndoHistory<T> {
    /// Creates an empty history with the default bound of 50 snapshots.
    pub fn new() -> Self {
        Self::with_config(HistoryConfig::default())
    }

    /// Creates an empty history that compares snapshots with `PartialEq`.
    pub fn with_config(config: HistoryConfig) -> Self {
        Self::with_equality(config, PartialEqSnapshots)
    }
}

impl<T: Clone, E: SnapshotEq<T>> UndoHistory<T, E> {
    /// Creates an empty history with an injected equality.
    ///
    /// Use this when `T` has no meaningful `PartialEq`, or when equality
    /// should be judged on a serialized form.
    pub fn with_equality(config: HistoryConfig, eq: E) -> Self {
        Self {
            past: Vec::new(),
            future: Vec::new(),
            config: HistoryConfig::new(config.max_history),
            eq,
        }
    }

    /// Records a new snapshot.
    ///
    /// No-op if `state` equals the current tip. Otherwise appends it,
    /// evicts the oldest snapshot when the bound is exceeded, and clears
    /// the redo stack.
    pub fn push(&mut self, state: T) {
        if let Some(tip) = self.past.last() {
            if self.eq.snapshots_eq(tip, &state) {
                tracing::trace!("Skipping duplicate snapshot");
                return;
            }
        }

        self.past.push(state);
        if self.past.len() > self.config.max_history {
            let excess = self.past.len() - self.config.max_history;
            self.past.drain(..excess);
            tracing::trace!(excess, "Evicted oldest snapshots");
        }
        self.future.clear();
    }

    /// Steps back one snapshot.
    ///
    /// If the tip equals `current`, the tip is moved onto the redo stack
    /// first. Then the new tip is returned without removing it. Returns
    /// `None` when there is no earlier snapshot to go to.
    ///
    /// When the tip does not equal `current`, nothing is moved and the tip
    /// itself is returned: the caller has drifted off the log and is brought
    /// back to the most recent recorded state.
    pub fn undo(&mut self, current: &T) -> Option<T> {
        let on_tip = self
            .past
            .last()
            .is_some_and(|tip| self.eq.snapshots_eq(tip, current));

        if on_tip {
            if let Some(tip) = self.past.pop() {
                self.future.push(tip);
            }
        }

        self.past.last().cloned()
    }

    /// Steps forward to the most recently undone snapshot.
    ///
    /// The snapshot becomes the new tip of `past` and is returned. Returns
    /// `None` if the redo stack is empty.
    ///
    /// `_current` is not consulted. It is accepted so callers can treat
    /// undo and redo uniformly.
    pub fn redo(&mut self, _current: &T) -> Option<T> {
        let next = self.future.pop()?;
        self.past.push(next.clone());
        Some(next)
    }

    /// Drops all recorded snapshots in both directions.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    /// Whether there is any recorded snapshot to undo against.
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// Whether redo is available.
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Recorded snapshots, oldest first.
    pub fn past(&self) -> &[T] {
        &self.past
    }

    /// Redo stack, most recently undone last.
    pub fn future(&self) -> &[T] {
        &self.future
    }

    pub fn max_history(&self) -> usize {
        self.config.max_history
    }
}
