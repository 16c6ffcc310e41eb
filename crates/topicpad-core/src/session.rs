//! Editor state binders.
//!
//! An `EditorSession` owns the current state of one editable unit and routes
//! every edit, undo and redo through an `UndoHistory`. The `try_*` variants
//! run a commit step (typically a backend call) before anything changes
//! locally, so a failed commit leaves both state and history untouched.

use anyhow::{anyhow, Result};

use crate::backend::Backend;
use crate::history::{HistoryConfig, UndoHistory};
use crate::observable::{Observable, SubscriptionId};
use crate::project_store::ProjectStore;

/// Current state plus its undo/redo history.
pub struct EditorSession<T> {
    current: Observable<T>,
    history: UndoHistory<T>,
}

impl<T: std::fmt::Debug> std::fmt::Debug for EditorSession<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("current", self.current.get())
            .field("history", &self.history)
            .finish()
    }
}

impl<T: Clone + PartialEq> EditorSession<T> {
    /// Starts a session at `baseline`, recorded as the oldest snapshot.
    pub fn new(baseline: T, config: HistoryConfig) -> Self {
        let mut history = UndoHistory::with_config(config);
        history.push(baseline.clone());
        Self {
            current: Observable::new(baseline),
            history,
        }
    }

    pub fn current(&self) -> &T {
        self.current.get()
    }

    pub fn history(&self) -> &UndoHistory<T> {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn subscribe(&mut self, f: impl FnMut(&T) + 'static) -> SubscriptionId {
        self.current.subscribe(f)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.current.unsubscribe(id)
    }

    /// Records `next` and makes it the current state.
    pub fn edit(&mut self, next: T) {
        self.history.push(next.clone());
        self.current.set(next);
    }

    /// Computes the next state from the current one, then records it.
    pub fn edit_with(&mut self, f: impl FnOnce(&T) -> T) {
        let next = f(self.current.get());
        self.edit(next);
    }

    /// Steps back. Returns `false` and leaves the state alone when there is
    /// nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.undo(self.current.get()) {
            Some(prev) => {
                self.current.set(prev);
                true
            }
            None => {
                tracing::debug!("Nothing to undo");
                false
            }
        }
    }

    /// Steps forward. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.history.redo(self.current.get()) {
            Some(next) => {
                self.current.set(next);
                true
            }
            None => {
                tracing::debug!("Nothing to redo");
                false
            }
        }
    }

    /// Drops all history and starts over at `baseline`.
    ///
    /// Used when the session switches to a different document.
    pub fn reset(&mut self, baseline: T) {
        self.history.clear();
        self.history.push(baseline.clone());
        self.current.set(baseline);
    }

    /// Commits `next`, then records it. Nothing changes if `commit` fails.
    pub fn try_edit(&mut self, next: T, commit: impl FnOnce(&T) -> Result<()>) -> Result<()> {
        commit(&next)?;
        self.edit(next);
        Ok(())
    }

    /// Like [`undo`](Self::undo), but the target state is committed first.
    ///
    /// Returns `Ok(false)` if there is nothing to undo. If `commit` fails
    /// the error is returned and state and history are unchanged.
    pub fn try_undo(&mut self, commit: impl FnOnce(&T) -> Result<()>) -> Result<bool> {
        self.try_step(|history, current| history.undo(current), commit)
    }

    /// Like [`redo`](Self::redo), but the target state is committed first.
    pub fn try_redo(&mut self, commit: impl FnOnce(&T) -> Result<()>) -> Result<bool> {
        self.try_step(|history, current| history.redo(current), commit)
    }

    /// Runs `step` on a copy of the history and keeps the copy only once
    /// `commit` accepts the target. The copy costs one clone of every stored
    /// snapshot per call.
    ///
    /// A step that yields no target may still have moved the baseline onto
    /// the redo stack. That move is kept without calling `commit`, since the
    /// current state does not change.
    fn try_step(
        &mut self,
        step: impl FnOnce(&mut UndoHistory<T>, &T) -> Option<T>,
        commit: impl FnOnce(&T) -> Result<()>,
    ) -> Result<bool> {
        let mut staged = self.history.clone();
        let Some(target) = step(&mut staged, self.current.get()) else {
            self.history = staged;
            return Ok(false);
        };
        commit(&target)?;
        self.history = staged;
        self.current.set(target);
        Ok(true)
    }
}

/// Binds one topic's content to an editor session and the backend.
#[derive(Debug)]
pub struct TopicEditor {
    topic_id: String,
    session: EditorSession<String>,
}

impl TopicEditor {
    /// Opens the topic `topic_id` of the active project, using its current
    /// content as the baseline.
    pub fn open<B: Backend>(
        store: &ProjectStore<B>,
        topic_id: &str,
        config: HistoryConfig,
    ) -> Result<Self> {
        let content = topic_content(store, topic_id)?;
        Ok(Self {
            topic_id: topic_id.to_string(),
            session: EditorSession::new(content, config),
        })
    }

    pub fn topic_id(&self) -> &str {
        &self.topic_id
    }

    pub fn content(&self) -> &str {
        self.session.current()
    }

    pub fn session(&self) -> &EditorSession<String> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut EditorSession<String> {
        &mut self.session
    }

    /// Sends new content to the backend and records it on success.
    ///
    /// Unchanged content is neither sent nor recorded.
    pub fn set_content<B: Backend>(
        &mut self,
        store: &mut ProjectStore<B>,
        content: String,
    ) -> Result<()> {
        if content == *self.session.current() {
            return Ok(());
        }
        let topic_id = &self.topic_id;
        self.session
            .try_edit(content, |c| store.update_topic_content(topic_id, c))
    }

    /// Undoes the last content change, locally and on the backend.
    pub fn undo<B: Backend>(&mut self, store: &mut ProjectStore<B>) -> Result<bool> {
        let topic_id = &self.topic_id;
        self.session
            .try_undo(|c| store.update_topic_content(topic_id, c))
    }

    /// Redoes the last undone content change, locally and on the backend.
    pub fn redo<B: Backend>(&mut self, store: &mut ProjectStore<B>) -> Result<bool> {
        let topic_id = &self.topic_id;
        self.session
            .try_redo(|c| store.update_topic_content(topic_id, c))
    }

    /// Points the editor at another topic, discarding the old history.
    pub fn switch_topic<B: Backend>(&mut self, store: &ProjectStore<B>, topic_id: &str) -> Result<()> {
        let content = topic_content(store, topic_id)?;
        self.topic_id = topic_id.to_string();
        self.session.reset(content);
        Ok(())
    }
}

fn topic_content<B: Backend>(store: &ProjectStore<B>, topic_id: &str) -> Result<String> {
    store
        .active_project()
        .and_then(|p| p.topic(topic_id))
        .map(|t| t.content.clone())
        .ok_or_else(|| anyhow!("Topic with id {topic_id} not found in the active project"))
}
