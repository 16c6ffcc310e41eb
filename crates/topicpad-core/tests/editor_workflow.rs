// Integration tests for the editor binder over a live backend.
//
// These tests exercise full workflows spanning the ProjectStore,
// TopicEditor and LocalBackend together, including backend failures in the
// middle of an editing session.

use std::cell::Cell;

use anyhow::{bail, Result};
use serde_json::Value;
use topicpad_core::history::HistoryConfig;
use topicpad_core::{Args, Backend, LocalBackend, ProjectStore, TopicEditor, WorkspaceStore};

/// Backend that fails every mutating command while `offline` is set.
struct FlakyBackend {
    inner: LocalBackend,
    offline: Cell<bool>,
}

impl FlakyBackend {
    fn new() -> Self {
        Self {
            inner: LocalBackend::in_memory(),
            offline: Cell::new(false),
        }
    }
}

impl Backend for FlakyBackend {
    fn invoke(&self, command: &str, args: Args) -> Result<Value> {
        if self.offline.get() && !command.starts_with("get_") {
            bail!("backend unreachable");
        }
        self.inner.invoke(command, args)
    }
}

fn store_with_topic<B: Backend>(backend: B) -> (ProjectStore<B>, String, String) {
    let mut store = ProjectStore::new(backend);
    store.load_workspace().unwrap();
    let section = store.create_section("Notes").unwrap();
    let topic = store.create_topic(&section.id, "Draft").unwrap();
    (store, section.id, topic.id)
}

fn backend_content<B: Backend>(store: &ProjectStore<B>, topic_id: &str) -> String {
    store
        .active_project()
        .and_then(|p| p.topic(topic_id))
        .map(|t| t.content.clone())
        .unwrap()
}

// ── Full Workflow ──────────────────────────────────────────────────────

#[test]
fn test_type_undo_redo_round_trips_through_backend() {
    let (mut store, _, topic_id) = store_with_topic(LocalBackend::in_memory());
    let mut editor = TopicEditor::open(&store, &topic_id, HistoryConfig::default()).unwrap();
    assert_eq!(editor.content(), "");

    editor.set_content(&mut store, "Hello".to_string()).unwrap();
    editor
        .set_content(&mut store, "Hello, world".to_string())
        .unwrap();
    assert_eq!(backend_content(&store, &topic_id), "Hello, world");

    assert!(editor.undo(&mut store).unwrap());
    assert_eq!(editor.content(), "Hello");
    assert_eq!(backend_content(&store, &topic_id), "Hello");

    assert!(editor.undo(&mut store).unwrap());
    assert_eq!(backend_content(&store, &topic_id), "");

    assert!(editor.redo(&mut store).unwrap());
    assert_eq!(editor.content(), "Hello");
    assert!(editor.redo(&mut store).unwrap());
    assert_eq!(editor.content(), "Hello, world");
    assert_eq!(backend_content(&store, &topic_id), "Hello, world");
    assert!(!editor.redo(&mut store).unwrap());
}

#[test]
fn test_unchanged_content_is_not_recorded() {
    let (mut store, _, topic_id) = store_with_topic(LocalBackend::in_memory());
    let mut editor = TopicEditor::open(&store, &topic_id, HistoryConfig::default()).unwrap();

    editor.set_content(&mut store, "same".to_string()).unwrap();
    editor.set_content(&mut store, "same".to_string()).unwrap();
    assert_eq!(editor.session().history().past().len(), 2);
}

#[test]
fn test_failed_edit_is_not_pushed() {
    let (mut store, _, topic_id) = store_with_topic(FlakyBackend::new());
    let mut editor = TopicEditor::open(&store, &topic_id, HistoryConfig::default()).unwrap();
    editor.set_content(&mut store, "saved".to_string()).unwrap();

    store.backend().offline.set(true);
    let err = editor
        .set_content(&mut store, "lost".to_string())
        .unwrap_err();
    assert!(err.to_string().contains("unreachable"));

    assert_eq!(editor.content(), "saved");
    assert_eq!(editor.session().history().past().len(), 2);
    assert_eq!(backend_content(&store, &topic_id), "saved");
}

#[test]
fn test_failed_undo_keeps_history_in_sync() {
    let (mut store, _, topic_id) = store_with_topic(FlakyBackend::new());
    let mut editor = TopicEditor::open(&store, &topic_id, HistoryConfig::default()).unwrap();
    editor.set_content(&mut store, "one".to_string()).unwrap();
    editor.set_content(&mut store, "two".to_string()).unwrap();

    store.backend().offline.set(true);
    assert!(editor.undo(&mut store).is_err());
    assert_eq!(editor.content(), "two");
    assert!(!editor.session().can_redo());

    // Once the backend is back, the same undo goes through.
    store.backend().offline.set(false);
    assert!(editor.undo(&mut store).unwrap());
    assert_eq!(editor.content(), "one");
    assert_eq!(backend_content(&store, &topic_id), "one");
}

#[test]
fn test_undo_past_baseline_parks_it_for_redo() {
    let (mut store, _, topic_id) = store_with_topic(FlakyBackend::new());
    let mut editor = TopicEditor::open(&store, &topic_id, HistoryConfig::default()).unwrap();
    editor.set_content(&mut store, "b".to_string()).unwrap();

    assert!(editor.undo(&mut store).unwrap());
    assert_eq!(editor.content(), "");

    // No backend call is needed to park the baseline.
    store.backend().offline.set(true);
    assert!(!editor.undo(&mut store).unwrap());
    store.backend().offline.set(false);

    let history = editor.session().history();
    assert_eq!(editor.content(), "");
    assert!(history.past().is_empty());
    assert_eq!(history.future(), &["b".to_string(), String::new()]);
    assert!(!editor.session().can_undo());
    assert!(editor.session().can_redo());
    assert!(!editor.undo(&mut store).unwrap());

    assert!(editor.redo(&mut store).unwrap());
    assert_eq!(editor.content(), "");
    assert!(editor.redo(&mut store).unwrap());
    assert_eq!(editor.content(), "b");
    assert_eq!(backend_content(&store, &topic_id), "b");
}

#[test]
fn test_bounded_history_in_editor() {
    let (mut store, _, topic_id) = store_with_topic(LocalBackend::in_memory());
    let mut editor = TopicEditor::open(&store, &topic_id, HistoryConfig::new(3)).unwrap();

    for i in 1..=6 {
        editor.set_content(&mut store, format!("v{i}")).unwrap();
    }
    assert_eq!(
        editor.session().history().past(),
        &["v4".to_string(), "v5".to_string(), "v6".to_string()]
    );

    let mut steps = 0;
    while editor.undo(&mut store).unwrap() {
        steps += 1;
    }
    assert_eq!(steps, 2);
    assert_eq!(backend_content(&store, &topic_id), "v4");
}

#[test]
fn test_switch_topic_resets_history() {
    let (mut store, section_id, first_id) = store_with_topic(LocalBackend::in_memory());
    let second = store.create_topic(&section_id, "Second").unwrap();
    store
        .update_topic_content(&second.id, "second body")
        .unwrap();

    let mut editor = TopicEditor::open(&store, &first_id, HistoryConfig::default()).unwrap();
    editor.set_content(&mut store, "first body".to_string()).unwrap();
    assert!(editor.undo(&mut store).unwrap());
    assert!(editor.session().can_redo());

    editor.switch_topic(&store, &second.id).unwrap();
    assert_eq!(editor.topic_id(), second.id);
    assert_eq!(editor.content(), "second body");
    assert!(!editor.session().can_redo());
    assert!(!editor.redo(&mut store).unwrap());
}

#[test]
fn test_open_missing_topic_fails() {
    let (store, _, _) = store_with_topic(LocalBackend::in_memory());
    assert!(TopicEditor::open(&store, "missing", HistoryConfig::default()).is_err());
}

#[test]
fn test_edits_survive_backend_restart() {
    let dir = tempfile::tempdir().unwrap();

    let topic_id = {
        let backend = LocalBackend::open(WorkspaceStore::open_in(dir.path()).unwrap()).unwrap();
        let (mut store, _, topic_id) = store_with_topic(backend);
        let mut editor = TopicEditor::open(&store, &topic_id, HistoryConfig::default()).unwrap();
        editor.set_content(&mut store, "draft 1".to_string()).unwrap();
        editor.set_content(&mut store, "draft 2".to_string()).unwrap();
        editor.undo(&mut store).unwrap();
        topic_id
    };

    let backend = LocalBackend::open(WorkspaceStore::open_in(dir.path()).unwrap()).unwrap();
    let mut store = ProjectStore::new(backend);
    store.load_workspace().unwrap();
    assert_eq!(backend_content(&store, &topic_id), "draft 1");

    // History is per session: a reopened editor starts fresh.
    let editor = TopicEditor::open(&store, &topic_id, HistoryConfig::default()).unwrap();
    assert!(!editor.session().can_redo());
    assert_eq!(editor.session().history().past().len(), 1);
}
