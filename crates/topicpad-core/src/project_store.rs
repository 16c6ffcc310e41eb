//! Front-end mirror of the backend workspace.
//!
//! Every mutation is forwarded to the backend and followed by a reload, so
//! the mirror only ever holds what the backend confirmed. Derived views
//! (active project, merged output, active topic and section) are computed
//! from the mirror on each read.

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::backend::{args, Args, Backend};
use crate::model::{
    display_platform, merged_output, ItemKind, Project, Refinement, Section, Topic, Workspace,
};
use crate::observable::{Observable, SubscriptionId};

/// The active topic together with the name of its section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveTopic {
    pub topic: Topic,
    pub section_name: String,
}

/// Holds the workspace mirror and the current selection.
pub struct ProjectStore<B> {
    backend: B,
    workspace: Observable<Option<Workspace>>,
    active_topic_id: Observable<Option<String>>,
    active_section_id: Observable<Option<String>>,
    platform: String,
}

impl<B> std::fmt::Debug for ProjectStore<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectStore")
            .field("loaded", &self.workspace.get().is_some())
            .field("active_topic_id", self.active_topic_id.get())
            .field("active_section_id", self.active_section_id.get())
            .field("platform", &self.platform)
            .finish()
    }
}

impl<B: Backend> ProjectStore<B> {
    /// Creates an empty store. Call [`load_workspace`](Self::load_workspace)
    /// to populate it.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            workspace: Observable::new(None),
            active_topic_id: Observable::new(None),
            active_section_id: Observable::new(None),
            platform: "unknown".to_string(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    // ── Views ──────────────────────────────────────────────────────────

    pub fn workspace(&self) -> Option<&Workspace> {
        self.workspace.get().as_ref()
    }

    pub fn active_project(&self) -> Option<&Project> {
        self.workspace().and_then(Workspace::active_project)
    }

    /// All topic contents of the active project as one text.
    pub fn merged_output(&self) -> String {
        merged_output(self.active_project())
    }

    pub fn active_topic_id(&self) -> Option<&str> {
        self.active_topic_id.get().as_deref()
    }

    pub fn active_section_id(&self) -> Option<&str> {
        self.active_section_id.get().as_deref()
    }

    pub fn active_topic(&self) -> Option<ActiveTopic> {
        let project = self.active_project()?;
        let topic_id = self.active_topic_id()?;
        project.sections.iter().find_map(|section| {
            section.topic(topic_id).map(|topic| ActiveTopic {
                topic: topic.clone(),
                section_name: section.name.clone(),
            })
        })
    }

    pub fn active_section(&self) -> Option<&Section> {
        let project = self.active_project()?;
        project.section(self.active_section_id()?)
    }

    /// Display name of the backend's platform, `"unknown"` until loaded.
    pub fn platform(&self) -> &str {
        &self.platform
    }

    // ── Selection ──────────────────────────────────────────────────────

    pub fn set_active_topic(&mut self, topic_id: Option<String>) {
        self.active_topic_id.set(topic_id);
    }

    pub fn set_active_section(&mut self, section_id: Option<String>) {
        self.active_section_id.set(section_id);
    }

    pub fn subscribe_workspace(
        &mut self,
        f: impl FnMut(&Option<Workspace>) + 'static,
    ) -> SubscriptionId {
        self.workspace.subscribe(f)
    }

    pub fn unsubscribe_workspace(&mut self, id: SubscriptionId) -> bool {
        self.workspace.unsubscribe(id)
    }

    pub fn subscribe_active_topic(
        &mut self,
        f: impl FnMut(&Option<String>) + 'static,
    ) -> SubscriptionId {
        self.active_topic_id.subscribe(f)
    }

    // ── Backend calls ──────────────────────────────────────────────────

    /// Replaces the mirror with the backend's workspace.
    pub fn load_workspace(&mut self) -> Result<()> {
        let workspace: Workspace = self.call("get_workspace", Args::new())?;
        self.workspace.set(Some(workspace));
        Ok(())
    }

    pub fn create_project(&mut self, name: &str) -> Result<Project> {
        self.mutate("create_project", args([("name", json!(name))]))
    }

    pub fn delete_project(&mut self, project_id: &str) -> Result<()> {
        self.mutate("delete_project", args([("projectId", json!(project_id))]))
    }

    /// Activates another project and clears the topic/section selection.
    pub fn switch_project(&mut self, project_id: &str) -> Result<Project> {
        let project = self.mutate("switch_project", args([("projectId", json!(project_id))]))?;
        self.active_section_id.set(None);
        self.active_topic_id.set(None);
        Ok(project)
    }

    pub fn rename_project(&mut self, project_id: &str, name: &str) -> Result<()> {
        self.mutate(
            "rename_project",
            args([("projectId", json!(project_id)), ("name", json!(name))]),
        )
    }

    pub fn create_section(&mut self, name: &str) -> Result<Section> {
        self.mutate("create_section", args([("name", json!(name))]))
    }

    pub fn update_section_name(&mut self, section_id: &str, name: &str) -> Result<()> {
        self.mutate(
            "update_section_name",
            args([("sectionId", json!(section_id)), ("name", json!(name))]),
        )
    }

    /// Deletes a section, clearing the selection if it pointed into it.
    pub fn delete_section(&mut self, section_id: &str) -> Result<()> {
        self.mutate::<()>("delete_section", args([("sectionId", json!(section_id))]))?;
        if self.active_section_id() == Some(section_id) {
            self.active_section_id.set(None);
            self.active_topic_id.set(None);
        }
        Ok(())
    }

    pub fn create_topic(&mut self, section_id: &str, name: &str) -> Result<Topic> {
        self.mutate(
            "create_topic",
            args([("sectionId", json!(section_id)), ("name", json!(name))]),
        )
    }

    pub fn update_topic_content(&mut self, topic_id: &str, content: &str) -> Result<()> {
        self.mutate(
            "update_topic_content",
            args([("topicId", json!(topic_id)), ("content", json!(content))]),
        )
    }

    pub fn update_topic_name(&mut self, topic_id: &str, name: &str) -> Result<()> {
        self.mutate(
            "update_topic_name",
            args([("topicId", json!(topic_id)), ("name", json!(name))]),
        )
    }

    /// Deletes a topic, clearing the active topic if it was this one.
    pub fn delete_topic(&mut self, topic_id: &str) -> Result<()> {
        self.mutate::<()>("delete_topic", args([("topicId", json!(topic_id))]))?;
        if self.active_topic_id() == Some(topic_id) {
            self.active_topic_id.set(None);
        }
        Ok(())
    }

    pub fn reorder_item(&mut self, kind: ItemKind, id: &str, new_index: usize) -> Result<()> {
        self.mutate(
            "reorder_item",
            args([
                ("itemType", json!(kind.as_str())),
                ("id", json!(id)),
                ("newIndex", json!(new_index)),
            ]),
        )
    }

    /// Merged output as rendered by the backend.
    pub fn fetch_merged_output(&self) -> Result<String> {
        self.call("get_merged_output", Args::new())
    }

    pub fn save_topic_refinement(&mut self, topic_id: &str, refinement: &Refinement) -> Result<()> {
        self.mutate(
            "save_topic_refinement",
            args([("topicId", json!(topic_id)), ("refinement", json!(refinement))]),
        )
    }

    pub fn save_section_refinement(
        &mut self,
        section_id: &str,
        refinement: &Refinement,
    ) -> Result<()> {
        self.mutate(
            "save_section_refinement",
            args([
                ("sectionId", json!(section_id)),
                ("refinement", json!(refinement)),
            ]),
        )
    }

    pub fn save_project_refinement(&mut self, refinement: &Refinement) -> Result<()> {
        self.mutate(
            "save_project_refinement",
            args([("refinement", json!(refinement))]),
        )
    }

    /// Asks the backend for its OS and stores the display name.
    ///
    /// Falls back to `"Unknown"` when the backend cannot answer.
    pub fn load_platform(&mut self) -> &str {
        self.platform = match self.call::<String>("get_platform", Args::new()) {
            Ok(os) => display_platform(&os),
            Err(_) => "Unknown".to_string(),
        };
        &self.platform
    }

    fn call<R: DeserializeOwned>(&self, command: &str, args: Args) -> Result<R> {
        self.backend.invoke_as(command, args).inspect_err(|e| {
            tracing::error!("Backend command {command} failed: {e:#}");
        })
    }

    /// Runs a mutating command, then refreshes the mirror.
    ///
    /// Only the command's own failure is returned. If the refresh fails the
    /// change has still happened, so the error is logged and the mirror stays
    /// stale until the next successful load.
    fn mutate<R: DeserializeOwned>(&mut self, command: &str, args: Args) -> Result<R> {
        let out = self.call(command, args)?;
        if let Err(e) = self.load_workspace() {
            tracing::warn!("Failed to reload workspace after {command}: {e:#}");
        }
        Ok(out)
    }
}
