/// In-process backend that owns the workspace.
///
/// Every mutation runs against a copy of the workspace. The copy replaces
/// the live workspace only after it has been persisted, so a failed command
/// leaves nothing half-applied.
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use serde_json::Value;

use super::store::WorkspaceStore;
use super::{arg, Args, Backend};
use crate::model::{merged_output, ItemKind, Project, Refinement, Section, Topic, Workspace};

/// Reference backend serving workspace commands from memory.
#[derive(Debug)]
pub struct LocalBackend {
    workspace: Mutex<Workspace>,
    /// Optional disk persistence (None = in-memory only).
    store: Option<WorkspaceStore>,
}

impl LocalBackend {
    /// Creates a backend with a fresh workspace and no persistence.
    pub fn in_memory() -> Self {
        Self::with_workspace(Workspace::new())
    }

    /// Creates an in-memory backend serving `workspace`.
    pub fn with_workspace(workspace: Workspace) -> Self {
        Self {
            workspace: Mutex::new(workspace),
            store: None,
        }
    }

    /// Loads the stored workspace, or creates and saves a fresh one.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or the fresh workspace
    /// cannot be written.
    pub fn open(store: WorkspaceStore) -> Result<Self> {
        let workspace = match store.load().context("Failed to load workspace")? {
            Some(ws) => ws,
            None => {
                tracing::info!("No stored workspace, creating a new one");
                let ws = Workspace::new();
                store.save(&ws).context("Failed to save new workspace")?;
                ws
            }
        };
        Ok(Self {
            workspace: Mutex::new(workspace),
            store: Some(store),
        })
    }

    /// Returns a copy of the live workspace.
    pub fn snapshot(&self) -> Result<Workspace> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Workspace>> {
        self.workspace
            .lock()
            .map_err(|_| anyhow!("Workspace lock poisoned"))
    }

    fn read<R: Serialize>(&self, f: impl FnOnce(&Workspace) -> Result<R>) -> Result<Value> {
        let guard = self.lock()?;
        let out = f(&guard)?;
        serde_json::to_value(out).context("Failed to encode command result")
    }

    fn mutate<R: Serialize>(&self, f: impl FnOnce(&mut Workspace) -> Result<R>) -> Result<Value> {
        let mut guard = self.lock()?;
        let mut next = guard.clone();
        let out = f(&mut next)?;
        next.touch();

        if let Some(store) = &self.store {
            store.save(&next).context("Failed to save workspace")?;
        }
        *guard = next;
        serde_json::to_value(out).context("Failed to encode command result")
    }
}

fn section_mut<'a>(project: &'a mut Project, section_id: &str) -> Result<&'a mut Section> {
    project
        .section_mut(section_id)
        .ok_or_else(|| anyhow!("Section with id {section_id} not found"))
}

fn topic_mut<'a>(project: &'a mut Project, topic_id: &str) -> Result<&'a mut Topic> {
    project
        .topic_mut(topic_id)
        .ok_or_else(|| anyhow!("Topic with id {topic_id} not found"))
}

impl Backend for LocalBackend {
    fn invoke(&self, command: &str, args: Args) -> Result<Value> {
        tracing::debug!(command, "Handling backend command");

        match command {
            "get_platform" => Ok(Value::from(std::env::consts::OS)),
            "get_workspace" => self.read(|ws| Ok(ws.clone())),
            "get_project" => self.read(|ws| ws.active_project().cloned().context("No active project")),
            "get_merged_output" => self.read(|ws| Ok(merged_output(ws.active_project()))),

            "create_project" => {
                let name: String = arg(&args, "name")?;
                self.mutate(|ws| {
                    let project = Project::new(name);
                    ws.add_project(project.clone());
                    Ok(project)
                })
            }
            "delete_project" => {
                let project_id: String = arg(&args, "projectId")?;
                self.mutate(|ws| ws.remove_project(&project_id))
            }
            "switch_project" => {
                let project_id: String = arg(&args, "projectId")?;
                self.mutate(|ws| ws.switch_project(&project_id).cloned())
            }
            "rename_project" => {
                let project_id: String = arg(&args, "projectId")?;
                let name: String = arg(&args, "name")?;
                self.mutate(|ws| {
                    let project = ws
                        .project_mut(&project_id)
                        .ok_or_else(|| anyhow!("Project with id {project_id} not found"))?;
                    project.name = name;
                    project.touch();
                    Ok(())
                })
            }

            "create_section" => {
                let name: String = arg(&args, "name")?;
                self.mutate(|ws| {
                    let project = ws.active_project_mut()?;
                    project.add_section(Section::new(name));
                    project
                        .sections
                        .last()
                        .cloned()
                        .context("Section missing after insert")
                })
            }
            "update_section_name" => {
                let section_id: String = arg(&args, "sectionId")?;
                let name: String = arg(&args, "name")?;
                self.mutate(|ws| {
                    let project = ws.active_project_mut()?;
                    section_mut(project, &section_id)?.name = name;
                    project.touch();
                    Ok(())
                })
            }
            "delete_section" => {
                let section_id: String = arg(&args, "sectionId")?;
                self.mutate(|ws| ws.active_project_mut()?.remove_section(&section_id))
            }

            "create_topic" => {
                let section_id: String = arg(&args, "sectionId")?;
                let name: String = arg(&args, "name")?;
                self.mutate(|ws| {
                    let project = ws.active_project_mut()?;
                    let section = section_mut(project, &section_id)?;
                    section.add_topic(Topic::new(name, String::new(), section_id.clone()));
                    let topic = section
                        .topics
                        .last()
                        .cloned()
                        .context("Topic missing after insert")?;
                    project.touch();
                    Ok(topic)
                })
            }
            "update_topic_content" => {
                let topic_id: String = arg(&args, "topicId")?;
                let content: String = arg(&args, "content")?;
                self.mutate(|ws| {
                    let project = ws.active_project_mut()?;
                    topic_mut(project, &topic_id)?.content = content;
                    project.touch();
                    Ok(())
                })
            }
            "update_topic_name" => {
                let topic_id: String = arg(&args, "topicId")?;
                let name: String = arg(&args, "name")?;
                self.mutate(|ws| {
                    let project = ws.active_project_mut()?;
                    topic_mut(project, &topic_id)?.name = name;
                    project.touch();
                    Ok(())
                })
            }
            "delete_topic" => {
                let topic_id: String = arg(&args, "topicId")?;
                self.mutate(|ws| ws.active_project_mut()?.remove_topic(&topic_id))
            }
            "reorder_item" => {
                let item_type: String = arg(&args, "itemType")?;
                let kind: ItemKind = item_type.parse()?;
                let id: String = arg(&args, "id")?;
                let new_index: usize = arg(&args, "newIndex")?;
                self.mutate(|ws| ws.active_project_mut()?.reorder_item(kind, &id, new_index))
            }

            "save_topic_refinement" => {
                let topic_id: String = arg(&args, "topicId")?;
                let refinement: Refinement = arg(&args, "refinement")?;
                self.mutate(|ws| {
                    let project = ws.active_project_mut()?;
                    topic_mut(project, &topic_id)?.history.push(refinement);
                    project.touch();
                    Ok(())
                })
            }
            "save_section_refinement" => {
                let section_id: String = arg(&args, "sectionId")?;
                let refinement: Refinement = arg(&args, "refinement")?;
                self.mutate(|ws| {
                    let project = ws.active_project_mut()?;
                    section_mut(project, &section_id)?.history.push(refinement);
                    project.touch();
                    Ok(())
                })
            }
            "save_project_refinement" => {
                let refinement: Refinement = arg(&args, "refinement")?;
                self.mutate(|ws| {
                    let project = ws.active_project_mut()?;
                    project.history.push(refinement);
                    project.touch();
                    Ok(())
                })
            }

            other => bail!("Unknown command: {other}"),
        }
    }
}
