//! Outline data model: workspace, projects, sections and topics.
//!
//! These types mirror what the backend holds. All of them derive
//! `PartialEq`, so any of them can serve as an undo snapshot.

use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name given to the project a fresh workspace starts with.
pub const DEFAULT_PROJECT_NAME: &str = "My Project";

/// Current time as an RFC 3339 string.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// One recorded rewrite of a piece of content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refinement {
    pub id: String,
    pub original_content: String,
    pub refined_content: String,
    pub timestamp: String,
}

impl Refinement {
    pub fn new(original_content: String, refined_content: String) -> Self {
        Self {
            id: new_id(),
            original_content,
            refined_content,
            timestamp: now_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub name: String,
    pub content: String,
    pub order_index: usize,
    pub section_id: String,
    #[serde(default)]
    pub history: Vec<Refinement>,
}

impl Topic {
    pub fn new(name: String, content: String, section_id: String) -> Self {
        Self {
            id: new_id(),
            name,
            content,
            order_index: 0,
            section_id,
            history: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub name: String,
    pub order_index: usize,
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub history: Vec<Refinement>,
}

impl Section {
    pub fn new(name: String) -> Self {
        Self {
            id: new_id(),
            name,
            order_index: 0,
            topics: Vec::new(),
            history: Vec::new(),
        }
    }

    /// Appends a topic, taking ownership of its position and parent link.
    pub fn add_topic(&mut self, mut topic: Topic) {
        topic.order_index = self.topics.len();
        topic.section_id = self.id.clone();
        self.topics.push(topic);
    }

    /// Removes a topic and re-indexes the remaining ones.
    pub fn remove_topic(&mut self, topic_id: &str) -> Result<()> {
        let index = self
            .topics
            .iter()
            .position(|t| t.id == topic_id)
            .ok_or_else(|| anyhow!("Topic with id {topic_id} not found"))?;
        self.topics.remove(index);
        self.reindex_topics();
        Ok(())
    }

    pub fn topic(&self, topic_id: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id == topic_id)
    }

    pub fn topic_mut(&mut self, topic_id: &str) -> Option<&mut Topic> {
        self.topics.iter_mut().find(|t| t.id == topic_id)
    }

    /// Moves a topic to `new_index` (see [`move_item`] for index semantics).
    pub fn reorder_topic(&mut self, topic_id: &str, new_index: usize) -> Result<()> {
        let current = self
            .topics
            .iter()
            .position(|t| t.id == topic_id)
            .ok_or_else(|| anyhow!("Topic with id {topic_id} not found"))?;
        if move_item(&mut self.topics, current, new_index) {
            self.reindex_topics();
        }
        Ok(())
    }

    fn reindex_topics(&mut self) {
        for (index, topic) in self.topics.iter_mut().enumerate() {
            topic.order_index = index;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub sections: Vec<Section>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub history: Vec<Refinement>,
}

impl Project {
    pub fn new(name: String) -> Self {
        let now = now_rfc3339();
        Self {
            id: new_id(),
            name,
            sections: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
            history: Vec::new(),
        }
    }

    /// Marks the project as modified now.
    pub fn touch(&mut self) {
        self.updated_at = now_rfc3339();
    }

    pub fn add_section(&mut self, mut section: Section) {
        section.order_index = self.sections.len();
        self.sections.push(section);
        self.touch();
    }

    /// Removes a section and re-indexes the remaining ones.
    pub fn remove_section(&mut self, section_id: &str) -> Result<()> {
        let index = self
            .sections
            .iter()
            .position(|s| s.id == section_id)
            .ok_or_else(|| anyhow!("Section with id {section_id} not found"))?;
        self.sections.remove(index);
        self.reindex_sections();
        self.touch();
        Ok(())
    }

    pub fn section(&self, section_id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == section_id)
    }

    pub fn section_mut(&mut self, section_id: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.id == section_id)
    }

    pub fn topic(&self, topic_id: &str) -> Option<&Topic> {
        self.sections.iter().find_map(|s| s.topic(topic_id))
    }

    pub fn topic_mut(&mut self, topic_id: &str) -> Option<&mut Topic> {
        self.sections.iter_mut().find_map(|s| s.topic_mut(topic_id))
    }

    /// Removes a topic from whichever section holds it.
    pub fn remove_topic(&mut self, topic_id: &str) -> Result<()> {
        let section = self
            .sections
            .iter_mut()
            .find(|s| s.topic(topic_id).is_some())
            .ok_or_else(|| anyhow!("Topic with id {topic_id} not found"))?;
        section.remove_topic(topic_id)?;
        self.touch();
        Ok(())
    }

    /// Moves a section, or a topic within its section, to `new_index`.
    pub fn reorder_item(&mut self, kind: ItemKind, id: &str, new_index: usize) -> Result<()> {
        match kind {
            ItemKind::Section => {
                let current = self
                    .sections
                    .iter()
                    .position(|s| s.id == id)
                    .ok_or_else(|| anyhow!("Section not found"))?;
                if !move_item(&mut self.sections, current, new_index) {
                    return Ok(());
                }
                self.reindex_sections();
            }
            ItemKind::Topic => {
                let section = self
                    .sections
                    .iter_mut()
                    .find(|s| s.topic(id).is_some())
                    .ok_or_else(|| anyhow!("Topic not found in any section"))?;
                section.reorder_topic(id, new_index)?;
            }
        }
        self.touch();
        Ok(())
    }

    /// Renders the project as a single text: see [`merged_output`].
    pub fn merged_output(&self) -> String {
        merged_output(Some(self))
    }

    fn reindex_sections(&mut self) {
        for (index, section) in self.sections.iter_mut().enumerate() {
            section.order_index = index;
        }
    }
}

/// Which kind of outline item a reorder targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Section,
    Topic,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Section => "section",
            ItemKind::Topic => "topic",
        }
    }
}

impl FromStr for ItemKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "section" => Ok(ItemKind::Section),
            "topic" => Ok(ItemKind::Topic),
            other => bail!("Invalid item type: {other}"),
        }
    }
}

/// All projects plus which one is being edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub projects: Vec<Project>,
    pub active_project_id: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    /// Creates a workspace holding one empty, active project.
    pub fn new() -> Self {
        let project = Project::new(DEFAULT_PROJECT_NAME.to_string());
        let now = now_rfc3339();
        Self {
            active_project_id: project.id.clone(),
            projects: vec![project],
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = now_rfc3339();
    }

    pub fn project(&self, project_id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == project_id)
    }

    pub fn project_mut(&mut self, project_id: &str) -> Option<&mut Project> {
        self.projects.iter_mut().find(|p| p.id == project_id)
    }

    pub fn active_project(&self) -> Option<&Project> {
        self.project(&self.active_project_id)
    }

    /// The active project, or an error if the active id dangles.
    pub fn active_project_mut(&mut self) -> Result<&mut Project> {
        let id = self.active_project_id.clone();
        self.project_mut(&id)
            .with_context(|| format!("Active project {id} not found"))
    }

    pub fn add_project(&mut self, project: Project) {
        self.projects.push(project);
        self.touch();
    }

    /// Removes a project. The last remaining project cannot be removed.
    ///
    /// If the active project is removed, the first remaining one becomes active.
    pub fn remove_project(&mut self, project_id: &str) -> Result<()> {
        let index = self
            .projects
            .iter()
            .position(|p| p.id == project_id)
            .ok_or_else(|| anyhow!("Project with id {project_id} not found"))?;
        if self.projects.len() == 1 {
            bail!("Cannot delete the only project in the workspace");
        }
        self.projects.remove(index);
        if self.active_project_id == project_id {
            self.active_project_id = self.projects[0].id.clone();
        }
        self.touch();
        Ok(())
    }

    /// Makes `project_id` the active project and returns it.
    pub fn switch_project(&mut self, project_id: &str) -> Result<&Project> {
        if self.project(project_id).is_none() {
            bail!("Project with id {project_id} not found");
        }
        self.active_project_id = project_id.to_string();
        self.touch();
        self.active_project()
            .context("Active project vanished after switch")
    }
}

/// Moves `items[current]` so it lands before the element originally at
/// `new_index`. Returns `false` when nothing moved.
///
/// Indices past the end move the item to the end.
fn move_item<T>(items: &mut Vec<T>, current: usize, new_index: usize) -> bool {
    if current == new_index {
        return false;
    }
    let item = items.remove(current);
    let target = if new_index > current {
        new_index - 1
    } else {
        new_index
    };
    let target = target.min(items.len());
    items.insert(target, item);
    true
}

/// Renders a project as one text block.
///
/// Sections and topics are taken in `order_index` order. Topic contents are
/// trimmed and empty ones skipped. Each section renders as
/// `// Section: {name}` followed by its topics separated by blank lines;
/// sections are separated by `---` rules.
pub fn merged_output(project: Option<&Project>) -> String {
    let Some(project) = project else {
        return String::new();
    };

    let mut sections: Vec<&Section> = project.sections.iter().collect();
    sections.sort_by_key(|s| s.order_index);

    sections
        .iter()
        .map(|section| {
            let mut topics: Vec<&Topic> = section.topics.iter().collect();
            topics.sort_by_key(|t| t.order_index);
            let body = topics
                .iter()
                .map(|t| t.content.trim())
                .filter(|c| !c.is_empty())
                .collect::<Vec<&str>>()
                .join("\n\n");
            format!("// Section: {}\n{}", section.name, body)
        })
        .collect::<Vec<String>>()
        .join("\n\n---\n\n")
}

/// Formats a raw OS identifier for display.
pub fn display_platform(os: &str) -> String {
    match os {
        "linux" => "Linux".to_string(),
        "windows" => "Windows".to_string(),
        "macos" => "macOS".to_string(),
        "" => "Unknown".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => "Unknown".to_string(),
            }
        }
    }
}
