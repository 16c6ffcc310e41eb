//! Subcommands of the topicpad CLI.
//!
//! Each command goes through the `ProjectStore`, so the CLI exercises the
//! same mirror/backend path an interactive front-end would. Commands return
//! the text to print instead of printing it themselves.

use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};
use topicpad_config::AppConfig;
use topicpad_core::history::history_config;
use topicpad_core::{Backend, ItemKind, Project, ProjectStore, TopicEditor};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the active project as a tree.
    Show,
    /// List all projects, marking the active one.
    Projects,
    /// Print the merged output of the active project.
    Merged,
    /// Print the platform the backend runs on.
    Platform,
    /// Create a new project.
    NewProject { name: String },
    /// Make another project active.
    Switch { project_id: String },
    /// Rename a project.
    RenameProject { project_id: String, name: String },
    /// Delete a project. The last one cannot be deleted.
    DeleteProject { project_id: String },
    /// Add a section to the active project.
    AddSection { name: String },
    /// Rename a section of the active project.
    RenameSection { section_id: String, name: String },
    /// Delete a section and all of its topics.
    DeleteSection { section_id: String },
    /// Add a topic to a section of the active project.
    AddTopic { section_id: String, name: String },
    /// Replace a topic's content with each value in turn, then undo.
    SetContent {
        topic_id: String,
        /// Successive versions of the content.
        #[arg(required = true)]
        contents: Vec<String>,
        /// Number of undo steps to apply afterwards.
        #[arg(long, default_value_t = 0)]
        undo: usize,
    },
    /// Rename a topic.
    RenameTopic { topic_id: String, name: String },
    /// Delete a topic.
    DeleteTopic { topic_id: String },
    /// Move a section or topic to a new position.
    Move {
        kind: KindArg,
        id: String,
        index: usize,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindArg {
    Section,
    Topic,
}

impl From<KindArg> for ItemKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Section => ItemKind::Section,
            KindArg::Topic => ItemKind::Topic,
        }
    }
}

/// Runs `command` against `store` and returns the text to print.
pub fn run<B: Backend>(
    command: Command,
    store: &mut ProjectStore<B>,
    config: &AppConfig,
) -> Result<String> {
    match command {
        Command::Show => Ok(store.active_project().map(render_tree).unwrap_or_default()),
        Command::Projects => Ok(render_projects(store)),
        Command::Merged => Ok(store.merged_output()),
        Command::Platform => Ok(store.load_platform().to_string()),
        Command::NewProject { name } => {
            let project = store.create_project(&name)?;
            Ok(project.id)
        }
        Command::Switch { project_id } => {
            let project = store.switch_project(&project_id)?;
            Ok(format!("Switched to {}", project.name))
        }
        Command::RenameProject { project_id, name } => {
            store.rename_project(&project_id, &name)?;
            Ok(String::new())
        }
        Command::DeleteProject { project_id } => {
            store.delete_project(&project_id)?;
            Ok(String::new())
        }
        Command::AddSection { name } => Ok(store.create_section(&name)?.id),
        Command::RenameSection { section_id, name } => {
            store.update_section_name(&section_id, &name)?;
            Ok(String::new())
        }
        Command::DeleteSection { section_id } => {
            store.delete_section(&section_id)?;
            Ok(String::new())
        }
        Command::AddTopic { section_id, name } => Ok(store.create_topic(&section_id, &name)?.id),
        Command::SetContent {
            topic_id,
            contents,
            undo,
        } => set_content(store, config, &topic_id, contents, undo),
        Command::RenameTopic { topic_id, name } => {
            store.update_topic_name(&topic_id, &name)?;
            Ok(String::new())
        }
        Command::DeleteTopic { topic_id } => {
            store.delete_topic(&topic_id)?;
            Ok(String::new())
        }
        Command::Move { kind, id, index } => {
            store.reorder_item(kind.into(), &id, index)?;
            Ok(String::new())
        }
    }
}

fn set_content<B: Backend>(
    store: &mut ProjectStore<B>,
    config: &AppConfig,
    topic_id: &str,
    contents: Vec<String>,
    undo: usize,
) -> Result<String> {
    let mut editor = TopicEditor::open(store, topic_id, history_config(config))?;
    for content in contents {
        editor.set_content(store, content)?;
    }
    for step in 0..undo {
        let moved = editor
            .undo(store)
            .with_context(|| format!("Undo step {} failed", step + 1))?;
        if !moved {
            tracing::info!("Nothing left to undo after {step} steps");
            break;
        }
    }
    Ok(editor.content().to_string())
}

/// Renders a project as an indented tree with ids.
pub fn render_tree(project: &Project) -> String {
    let mut out = format!("{} [{}]", project.name, project.id);
    let mut sections: Vec<_> = project.sections.iter().collect();
    sections.sort_by_key(|s| s.order_index);
    for section in sections {
        out.push_str(&format!("\n  {} [{}]", section.name, section.id));
        let mut topics: Vec<_> = section.topics.iter().collect();
        topics.sort_by_key(|t| t.order_index);
        for topic in topics {
            out.push_str(&format!("\n    {} [{}]", topic.name, topic.id));
        }
    }
    out
}

fn render_projects<B: Backend>(store: &ProjectStore<B>) -> String {
    let Some(ws) = store.workspace() else {
        return String::new();
    };
    ws.projects
        .iter()
        .map(|p| {
            let marker = if p.id == ws.active_project_id { '*' } else { ' ' };
            format!("{marker} {} [{}]", p.name, p.id)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use topicpad_core::LocalBackend;

    use super::*;

    fn store() -> ProjectStore<LocalBackend> {
        let mut store = ProjectStore::new(LocalBackend::in_memory());
        store.load_workspace().expect("load");
        store
    }

    fn run_ok(store: &mut ProjectStore<LocalBackend>, command: Command) -> String {
        run(command, store, &AppConfig::default()).expect("run")
    }

    #[test]
    fn test_add_section_and_show() {
        let mut store = store();
        let section_id = run_ok(
            &mut store,
            Command::AddSection {
                name: "Intro".to_string(),
            },
        );
        run_ok(
            &mut store,
            Command::AddTopic {
                section_id: section_id.clone(),
                name: "Goals".to_string(),
            },
        );

        let tree = run_ok(&mut store, Command::Show);
        let lines: Vec<&str> = tree.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("My Project ["));
        assert_eq!(lines[1], format!("  Intro [{section_id}]"));
        assert!(lines[2].starts_with("    Goals ["));
    }

    #[test]
    fn test_set_content_with_undo() {
        let mut store = store();
        let section_id = run_ok(
            &mut store,
            Command::AddSection {
                name: "S".to_string(),
            },
        );
        let topic_id = run_ok(
            &mut store,
            Command::AddTopic {
                section_id,
                name: "T".to_string(),
            },
        );

        let out = run_ok(
            &mut store,
            Command::SetContent {
                topic_id,
                contents: vec!["one".to_string(), "two".to_string(), "three".to_string()],
                undo: 1,
            },
        );
        assert_eq!(out, "two");
        assert_eq!(run_ok(&mut store, Command::Merged), "// Section: S\ntwo");
    }

    #[test]
    fn test_set_content_undo_stops_at_baseline() {
        let mut store = store();
        let section_id = run_ok(
            &mut store,
            Command::AddSection {
                name: "S".to_string(),
            },
        );
        let topic_id = run_ok(
            &mut store,
            Command::AddTopic {
                section_id,
                name: "T".to_string(),
            },
        );

        let out = run_ok(
            &mut store,
            Command::SetContent {
                topic_id,
                contents: vec!["one".to_string()],
                undo: 10,
            },
        );
        assert_eq!(out, "");
    }

    #[test]
    fn test_projects_marks_active() {
        let mut store = store();
        let id = run_ok(
            &mut store,
            Command::NewProject {
                name: "Second".to_string(),
            },
        );
        run_ok(&mut store, Command::Switch { project_id: id });

        let listing = run_ok(&mut store, Command::Projects);
        let lines: Vec<&str> = listing.lines().collect();
        assert!(lines[0].starts_with("  My Project"));
        assert!(lines[1].starts_with("* Second"));
    }

    #[test]
    fn test_move_section() {
        let mut store = store();
        let first = run_ok(
            &mut store,
            Command::AddSection {
                name: "first".to_string(),
            },
        );
        run_ok(
            &mut store,
            Command::AddSection {
                name: "second".to_string(),
            },
        );
        run_ok(
            &mut store,
            Command::Move {
                kind: KindArg::Section,
                id: first,
                index: 2,
            },
        );
        let project = store.active_project().expect("project");
        assert_eq!(project.sections[0].name, "second");
    }

    #[test]
    fn test_commands_persist_across_runs() {
        use topicpad_core::WorkspaceStore;

        let dir = tempfile::tempdir().expect("tempdir");
        let open = || {
            let backend = LocalBackend::open(WorkspaceStore::open_in(dir.path()).expect("store"))
                .expect("backend");
            let mut store = ProjectStore::new(backend);
            store.load_workspace().expect("load");
            store
        };

        let section_id = {
            let mut store = open();
            run_ok(
                &mut store,
                Command::AddSection {
                    name: "Kept".to_string(),
                },
            )
        };

        let mut store = open();
        let tree = run_ok(&mut store, Command::Show);
        assert!(tree.contains(&format!("  Kept [{section_id}]")));
    }

    #[test]
    fn test_unknown_topic_fails() {
        let mut store = store();
        let result = run(
            Command::DeleteTopic {
                topic_id: "missing".to_string(),
            },
            &mut store,
            &AppConfig::default(),
        );
        assert!(result.is_err());
    }
}
