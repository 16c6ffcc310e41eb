//! Front-end state layer for the topicpad outline editor.
//!
//! Mirrors the backend-held workspace, exposes derived views over it, and
//! binds editable state to snapshot undo/redo history.

pub mod backend;
pub mod history;
pub mod model;
pub mod observable;
pub mod project_store;
pub mod session;

pub use backend::local::LocalBackend;
pub use backend::store::WorkspaceStore;
pub use backend::{args, Args, Backend};
pub use model::{ItemKind, Project, Refinement, Section, Topic, Workspace};
pub use observable::{Observable, SubscriptionId};
pub use project_store::{ActiveTopic, ProjectStore};
pub use session::{EditorSession, TopicEditor};
