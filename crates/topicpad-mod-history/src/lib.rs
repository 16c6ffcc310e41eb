/// Snapshot-based undo/redo history.
///
/// Provides an `UndoHistory` that records complete snapshots of a piece of
/// state, suppresses consecutive duplicates, and keeps a bounded linear log.
/// History lives in memory for the duration of an editing session only.
pub mod config;
pub mod equality;
pub mod history;

pub use config::HistoryConfig;
pub use equality::{JsonSnapshots, PartialEqSnapshots, SnapshotEq};
pub use history::UndoHistory;
