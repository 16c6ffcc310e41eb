/// Workspace persistence backed by redb.
///
/// The whole workspace is stored as one bincode-encoded value in a single
/// table, under the key `"workspace"`.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use redb::{Database, ReadableDatabase, TableDefinition};

use crate::model::Workspace;

/// Workspace table: `"workspace"` → bincode(`Workspace`).
const WORKSPACE_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("workspace");

const WORKSPACE_KEY: &str = "workspace";

/// File name of the database inside the data directory.
const DB_FILE_NAME: &str = "workspace.redb";

/// Persistence layer for the workspace, backed by redb.
pub struct WorkspaceStore {
    db: Database,
}

impl std::fmt::Debug for WorkspaceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceStore").finish()
    }
}

impl WorkspaceStore {
    /// Returns the database path inside `data_dir`.
    pub fn path_in(data_dir: &Path) -> PathBuf {
        data_dir.join(DB_FILE_NAME)
    }

    /// Opens or creates the workspace database inside `data_dir`.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn open_in(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
        Self::open(&Self::path_in(data_dir))
    }

    /// Opens or creates the workspace database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::create(path)
            .with_context(|| format!("Failed to open workspace database: {}", path.display()))?;

        // Ensure table exists
        let write_txn = db
            .begin_write()
            .context("Failed to begin initial write transaction")?;
        {
            let _ = write_txn
                .open_table(WORKSPACE_TABLE)
                .context("Failed to create workspace table")?;
        }
        write_txn
            .commit()
            .context("Failed to commit initial transaction")?;

        Ok(Self { db })
    }

    /// Saves the whole workspace, replacing the stored one.
    pub fn save(&self, workspace: &Workspace) -> Result<()> {
        let bytes = bincode::serialize(workspace).context("Failed to serialize workspace")?;

        let write_txn = self
            .db
            .begin_write()
            .context("Failed to begin write transaction")?;
        {
            let mut table = write_txn
                .open_table(WORKSPACE_TABLE)
                .context("Failed to open workspace table")?;
            table
                .insert(WORKSPACE_KEY, bytes.as_slice())
                .context("Failed to insert workspace")?;
        }
        write_txn.commit().context("Failed to commit workspace")?;
        Ok(())
    }

    /// Loads the workspace, or `None` if nothing was saved yet.
    pub fn load(&self) -> Result<Option<Workspace>> {
        let read_txn = self
            .db
            .begin_read()
            .context("Failed to begin read transaction")?;
        let table = read_txn
            .open_table(WORKSPACE_TABLE)
            .context("Failed to open workspace table")?;

        match table.get(WORKSPACE_KEY).context("Failed to read workspace")? {
            Some(guard) => {
                let workspace: Workspace = bincode::deserialize(guard.value())
                    .context("Failed to deserialize workspace")?;
                Ok(Some(workspace))
            }
            None => Ok(None),
        }
    }
}
