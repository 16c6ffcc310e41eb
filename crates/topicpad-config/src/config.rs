/// Application configuration: load, save, and sanitize.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "TOPICPAD_DATA_DIR";

/// Upper bound accepted for `max_history` after sanitizing.
const MAX_HISTORY_LIMIT: usize = 10_000;

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Undo snapshots kept per editing session.
    pub max_history: usize,
    /// `tracing` filter used when `RUST_LOG` is not set.
    pub log_filter: String,
    /// Directory holding the workspace database. Empty = resolved default.
    pub data_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_history: 50,
            log_filter: "info".to_string(),
            data_dir: String::new(),
        }
    }
}

impl AppConfig {
    /// Returns the config file path: exe directory + `topicpad.json`.
    pub fn config_path() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|d| d.join("topicpad.json")))
            .unwrap_or_else(|| PathBuf::from("topicpad.json"))
    }

    /// Loads config from `path`, creating a default file if it doesn't exist.
    /// Returns defaults on any error (missing file, parse error, etc.).
    pub fn load_or_create(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(contents) => match serde_json::from_str::<AppConfig>(&contents) {
                    Ok(mut config) => {
                        config.sanitize();
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {}: {e}", path.display());
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {}: {e}", path.display());
                }
            }
            // Broken file is left in place for the user to fix
            Self::default()
        } else {
            let config = Self::default();
            if let Err(e) = config.save(path) {
                tracing::warn!("Failed to create default config at {}: {e}", path.display());
            }
            config
        }
    }

    /// Saves config to `path` as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Directory for the workspace database.
    ///
    /// Uses `data_dir` when set, otherwise [`resolve_data_dir`].
    pub fn effective_data_dir(&self) -> PathBuf {
        if self.data_dir.trim().is_empty() {
            resolve_data_dir()
        } else {
            PathBuf::from(&self.data_dir)
        }
    }

    /// Clamps values to valid ranges and resets invalid fields.
    pub fn sanitize(&mut self) {
        self.max_history = self.max_history.clamp(1, MAX_HISTORY_LIMIT);
        if self.log_filter.trim().is_empty() {
            self.log_filter = "info".to_string();
        }
    }
}

/// Resolves the data directory path.
///
/// Resolution order:
/// 1. `TOPICPAD_DATA_DIR` environment variable
/// 2. Platform data directory + `topicpad`
/// 3. `.data/` directory next to the executable
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    if let Some(dir) = dirs::data_dir() {
        return dir.join("topicpad");
    }
    let exe = std::env::current_exe().unwrap_or_else(|_| PathBuf::from("."));
    exe.parent().unwrap_or(Path::new(".")).join(".data")
}
