// Re-exports from topicpad-mod-history and config bridging.
pub use topicpad_mod_history::{
    HistoryConfig, JsonSnapshots, PartialEqSnapshots, SnapshotEq, UndoHistory,
};

use topicpad_config::AppConfig;

/// History settings derived from the application config.
pub fn history_config(config: &AppConfig) -> HistoryConfig {
    HistoryConfig::new(config.max_history)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_config_from_app_config() {
        let mut config = AppConfig::default();
        assert_eq!(history_config(&config).max_history, 50);

        config.max_history = 0;
        assert_eq!(history_config(&config).max_history, 1);
    }
}
