use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use topicpad_config::AppConfig;
use topicpad_core::{LocalBackend, ProjectStore, WorkspaceStore};

mod commands;

use commands::Command;

/// Outline editor for projects, sections and topics.
#[derive(Parser, Debug)]
#[command(name = "topicpad", version, about)]
struct Cli {
    /// Config file to use instead of the one next to the executable.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the workspace database.
    #[arg(long = "data-dir", global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(AppConfig::config_path);
    let config = AppConfig::load_or_create(&config_path);

    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .init();

    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.effective_data_dir());
    tracing::debug!("Using data directory {}", data_dir.display());

    let workspace_store = WorkspaceStore::open_in(&data_dir)?;
    let backend = LocalBackend::open(workspace_store).context("Failed to start backend")?;
    let mut store = ProjectStore::new(backend);
    store.load_workspace().context("Failed to load workspace")?;

    let output = commands::run(cli.command, &mut store, &config)?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
