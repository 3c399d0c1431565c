//! `notes` command-line client.
//!
//! # Responsibility
//! - Resolve client config from file, environment and flags.
//! - Initialize core logging, then run one subcommand against the REST
//!   backend.

mod commands;
mod interactive;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use notesync_core::{
    core_version, default_log_level, init_logging, ClientConfig, HttpNotesApi, NoteId,
};
use std::path::PathBuf;

/// Stderr logging stays quiet unless asked for; it shares the terminal.
const STDERR_LOG_LEVEL: &str = "warn";

#[derive(Debug, Parser)]
#[command(name = "notes", version, about = "Client for the notes REST backend")]
struct Cli {
    /// Config file (default: ~/.config/notesync/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend origin, e.g. http://localhost:5000.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute directory for rotating log files; stderr when omitted.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List notes in backend order.
    List,
    /// Create a note.
    New {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Print one note.
    Show { id: String },
    /// Edit a note line by line; autosaves after a quiet period.
    Edit { id: String },
    /// Delete a note.
    Delete { id: String },
    /// Print the share link of a note.
    Share { id: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    let log_dir = cli.log_dir.as_deref().or(config.log_dir.as_deref());
    let level = cli
        .log_level
        .as_deref()
        .or(config.log_level.as_deref())
        .unwrap_or(if log_dir.is_some() {
            default_log_level()
        } else {
            STDERR_LOG_LEVEL
        });
    init_logging(level, log_dir)?;
    info!(
        "event=cli_start module=cli status=ok core_version={}",
        core_version()
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let result = runtime.block_on(run(cli.command, config));
    // The stdin reader of `edit` may still be parked on a blocking read.
    runtime.shutdown_background();
    result
}

fn resolve_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = ClientConfig::load_from(path)?;
            config.apply_overrides(|key| std::env::var(key).ok());
            config
        }
        None => ClientConfig::load()?,
    };
    if let Some(url) = &cli.api_url {
        config.api_base_url = url.clone();
    }
    Ok(config)
}

async fn run(command: Command, config: ClientConfig) -> Result<()> {
    let api = HttpNotesApi::new(&config)?;
    match command {
        Command::List => commands::list(api).await,
        Command::New { title, content } => commands::create(api, title, content).await,
        Command::Show { id } => commands::show(api, &NoteId::from(id)).await,
        Command::Edit { id } => interactive::edit(api, &config, NoteId::from(id)).await,
        Command::Delete { id } => commands::delete(api, &NoteId::from(id)).await,
        Command::Share { id } => commands::share(api, &config, &NoteId::from(id)).await,
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::{CommandFactory, Parser};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["notes", "edit", "7", "--api-url", "http://h:1"]).unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://h:1"));
        assert!(matches!(cli.command, Command::Edit { ref id } if id == "7"));
    }

    #[test]
    fn new_accepts_optional_title_and_content() {
        let cli = Cli::try_parse_from(["notes", "new", "--title", "Groceries"]).unwrap();
        match cli.command {
            Command::New { title, content } => {
                assert_eq!(title.as_deref(), Some("Groceries"));
                assert!(content.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
