//! wsa - Workspace Agent CLI
//!
//! Turns free text into shell actions, remembers what ran, and learns
//! weekday routines from the task log.

use std::process::ExitCode;

use anyhow::Result;
use clap::{CommandFactory, FromArgMatches};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use wsa_sdk::Workspace;

mod cli;
mod commands;
mod config;
mod error;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("wsa=info".parse()?))
        .init();

    // Load configuration first so help can list the configured commands
    let config = config::Config::load()?;

    let matches = Cli::command()
        .after_help(cli::command_listing(&config.command_table()))
        .get_matches();
    let cli = Cli::from_arg_matches(&matches)?;

    if let Some(Commands::Doctor) = cli.command {
        commands::doctor::execute(&config).await?;
        return Ok(ExitCode::SUCCESS);
    }

    config.ensure_dirs()?;
    let workspace = Workspace::new(config.to_sdk_config())?;

    // Execute command
    let success = match cli.command {
        None => {
            let input = if cli.input.is_empty() {
                commands::run::read_request()?
            } else {
                cli::join_words(&cli.input)
            };
            commands::run::execute(&workspace, &input, cli.yes).await?
        }
        Some(Commands::Run { yes, text }) => {
            commands::run::execute(&workspace, &cli::join_words(&text), yes || cli.yes).await?
        }
        Some(Commands::Similar { query, top, json }) => {
            commands::similar::execute(&workspace, &cli::join_words(&query), top, json).await?;
            true
        }
        Some(Commands::Patterns) => {
            commands::patterns::execute(&workspace)?;
            true
        }
        Some(Commands::Nudge { remind }) => {
            commands::nudge::execute(&workspace, remind)?;
            true
        }
        Some(Commands::Log { task, tags, failed }) => {
            commands::log::execute(&workspace, &task, &tags, failed)?;
            true
        }
        Some(Commands::Stats { limit, json }) => {
            commands::stats::execute(&workspace, limit, json)?;
            true
        }
        Some(Commands::Remind { task, minutes }) => {
            commands::remind::execute(&workspace, &cli::join_words(&task), minutes)?;
            true
        }
        Some(Commands::Feedback { command, feedback }) => {
            commands::feedback::execute(&workspace, &command, &cli::join_words(&feedback)).await?;
            true
        }
        Some(Commands::Call { source }) => {
            commands::call::execute(&workspace, &source).await?;
            true
        }
        Some(Commands::Doctor) => true,
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
