//! Manual task logging.

use anyhow::Result;
use colored::Colorize;
use wsa_sdk::Workspace;

use crate::error::WsaError;

pub fn execute(workspace: &Workspace, task: &str, tags: &[String], failed: bool) -> Result<()> {
    let task = task.trim();
    if task.is_empty() {
        return Err(WsaError::EmptyInput.into());
    }

    let tags: Vec<String> = tags
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    let id = workspace.log_task(task, &tags, !failed)?;

    println!("{}", format!("✓ Logged task #{}: {}", id, task).green());
    Ok(())
}
