//! Schedule a one-shot reminder.

use anyhow::Result;
use colored::Colorize;
use wsa_sdk::Workspace;

use crate::error::WsaError;

pub fn execute(workspace: &Workspace, task: &str, minutes: u32) -> Result<()> {
    let task = task.trim();
    if task.is_empty() {
        return Err(WsaError::EmptyInput.into());
    }

    let outcome = workspace.schedule_reminder(task, minutes);
    if !outcome.accepted {
        return Err(WsaError::ReminderRejected(outcome.message).into());
    }

    println!("{}", format!("✓ {}", outcome.message).green());
    Ok(())
}
