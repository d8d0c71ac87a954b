//! Attach feedback to a remembered command.

use anyhow::Result;
use colored::Colorize;
use wsa_sdk::patterns::is_negative_feedback;
use wsa_sdk::Workspace;

use crate::error::WsaError;

pub async fn execute(workspace: &Workspace, command: &str, feedback: &str) -> Result<()> {
    if feedback.trim().is_empty() {
        return Err(WsaError::EmptyFeedback.into());
    }

    workspace.record_feedback(command.trim(), feedback.trim()).await?;
    println!("{}", format!("✓ Feedback saved for \"{}\"", command.trim()).green());

    if is_negative_feedback(Some(feedback)) {
        println!("{}", "○ This command will no longer be suggested as a routine".yellow());
    }
    Ok(())
}
