//! Run free text through the pipeline.

use std::io::{BufRead, IsTerminal};

use anyhow::{Context, Result};
use async_trait::async_trait;
use colored::Colorize;
use dialoguer::{Confirm, Input};
use indicatif::ProgressBar;
use tracing::{info, warn};
use wsa_core::{ClassificationKind, Confirmer};
use wsa_sdk::{OutcomeStatus, ProcessOutcome, Workspace};

use crate::error::WsaError;

/// Asks on the terminal, or answers for the user with `--yes`.
///
/// Without a terminal there is nobody to ask, so destructive actions are
/// declined.
pub struct TerminalConfirmer {
    assume_yes: bool,
    interactive: bool,
    spinner: Option<ProgressBar>,
}

impl TerminalConfirmer {
    pub fn new(assume_yes: bool) -> Self {
        Self {
            assume_yes,
            interactive: std::io::stdin().is_terminal(),
            spinner: None,
        }
    }

    /// Hide `spinner` while the prompt is on screen.
    pub fn with_spinner(mut self, spinner: ProgressBar) -> Self {
        self.spinner = Some(spinner);
        self
    }
}

#[async_trait]
impl Confirmer for TerminalConfirmer {
    async fn ask(&self, prompt: &str) -> bool {
        if self.assume_yes {
            info!("Approved by --yes");
            return true;
        }
        if !self.interactive {
            warn!("No terminal to confirm on; declining");
            return false;
        }

        let prompt = prompt.to_string();
        let spinner = self.spinner.clone();
        let answer = tokio::task::spawn_blocking(move || {
            let ask = || {
                Confirm::new()
                    .with_prompt(prompt)
                    .default(false)
                    .interact()
                    .unwrap_or(false)
            };
            match spinner {
                Some(bar) => bar.suspend(ask),
                None => ask(),
            }
        })
        .await;

        answer.unwrap_or(false)
    }
}

/// Read one request line: a prompt on a terminal, otherwise a line of stdin.
pub fn read_request() -> Result<String> {
    let line = if std::io::stdin().is_terminal() {
        Input::<String>::new()
            .with_prompt("wsa")
            .allow_empty(true)
            .interact_text()
            .context("Failed to read request")?
    } else {
        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read request from stdin")?;
        line
    };

    let line = line.trim().to_string();
    if line.is_empty() {
        return Err(WsaError::EmptyInput.into());
    }
    Ok(line)
}

/// Process `input` and print the outcome. Returns `false` when the caller
/// should exit non-zero.
pub async fn execute(workspace: &Workspace, input: &str, assume_yes: bool) -> Result<bool> {
    let input = input.trim();
    if input.is_empty() {
        return Err(WsaError::EmptyInput.into());
    }

    // Scripts inherit the terminal, so only agent requests get a spinner
    let confirmer = TerminalConfirmer::new(assume_yes);
    let outcome = if workspace.classify(input).kind() == ClassificationKind::Agent {
        let bar = super::spinner("Asking the agent...");
        let confirmer = confirmer.with_spinner(bar.clone());
        let outcome = workspace.process(input, &confirmer).await;
        bar.finish_and_clear();
        outcome
    } else {
        workspace.process(input, &confirmer).await
    };

    print_outcome(&outcome);
    Ok(!outcome.is_failure())
}

fn print_outcome(outcome: &ProcessOutcome) {
    match outcome.status {
        OutcomeStatus::Completed => {
            if !outcome.output.is_empty() {
                println!("{}", outcome.output);
            }
        }
        OutcomeStatus::Cancelled => println!("{}", format!("○ {}", outcome.output).yellow()),
        OutcomeStatus::Failed => {
            if !outcome.output.is_empty() {
                println!("{}", outcome.output);
            }
            eprintln!("{}", "✗ Command failed".red());
        }
        OutcomeStatus::AgentUnavailable => eprintln!("{}", format!("✗ {}", outcome.output).red()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use wsa_core::reminder::DeferredExecution;
    use wsa_core::{CommandTable, Database, TemplateCommand};
    use wsa_sdk::memory::HashingEmbedder;
    use wsa_sdk::{LanguageModelAgent, SDKConfig, SDKError, SDKResult};

    struct OfflineAgent;

    #[async_trait]
    impl LanguageModelAgent for OfflineAgent {
        async fn run(&self, _instructions: &str, _input: &str) -> SDKResult<String> {
            Err(SDKError::agent("offline"))
        }
    }

    struct NoReminders;

    impl DeferredExecution for NoReminders {
        fn name(&self) -> &str {
            "none"
        }

        fn notify_at(&self, _delay: Duration, _title: &str, _message: &str) -> bool {
            false
        }
    }

    fn workspace(templates: Vec<TemplateCommand>) -> (Arc<Database>, Workspace) {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let config = SDKConfig::default().with_commands(CommandTable {
            hot_commands: Vec::new(),
            templates,
        });
        let workspace = Workspace::with_components(
            config,
            db.clone(),
            Arc::new(HashingEmbedder::default()),
            Arc::new(OfflineAgent),
            Arc::new(NoReminders),
        )
        .unwrap();
        (db, workspace)
    }

    fn confirmer(assume_yes: bool) -> TerminalConfirmer {
        TerminalConfirmer {
            assume_yes,
            interactive: false,
            spinner: None,
        }
    }

    #[tokio::test]
    async fn test_confirmer_answers() {
        assert!(confirmer(true).ask("delete everything?").await);
        assert!(!confirmer(false).ask("delete everything?").await);
    }

    #[tokio::test]
    async fn test_template_success_exits_zero() {
        let (db, workspace) = workspace(vec![TemplateCommand {
            key: "say hi".to_string(),
            command: "echo hi".to_string(),
        }]);

        assert!(execute(&workspace, "say hi", false).await.unwrap());
        assert_eq!(db.list_task_log(None).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_command_exits_non_zero() {
        let (_db, workspace) = workspace(vec![TemplateCommand {
            key: "break".to_string(),
            command: "exit 3".to_string(),
        }]);

        assert!(!execute(&workspace, "break", false).await.unwrap());
    }

    #[tokio::test]
    async fn test_agent_unavailable_exits_non_zero() {
        let (_db, workspace) = workspace(Vec::new());
        assert!(!execute(&workspace, "what's the weather", false).await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_input_is_an_error() {
        let (_db, workspace) = workspace(Vec::new());
        assert!(execute(&workspace, "   ", false).await.is_err());
    }
}
