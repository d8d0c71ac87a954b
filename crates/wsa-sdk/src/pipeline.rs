//! Command interpretation pipeline.
//!
//! `process` runs one input through classify → confirm → execute/delegate →
//! record → remember, sequentially. It never fails: shell and agent
//! problems come back inside the [`ProcessOutcome`], and store or embedding
//! failures after the fact are logged and dropped.
//!
//! The safety gate sees the raw input first, then the resolved template
//! command or the agent's proposed command. The confirmer is asked at most
//! once per call, and a decline stops everything before any command runs.
//! A declined input is still recorded (with `success = false`) but is not
//! added to command memory.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};
use wsa_core::exec::{AutoExecPolicy, ExecResult};
use wsa_core::safety::{Confirmer, GateSession, SafetyGate};
use wsa_core::types::NewTaskLog;
use wsa_core::{Classification, ClassificationKind, Classifier, Database, ShellExecutor};

use crate::agent::{LanguageModelAgent, COMMAND_INSTRUCTIONS};
use crate::memory::CommandMemory;

/// Output shown when the user declines a destructive action.
pub const CANCELLED_OUTPUT: &str = "Cancelled: destructive action not confirmed";

/// How an invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Ran (or answered) successfully
    Completed,
    /// A command ran and failed, or could not be started
    Failed,
    /// The user declined confirmation
    Cancelled,
    /// The language-model agent could not be reached
    AgentUnavailable,
}

/// Result of [`Pipeline::process`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessOutcome {
    pub output: String,
    pub cancelled: bool,
    pub success: bool,
    /// Whether a shell command or script was actually started
    pub executed: bool,
    pub status: OutcomeStatus,
    pub classification: ClassificationKind,
}

impl ProcessOutcome {
    fn cancelled(classification: ClassificationKind) -> Self {
        Self {
            output: CANCELLED_OUTPUT.to_string(),
            cancelled: true,
            success: false,
            executed: false,
            status: OutcomeStatus::Cancelled,
            classification,
        }
    }

    fn executed(classification: ClassificationKind, result: ExecResult) -> Self {
        Self {
            status: if result.success {
                OutcomeStatus::Completed
            } else {
                OutcomeStatus::Failed
            },
            output: result.output,
            cancelled: false,
            success: result.success,
            executed: true,
            classification,
        }
    }

    /// Whether a front end should exit non-zero.
    pub fn is_failure(&self) -> bool {
        matches!(self.status, OutcomeStatus::Failed | OutcomeStatus::AgentUnavailable)
    }
}

/// End-to-end orchestrator shared by every front end.
pub struct Pipeline {
    db: Arc<Database>,
    classifier: Classifier,
    gate: SafetyGate,
    executor: ShellExecutor,
    memory: CommandMemory,
    agent: Arc<dyn LanguageModelAgent>,
    auto_exec: AutoExecPolicy,
    instructions: String,
    source_tag: String,
}

impl Pipeline {
    pub fn new(
        db: Arc<Database>,
        classifier: Classifier,
        executor: ShellExecutor,
        memory: CommandMemory,
        agent: Arc<dyn LanguageModelAgent>,
    ) -> Self {
        Self {
            db,
            classifier,
            gate: SafetyGate::new(),
            executor,
            memory,
            agent,
            auto_exec: AutoExecPolicy::default(),
            instructions: COMMAND_INSTRUCTIONS.to_string(),
            source_tag: "cli".to_string(),
        }
    }

    pub fn with_auto_exec(mut self, policy: AutoExecPolicy) -> Self {
        self.auto_exec = policy;
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn with_source_tag(mut self, tag: impl Into<String>) -> Self {
        self.source_tag = tag.into();
        self
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Interpret and act on `input`, asking `confirmer` before anything
    /// destructive.
    pub async fn process(&self, input: &str, confirmer: &dyn Confirmer) -> ProcessOutcome {
        let classification = self.classifier.classify(input);
        let kind = classification.kind();
        info!(classification = %kind, "Processing input: {}", input);

        let mut gate = self.gate.session(confirmer);
        let outcome = self.dispatch(input, classification, &mut gate).await;

        debug!(status = ?outcome.status, "Pipeline finished");
        self.record(input, &outcome);
        if !outcome.cancelled {
            self.remember(input, &outcome.output).await;
        }
        outcome
    }

    async fn dispatch(
        &self,
        input: &str,
        classification: Classification,
        gate: &mut GateSession<'_>,
    ) -> ProcessOutcome {
        let kind = classification.kind();
        if !gate.check(input).await.is_allowed() {
            return ProcessOutcome::cancelled(kind);
        }

        match classification {
            Classification::HotCommand { script_id, parameter } => {
                match self.classifier.hot_command(&script_id) {
                    Some(hot) => {
                        let result = self.executor.invoke_script(hot, &parameter).await;
                        ProcessOutcome::executed(kind, result)
                    }
                    None => ProcessOutcome::executed(
                        kind,
                        ExecResult::failed(format!("Unknown hot command: {}", script_id)),
                    ),
                }
            }
            Classification::Template { command, .. } => {
                if !gate.check(&command).await.is_allowed() {
                    return ProcessOutcome::cancelled(kind);
                }
                let result = self.executor.run(&command).await;
                ProcessOutcome::executed(kind, result)
            }
            Classification::Agent { raw_input } => self.delegate(&raw_input, gate).await,
        }
    }

    async fn delegate(&self, raw_input: &str, gate: &mut GateSession<'_>) -> ProcessOutcome {
        let kind = ClassificationKind::Agent;
        let reply = match self.agent.run(&self.instructions, raw_input).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Agent unavailable: {}", e);
                return ProcessOutcome {
                    output: format!("Agent unavailable: {}", e),
                    cancelled: false,
                    success: false,
                    executed: false,
                    status: OutcomeStatus::AgentUnavailable,
                    classification: kind,
                };
            }
        };

        let Some(command) = self.auto_exec.extract_command(&reply) else {
            // Plain answer, shown as-is
            return ProcessOutcome {
                output: reply,
                cancelled: false,
                success: true,
                executed: false,
                status: OutcomeStatus::Completed,
                classification: kind,
            };
        };

        if !gate.check(&command).await.is_allowed() {
            return ProcessOutcome::cancelled(kind);
        }
        info!("Running agent-proposed command: {}", command);
        let result = self.executor.run(&command).await;
        ProcessOutcome::executed(kind, result)
    }

    fn record(&self, input: &str, outcome: &ProcessOutcome) {
        let entry = NewTaskLog::now(
            input,
            outcome.classification,
            vec![
                outcome.classification.as_str().to_string(),
                self.source_tag.clone(),
            ],
            outcome.output.as_str(),
            outcome.success,
        );
        if let Err(e) = self.db.insert_task_log(&entry) {
            error!("Failed to record command: {}", e);
        }
    }

    async fn remember(&self, input: &str, output: &str) {
        if let Err(e) = self.memory.remember(input, output, None).await {
            warn!("Failed to remember command: {}", e);
        }
    }
}
