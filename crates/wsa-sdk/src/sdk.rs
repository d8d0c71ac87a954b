//! Main SDK Entry Point
//!
//! Provides the `Workspace` service object that owns the store and wires
//! every component together. Construct one at startup and pass it by
//! reference to whatever front end needs it.

use std::sync::Arc;

use chrono::{DateTime, Local};
use wsa_core::reminder::{AtFacility, DeferredExecution, ScheduleOutcome, TimerFacility};
use wsa_core::stats::TaskStats;
use wsa_core::types::{ClassificationKind, NewTaskLog, TaskLogEntry};
use wsa_core::{Classification, Classifier, Confirmer, Database, ReminderScheduler, ShellExecutor};

use crate::agent::{LanguageModelAgent, OpenAiAgent};
use crate::calls::CallSummarizer;
use crate::config::{EmbedderKind, ReminderFacilityKind};
use crate::memory::{CommandMemory, Embedder, EmbeddingService, HashingEmbedder, SimilarCommand};
use crate::patterns::{PatternLearner, RoutinePatterns};
use crate::pipeline::{Pipeline, ProcessOutcome};
use crate::{SDKConfig, SDKError, SDKResult};

/// Workspace agent - main entry point
///
/// # Example
///
/// ```rust,no_run
/// use wsa_sdk::{SDKConfig, Workspace};
/// use wsa_core::safety::StaticConfirmer;
///
/// async fn example() -> wsa_sdk::SDKResult<()> {
///     let workspace = Workspace::new(SDKConfig::new("wsa.db"))?;
///
///     let outcome = workspace.process("show disk usage", &StaticConfirmer(false)).await;
///     println!("{}", outcome.output);
///
///     for hit in workspace.similar("disk", None).await? {
///         println!("{:.2} {}", hit.score, hit.command);
///     }
///     Ok(())
/// }
/// ```
pub struct Workspace {
    config: SDKConfig,
    db: Arc<Database>,
    memory: CommandMemory,
    learner: PatternLearner,
    scheduler: ReminderScheduler,
    agent: Arc<dyn LanguageModelAgent>,
    pipeline: Pipeline,
}

impl Workspace {
    /// Open the database and build the configured components.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration validation fails
    /// - The database cannot be opened or migrated
    pub fn new(config: SDKConfig) -> SDKResult<Self> {
        config.validate()?;

        let db = Arc::new(Database::open_path(&config.database_path)?);

        let embedder: Arc<dyn Embedder> = match config.memory.embedder {
            EmbedderKind::Fastembed => Arc::new(EmbeddingService::new()),
            EmbedderKind::Hashing => Arc::new(HashingEmbedder::default()),
        };
        let facility: Arc<dyn DeferredExecution> = match config.reminders.facility {
            ReminderFacilityKind::At => Arc::new(AtFacility::new()),
            ReminderFacilityKind::Timer => Arc::new(TimerFacility::new()),
        };
        let agent = Arc::new(OpenAiAgent::from_config(&config.agent));

        Self::with_components(config, db, embedder, agent, facility)
    }

    /// Assemble a workspace from explicit collaborators.
    pub fn with_components(
        config: SDKConfig,
        db: Arc<Database>,
        embedder: Arc<dyn Embedder>,
        agent: Arc<dyn LanguageModelAgent>,
        facility: Arc<dyn DeferredExecution>,
    ) -> SDKResult<Self> {
        config.validate()?;

        let memory = CommandMemory::new(db.clone(), embedder);
        let executor =
            ShellExecutor::new(config.executor.timeout()).with_shell(config.executor.shell.clone());
        let pipeline = Pipeline::new(
            db.clone(),
            Classifier::new(config.commands.clone()),
            executor,
            memory.clone(),
            agent.clone(),
        )
        .with_auto_exec(config.auto_exec.clone())
        .with_instructions(config.agent.instructions.clone())
        .with_source_tag(config.source_tag.clone());

        Ok(Self {
            learner: PatternLearner::new(db.clone()),
            scheduler: ReminderScheduler::new(facility),
            config,
            db,
            memory,
            agent,
            pipeline,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &SDKConfig {
        &self.config
    }

    /// Get the underlying store
    pub fn db(&self) -> &Arc<Database> {
        &self.db
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Run one input through the pipeline.
    pub async fn process(&self, input: &str, confirmer: &dyn Confirmer) -> ProcessOutcome {
        self.pipeline.process(input, confirmer).await
    }

    /// Classify without acting.
    pub fn classify(&self, input: &str) -> Classification {
        self.pipeline.classifier().classify(input)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Memory
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn remember(&self, text: &str, output: &str, feedback: Option<&str>) -> SDKResult<i64> {
        self.memory.remember(text, output, feedback).await
    }

    /// Similar past commands; `top_n` defaults to the configured value.
    pub async fn similar(&self, query: &str, top_n: Option<usize>) -> SDKResult<Vec<SimilarCommand>> {
        let top_n = top_n.unwrap_or(self.config.memory.top_n);
        self.memory.similar(query, top_n).await
    }

    /// Attach feedback to `command` by appending a memory entry that reuses
    /// its most recent output.
    pub async fn record_feedback(&self, command: &str, feedback: &str) -> SDKResult<i64> {
        if feedback.trim().is_empty() {
            return Err(SDKError::Other(anyhow::anyhow!("feedback must not be empty")));
        }
        let output = self.db.latest_output_for(command)?.unwrap_or_default();
        self.memory.remember(command, &output, Some(feedback)).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Task log
    // ─────────────────────────────────────────────────────────────────────────

    /// Log a task by hand.
    pub fn log_task(&self, task: &str, tags: &[String], success: bool) -> SDKResult<i64> {
        let entry = NewTaskLog::now(task, ClassificationKind::Manual, tags.to_vec(), "", success);
        Ok(self.db.insert_task_log(&entry)?)
    }

    /// Tasks logged since `since`, newest first.
    pub fn recent_tasks(&self, since: DateTime<Local>) -> SDKResult<Vec<TaskLogEntry>> {
        Ok(self.db.recent_tasks(since)?)
    }

    pub fn task_stats(&self) -> SDKResult<TaskStats> {
        Ok(self.db.task_stats()?)
    }

    pub fn routine_patterns(&self) -> SDKResult<RoutinePatterns> {
        self.learner.routine_patterns()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reminders & calls
    // ─────────────────────────────────────────────────────────────────────────

    pub fn schedule_reminder(&self, task: &str, minutes_from_now: u32) -> ScheduleOutcome {
        self.scheduler.schedule(task, minutes_from_now)
    }

    pub fn reminder_facility(&self) -> &str {
        self.scheduler.facility_name()
    }

    /// A summarizer sharing this workspace's store, agent and scheduler.
    pub fn call_summarizer(&self) -> CallSummarizer {
        let summarizer = CallSummarizer::new(
            self.db.clone(),
            self.agent.clone(),
            self.scheduler.clone(),
            self.config.reminders.default_followup_minutes,
        );
        match &self.config.call_log_path {
            Some(path) => summarizer.with_call_log(path.clone()),
            None => summarizer,
        }
    }
}
