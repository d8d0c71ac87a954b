//! Call transcription sessions and summaries.
//!
//! A [`CallSession`] collects transcribed snippets while recording. When
//! it stops, [`CallSummarizer::finalize`] asks the agent for a summary,
//! looks for a follow-up task in it, schedules a reminder for that task,
//! stores a `call_memory` row and appends the summary to the call log.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use tracing::{info, warn};
use wsa_core::reminder::{ReminderScheduler, ScheduleOutcome};
use wsa_core::types::NewCallSummary;
use wsa_core::Database;

use crate::agent::{LanguageModelAgent, SUMMARY_INSTRUCTIONS};
use crate::SDKResult;

/// Phrases that mark a sentence as a follow-up task.
const FOLLOWUP_MARKERS: &[&str] = &[
    "follow up",
    "follow-up",
    "remind",
    "todo",
    "to-do",
    "need to",
    "don't forget",
];

/// Collects snippets between `start` and `stop`.
#[derive(Debug, Default)]
pub struct CallSession {
    recording: bool,
    snippets: Vec<String>,
}

impl CallSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin recording, discarding anything from a previous call.
    pub fn start(&mut self) {
        self.recording = true;
        self.snippets.clear();
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Add a snippet. Ignored unless recording; blank text is ignored.
    pub fn record_snippet(&mut self, text: &str) {
        let text = text.trim();
        if self.recording && !text.is_empty() {
            self.snippets.push(text.to_string());
        }
    }

    /// Stop recording and return the space-joined transcript, if any.
    pub fn stop(&mut self) -> Option<String> {
        self.recording = false;
        if self.snippets.is_empty() {
            return None;
        }
        Some(std::mem::take(&mut self.snippets).join(" "))
    }
}

/// First sentence of `summary` that reads like a follow-up, with any
/// leading "Follow up:" label removed.
pub fn extract_followup_task(summary: &str) -> Option<String> {
    summary
        .split(['.', '!', '?', '\n'])
        .map(str::trim)
        .find(|sentence| {
            let lower = sentence.to_lowercase();
            FOLLOWUP_MARKERS.iter().any(|m| lower.contains(m))
        })
        .map(strip_followup_label)
        .filter(|task| !task.is_empty())
}

fn strip_followup_label(sentence: &str) -> String {
    for label in ["follow up:", "follow-up:", "todo:", "to-do:"] {
        let labelled = sentence
            .get(..label.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(label));
        if labelled {
            return sentence[label.len()..].trim().to_string();
        }
    }
    sentence.to_string()
}

/// What finalizing a call produced.
#[derive(Debug, Clone)]
pub struct CallReport {
    pub id: i64,
    pub summary: String,
    pub followup: Option<String>,
    pub reminder: Option<ScheduleOutcome>,
}

/// Summarizes finished calls.
pub struct CallSummarizer {
    db: Arc<Database>,
    agent: Arc<dyn LanguageModelAgent>,
    scheduler: ReminderScheduler,
    call_log: Option<PathBuf>,
    followup_minutes: u32,
}

impl CallSummarizer {
    pub fn new(
        db: Arc<Database>,
        agent: Arc<dyn LanguageModelAgent>,
        scheduler: ReminderScheduler,
        followup_minutes: u32,
    ) -> Self {
        Self {
            db,
            agent,
            scheduler,
            call_log: None,
            followup_minutes,
        }
    }

    /// Append `[timestamp] summary` lines to `path`.
    pub fn with_call_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.call_log = Some(path.into());
        self
    }

    /// Summarize `transcript` and record the result.
    ///
    /// Agent and store failures are returned. A rejected reminder or an
    /// unwritable call log is only logged.
    pub async fn finalize(&self, transcript: &str) -> SDKResult<CallReport> {
        let timestamp = Local::now();
        let summary = self.agent.run(SUMMARY_INSTRUCTIONS, transcript).await?;
        let followup = extract_followup_task(&summary);

        let reminder = followup
            .as_deref()
            .map(|task| self.scheduler.schedule(task, self.followup_minutes));
        if let Some(outcome) = &reminder {
            if !outcome.accepted {
                warn!("{}", outcome.message);
            }
        }

        let id = self.db.insert_call_summary(&NewCallSummary {
            raw_text: transcript.to_string(),
            summary: summary.clone(),
            reminder: followup.clone(),
            confirmed: reminder.as_ref().is_some_and(|r| r.accepted),
        })?;
        info!("Stored call summary #{}", id);

        if let Some(path) = &self.call_log {
            if let Err(e) = append_log_line(path, &format!("[{}] {}", timestamp.to_rfc3339(), summary)) {
                warn!("Failed to append call log {:?}: {}", path, e);
            }
        }

        Ok(CallReport {
            id,
            summary,
            followup,
            reminder,
        })
    }
}

fn append_log_line(path: &Path, line: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    writeln!(file, "{}", line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SDKError;
    use async_trait::async_trait;
    use std::time::Duration;
    use wsa_core::reminder::DeferredExecution;

    struct CannedAgent(&'static str);

    #[async_trait]
    impl LanguageModelAgent for CannedAgent {
        async fn run(&self, _instructions: &str, _input: &str) -> SDKResult<String> {
            Ok(self.0.to_string())
        }
    }

    struct DownAgent;

    #[async_trait]
    impl LanguageModelAgent for DownAgent {
        async fn run(&self, _instructions: &str, _input: &str) -> SDKResult<String> {
            Err(SDKError::agent("offline"))
        }
    }

    struct AcceptAll;

    impl DeferredExecution for AcceptAll {
        fn name(&self) -> &str {
            "accept"
        }

        fn notify_at(&self, _delay: Duration, _title: &str, _message: &str) -> bool {
            true
        }
    }

    fn summarizer(agent: Arc<dyn LanguageModelAgent>) -> (Arc<Database>, CallSummarizer) {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let scheduler = ReminderScheduler::new(Arc::new(AcceptAll));
        (db.clone(), CallSummarizer::new(db, agent, scheduler, 30))
    }

    #[test]
    fn test_session_collects_only_while_recording() {
        let mut session = CallSession::new();
        session.record_snippet("ignored");
        session.start();
        session.record_snippet("hello");
        session.record_snippet("   ");
        session.record_snippet("send the deck");
        assert_eq!(session.stop().as_deref(), Some("hello send the deck"));
        assert!(!session.is_recording());
        assert_eq!(session.stop(), None);
    }

    #[test]
    fn test_extract_followup_task() {
        assert_eq!(
            extract_followup_task("Discussed budget. Follow up: send Alice the Q3 numbers."),
            Some("send Alice the Q3 numbers".to_string())
        );
        assert_eq!(
            extract_followup_task("Quick sync! We need to book the venue"),
            Some("We need to book the venue".to_string())
        );
        assert_eq!(extract_followup_task("Just a catch-up call."), None);
    }

    #[tokio::test]
    async fn test_finalize_schedules_and_logs() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("calls.log");
        let (db, summarizer) =
            summarizer(Arc::new(CannedAgent("Talked roadmap. Follow up: email Bob.")));
        let summarizer = summarizer.with_call_log(&log_path);

        let report = summarizer.finalize("we talked about the roadmap").await.unwrap();
        assert_eq!(report.followup.as_deref(), Some("email Bob"));
        assert!(report.reminder.as_ref().unwrap().accepted);

        let stored = db.list_call_summaries(10).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].reminder.as_deref(), Some("email Bob"));
        assert!(stored[0].confirmed);

        let log = std::fs::read_to_string(&log_path).unwrap();
        assert!(log.starts_with('['));
        assert!(log.trim_end().ends_with("Talked roadmap. Follow up: email Bob."));
    }

    #[tokio::test]
    async fn test_finalize_without_followup() {
        let (db, summarizer) = summarizer(Arc::new(CannedAgent("Casual chat.")));
        let report = summarizer.finalize("hi").await.unwrap();
        assert!(report.followup.is_none());
        assert!(report.reminder.is_none());
        assert!(!db.list_call_summaries(1).unwrap()[0].confirmed);
    }

    #[tokio::test]
    async fn test_finalize_agent_failure_stores_nothing() {
        let (db, summarizer) = summarizer(Arc::new(DownAgent));
        assert!(summarizer.finalize("hi").await.unwrap_err().is_agent());
        assert!(db.list_call_summaries(10).unwrap().is_empty());
    }
}
