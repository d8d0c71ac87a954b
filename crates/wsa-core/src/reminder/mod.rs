//! Fire-and-forget reminders.
//!
//! A reminder is handed to a [`DeferredExecution`] facility and forgotten:
//! no handle is kept, so it cannot be cancelled or queried afterwards, and a
//! rejected hand-off is reported but never retried.

use chrono::{DateTime, Duration as ChronoDuration, Local};
use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default notification title.
pub const REMINDER_TITLE: &str = "Reminder";

/// Operating-environment facility that shows a notification later.
pub trait DeferredExecution: Send + Sync {
    /// Short name for logs and diagnostics.
    fn name(&self) -> &str;

    /// Submit a notification to fire after `delay`. Returns whether the
    /// request was accepted.
    fn notify_at(&self, delay: Duration, title: &str, message: &str) -> bool;
}

/// Quote `s` for a POSIX shell.
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Uses the system `at` queue to run `notify-send` later.
///
/// Survives the current process exiting.
#[derive(Debug, Clone)]
pub struct AtFacility {
    at_binary: String,
    notifier: String,
}

impl Default for AtFacility {
    fn default() -> Self {
        Self {
            at_binary: "at".to_string(),
            notifier: "notify-send".to_string(),
        }
    }
}

impl AtFacility {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_binary(mut self, at_binary: impl Into<String>) -> Self {
        self.at_binary = at_binary.into();
        self
    }

    /// Whether the `at` binary can be found.
    pub fn is_available(&self) -> bool {
        which::which(&self.at_binary).is_ok()
    }
}

impl DeferredExecution for AtFacility {
    fn name(&self) -> &str {
        "at"
    }

    fn notify_at(&self, delay: Duration, title: &str, message: &str) -> bool {
        // at has minute resolution
        let minutes = delay.as_secs().div_ceil(60);
        let job = format!(
            "{} {} {}\n",
            self.notifier,
            shell_quote(title),
            shell_quote(message)
        );

        let child = Command::new(&self.at_binary)
            .args(["now", "+", &minutes.to_string(), "minutes"])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn();

        let mut child = match child {
            Ok(child) => child,
            Err(e) => {
                warn!("Cannot start {}: {}", self.at_binary, e);
                return false;
            }
        };

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(job.as_bytes()) {
                warn!("Failed to write at job: {}", e);
                return false;
            }
        }

        match child.wait_with_output() {
            Ok(output) if output.status.success() => true,
            Ok(output) => {
                warn!(
                    "at rejected reminder: {}",
                    String::from_utf8_lossy(&output.stderr).trim()
                );
                false
            }
            Err(e) => {
                warn!("Failed waiting for at: {}", e);
                false
            }
        }
    }
}

/// Sleeps on the tokio runtime, then runs `notify-send`.
///
/// Only fires while the current process keeps running, so it suits
/// long-lived front ends rather than one-shot CLI calls.
#[derive(Debug, Clone)]
pub struct TimerFacility {
    notifier: String,
}

impl Default for TimerFacility {
    fn default() -> Self {
        Self {
            notifier: "notify-send".to_string(),
        }
    }
}

impl TimerFacility {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notifier(mut self, notifier: impl Into<String>) -> Self {
        self.notifier = notifier.into();
        self
    }
}

impl DeferredExecution for TimerFacility {
    fn name(&self) -> &str {
        "timer"
    }

    fn notify_at(&self, delay: Duration, title: &str, message: &str) -> bool {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("Timer reminders need a running tokio runtime");
            return false;
        };

        let notifier = self.notifier.clone();
        let title = title.to_string();
        let message = message.to_string();
        handle.spawn(async move {
            tokio::time::sleep(delay).await;
            let status = tokio::process::Command::new(&notifier)
                .arg(&title)
                .arg(&message)
                .status()
                .await;
            if let Err(e) = status {
                warn!("Failed to run {}: {}", notifier, e);
            }
        });
        true
    }
}

/// Result of handing a reminder to the facility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleOutcome {
    pub accepted: bool,
    pub fire_at: DateTime<Local>,
    pub message: String,
}

/// Computes fire times and hands reminders to a facility.
#[derive(Clone)]
pub struct ReminderScheduler {
    facility: Arc<dyn DeferredExecution>,
}

impl ReminderScheduler {
    pub fn new(facility: Arc<dyn DeferredExecution>) -> Self {
        Self { facility }
    }

    pub fn facility_name(&self) -> &str {
        self.facility.name()
    }

    /// Schedule `task` to pop up `minutes_from_now` minutes from now.
    pub fn schedule(&self, task: &str, minutes_from_now: u32) -> ScheduleOutcome {
        let fire_at = Local::now() + ChronoDuration::minutes(i64::from(minutes_from_now));
        let delay = Duration::from_secs(u64::from(minutes_from_now) * 60);

        debug!("Scheduling reminder via {} at {}", self.facility.name(), fire_at);
        let accepted = self.facility.notify_at(delay, REMINDER_TITLE, task);

        let message = if accepted {
            info!("Reminder scheduled for {}: {}", fire_at.format("%H:%M"), task);
            format!("Reminder set for {}: {}", fire_at.format("%H:%M"), task)
        } else {
            format!("Failed to schedule reminder via {}: {}", self.facility.name(), task)
        };

        ScheduleOutcome {
            accepted,
            fire_at,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingFacility {
        accept: bool,
        calls: Mutex<Vec<(Duration, String, String)>>,
    }

    impl DeferredExecution for RecordingFacility {
        fn name(&self) -> &str {
            "recording"
        }

        fn notify_at(&self, delay: Duration, title: &str, message: &str) -> bool {
            self.calls
                .lock()
                .unwrap()
                .push((delay, title.to_string(), message.to_string()));
            self.accept
        }
    }

    #[test]
    fn test_schedule_hands_off_once() {
        let facility = Arc::new(RecordingFacility { accept: true, ..Default::default() });
        let scheduler = ReminderScheduler::new(facility.clone());

        let before = Local::now();
        let outcome = scheduler.schedule("Send the invoice", 30);
        assert!(outcome.accepted);
        assert!(outcome.message.starts_with("Reminder set for"));
        assert!(outcome.fire_at >= before + ChronoDuration::minutes(30));

        let calls = facility.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, Duration::from_secs(30 * 60));
        assert_eq!(calls[0].1, REMINDER_TITLE);
        assert_eq!(calls[0].2, "Send the invoice");
    }

    #[test]
    fn test_rejected_reminder_is_not_retried() {
        let facility = Arc::new(RecordingFacility::default());
        let scheduler = ReminderScheduler::new(facility.clone());

        let outcome = scheduler.schedule("Water plants", 5);
        assert!(!outcome.accepted);
        assert!(outcome.message.starts_with("Failed to schedule reminder"));
        assert_eq!(facility.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_at_binary_reports_failure() {
        let at = AtFacility::new().with_binary("/nonexistent/at");
        assert!(!at.is_available());
        assert!(!at.notify_at(Duration::from_secs(60), "t", "m"));
    }

    #[test]
    fn test_timer_without_runtime_fails() {
        let timer = TimerFacility::new();
        assert!(!timer.notify_at(Duration::from_secs(1), "t", "m"));
    }

    #[tokio::test]
    async fn test_timer_fires_notifier() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("title");
        let second = dir.path().join("message");

        // mkdir stands in for notify-send: each argument becomes a directory
        let timer = TimerFacility::new().with_notifier("mkdir");
        assert!(timer.notify_at(
            Duration::from_millis(10),
            first.to_str().unwrap(),
            second.to_str().unwrap()
        ));

        for _ in 0..100 {
            if first.exists() && second.exists() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(first.is_dir());
        assert!(second.is_dir());
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
    }
}
