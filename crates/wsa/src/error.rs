//! Error types for wsa.

use thiserror::Error;

/// Errors raised by the CLI itself (library errors pass through `anyhow`).
#[derive(Error, Debug)]
pub enum WsaError {
    #[error("No input given")]
    EmptyInput,

    #[error("Transcript is empty: {0}")]
    EmptyTranscript(String),

    #[error("Feedback cannot be empty")]
    EmptyFeedback,

    #[error("Reminder was not accepted: {0}")]
    ReminderRejected(String),
}
