//! SDK Error Types
//!
//! Defines error types for the workspace agent SDK.

use thiserror::Error;

/// SDK Result type alias
pub type SDKResult<T> = Result<T, SDKError>;

/// SDK errors
#[derive(Debug, Error)]
pub enum SDKError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigValidationError),

    /// Error from the core store or executor
    #[error(transparent)]
    Core(#[from] wsa_core::Error),

    /// Embedding provider error
    #[error("embedding error: {message}")]
    Embedding { message: String },

    /// Language-model agent error
    #[error("agent error: {message}")]
    Agent { message: String },

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl SDKError {
    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding {
            message: message.into(),
        }
    }

    /// Create an agent error
    pub fn agent(message: impl Into<String>) -> Self {
        Self::Agent {
            message: message.into(),
        }
    }

    /// Check if this error came from the language-model agent
    pub fn is_agent(&self) -> bool {
        matches!(self, Self::Agent { .. })
    }

    /// Check if this error came from the embedding provider
    pub fn is_embedding(&self) -> bool {
        matches!(self, Self::Embedding { .. })
    }
}
