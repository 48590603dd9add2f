//! Error types for the task workers.
//!
//! Adapters never let these escape to the process host: `TaskProcessor::invoke`
//! folds every variant into an error-tagged `TaskOutcome`.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} returned status {status}: {body}")]
    Provider {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("Malformed JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unexpected response shape: {0}")]
    Normalize(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Task queue error: {0}")]
    Queue(String),

}

impl WorkerError {
    pub fn invalid(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, WorkerError>;
