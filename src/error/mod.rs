//! Error handling module for the highlight pipeline

use thiserror::Error;

use crate::planner::Backend;

/// Main error type for highlight generation
#[derive(Error, Debug)]
pub enum HighlightError {
    /// Malformed timestamp or inverted range proposed by the oracle
    #[error("Invalid candidate range: {message}")]
    Validation { message: String },

    /// Required transcript, summary or media input is absent
    #[error("Missing {what}: {path}")]
    MissingArtifact { what: String, path: String },

    /// Oracle response could not yield any candidates
    #[error("Failed to parse oracle response: {message}")]
    OracleParse { message: String },

    /// Every candidate was filtered out during optimization
    #[error("No segments remaining after optimization: {message}")]
    EmptyOptimizationResult { message: String },

    /// External transcoder exited unsuccessfully
    #[error("Transcoder failed on {backend} backend (exit code {exit_code:?})\n{log_tail}\nCommand: {invocation}")]
    FatalProcessFailure {
        backend: Backend,
        exit_code: Option<i32>,
        log_tail: String,
        invocation: String,
    },

    /// Transcoder reported success but produced no output file
    #[error("Transcoder completed but output file was not created: {path}")]
    ArtifactMissingPostExecution { path: String },

    /// Assembly plan violates its ordering invariants
    #[error("Invalid assembly plan: {message}")]
    InvalidPlan { message: String },

    /// Configuration value could not be loaded or is out of range
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HighlightError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn missing(what: impl Into<String>, path: impl Into<String>) -> Self {
        Self::MissingArtifact {
            what: what.into(),
            path: path.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Result type alias for highlight operations
pub type HighlightResult<T> = std::result::Result<T, HighlightError>;
