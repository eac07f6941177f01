//! Error types for feedback-moderator

use crate::feedback::ModerationState;
use thiserror::Error;

/// Main error type for feedback-moderator
#[derive(Debug, Error)]
pub enum ModerationError {
    /// Operation not allowed from the current state
    #[error("Cannot {operation} feedback in state '{from}'")]
    InvalidTransition {
        from: ModerationState,
        operation: &'static str,
    },

    /// Classifier could not produce a decision
    #[error("Classifier unavailable: {0}")]
    ClassifierUnavailable(String),

    /// Feedback not found
    #[error("Feedback not found: {0}")]
    FeedbackNotFound(String),

    /// Stored record moved on since it was loaded
    #[error("Feedback {id} was modified concurrently (expected version {expected}, found {found})")]
    Conflict { id: String, expected: u64, found: u64 },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Unsupported schema version
    #[error("Unsupported schema version: {0}")]
    UnsupportedSchemaVersion(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ModerationError>,
    },
}

impl ModerationError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ModerationError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Whether the error is an optimistic-lock conflict (looking through context)
    pub fn is_conflict(&self) -> bool {
        match self {
            ModerationError::Conflict { .. } => true,
            ModerationError::WithContext { source, .. } => source.is_conflict(),
            _ => false,
        }
    }
}

/// Result type alias for feedback-moderator
pub type Result<T> = std::result::Result<T, ModerationError>;
