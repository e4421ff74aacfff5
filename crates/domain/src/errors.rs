//! Error types used throughout the payroll workspace

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for payroll operations
///
/// Transport and server variants mirror what the REST backend can report.
/// `InvalidTransition` and `AlreadyFinalized` are raised by local guards
/// before any request is sent.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum PayrollError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Decoding error: {0}")]
    Decoding(String),

    #[error("Server error ({code}): {message}")]
    Server { code: u16, message: String },

    #[error("Invalid transition: cannot {event} a batch in state {from}")]
    InvalidTransition { from: String, event: String },

    #[error("Work entry {0} is already finalized")]
    AlreadyFinalized(i64),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Unknown error")]
    Unknown,
}

/// Coarse classification of a [`PayrollError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Connectivity, malformed URL or unreadable body. Safe to retry by hand.
    Transport,
    /// Explicit status/message from the remote service
    Server,
    /// Local guard violation, raised before any network call
    Domain,
    /// Missing or malformed configuration
    Configuration,
    /// Bugs and unclassified failures
    Internal,
}

impl PayrollError {
    /// Convenience constructor for lifecycle guard violations.
    pub fn invalid_transition(from: impl ToString, event: impl ToString) -> Self {
        Self::InvalidTransition { from: from.to_string(), event: event.to_string() }
    }

    /// Get the category for this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidUrl(_) | Self::InvalidResponse(_) | Self::Network(_) | Self::Decoding(_) => {
                ErrorCategory::Transport
            }
            Self::Server { .. } | Self::NotFound(_) => ErrorCategory::Server,
            Self::InvalidTransition { .. } | Self::AlreadyFinalized(_) | Self::InvalidInput(_) => {
                ErrorCategory::Domain
            }
            Self::Config(_) => ErrorCategory::Configuration,
            Self::Internal(_) | Self::Unknown => ErrorCategory::Internal,
        }
    }

    /// Whether the user may simply try the same action again.
    ///
    /// The core never retries on its own; this only drives caller guidance.
    pub fn is_user_retryable(&self) -> bool {
        match self {
            Self::Server { code, .. } => *code >= 500 || *code == 429,
            other => other.category() == ErrorCategory::Transport,
        }
    }

    /// Human-readable guidance for the error
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidUrl(_) => "The payroll service address is invalid.".to_string(),
            Self::InvalidResponse(_) | Self::Decoding(_) => {
                "The payroll service returned an unexpected response. Please try again."
                    .to_string()
            }
            Self::Network(_) => {
                "No connection to the payroll service. Check your connection and try again."
                    .to_string()
            }
            Self::Server { code: 409, message } => {
                format!("{message}. Choose a different batch number or refresh the list.")
            }
            Self::Server { message, .. } => message.clone(),
            Self::InvalidTransition { from, event } => {
                format!("This batch is {from} and cannot {event} right now.")
            }
            Self::AlreadyFinalized(id) => {
                format!("Work entry {id} has already been approved or rejected.")
            }
            Self::InvalidInput(message) | Self::NotFound(message) => message.clone(),
            Self::Config(_) => "The app is not configured correctly.".to_string(),
            Self::Internal(_) | Self::Unknown => {
                "An unexpected error occurred. Please try again or contact support.".to_string()
            }
        }
    }
}

/// Result type alias for payroll operations
pub type Result<T> = std::result::Result<T, PayrollError>;
