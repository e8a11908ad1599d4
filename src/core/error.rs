//! Error taxonomy shared by the vault, TODO, calendar and action layers.
//!
//! Handlers never let these escape a batch: the registry renders them into
//! outcome text that is fed back to the reasoning engine.

use thiserror::Error;

/// Errors raised while executing a single action or vault mutation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Revision conflict on {path}: revision {revision} is stale")]
    Conflict { path: String, revision: String },

    #[error("Section '{header}' not found in {document}")]
    SectionNotFound { document: String, header: String },

    #[error("Unknown function: {0}")]
    UnknownAction(String),

    #[error("Invalid arguments for {action}: {reason}")]
    InvalidArguments { action: String, reason: String },

    #[error("Invalid vault path: '{0}'")]
    InvalidPath(String),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("{service} request failed: {message}")]
    Upstream {
        service: &'static str,
        message: String,
    },

    /// A computed timestamp is out of range. Date phrases themselves never
    /// fail: they fall back to "tomorrow".
    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

impl ActionError {
    /// Wrap a transport error from a remote service
    pub fn upstream(service: &'static str, error: impl std::fmt::Display) -> Self {
        Self::Upstream {
            service,
            message: error.to_string(),
        }
    }

    /// Whether the error came from a remote transport rather than from input
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream { .. })
    }
}
