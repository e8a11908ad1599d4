//! Adapter interfaces for external systems.
//!
//! Adapters provide a unified interface for the three remote collaborators:
//! - a reasoning engine (OpenAI chat completions with tool calling)
//! - a vault backend (GitHub Contents API)
//! - a calendar backend (Google Calendar REST API)
//!
//! In-memory implementations of the vault and calendar backends live in
//! `memory` and are used for dry runs and tests.

pub mod github;
pub mod google_calendar;
pub mod memory;
pub mod openai;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::core::ActionError;
use crate::domain::{ActionRequest, CalendarEvent, Conversation, UpcomingEvent};

pub use github::GitHubVault;
pub use google_calendar::GoogleCalendarClient;
pub use memory::{MemoryCalendar, MemoryVault};
pub use openai::OpenAiEngine;

/// Schema description of one action offered to the reasoning engine
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,

    /// JSON Schema for the arguments object
    pub parameters: Value,
}

/// Reply from one reasoning engine round-trip
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineReply {
    /// Plain text content (may accompany action requests)
    pub text: Option<String>,

    /// Requested actions, in the order the engine listed them
    pub action_requests: Vec<ActionRequest>,
}

impl EngineReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            action_requests: Vec::new(),
        }
    }

    pub fn actions(action_requests: Vec<ActionRequest>) -> Self {
        Self {
            text: None,
            action_requests,
        }
    }

    pub fn has_actions(&self) -> bool {
        !self.action_requests.is_empty()
    }
}

/// Trait for reasoning engines
#[async_trait]
pub trait ReasoningEngine: Send + Sync {
    /// Human-readable engine name
    fn name(&self) -> &str;

    /// Submit the conversation; an empty `tools` slice disables tool calling
    async fn complete(&self, conversation: &Conversation, tools: &[ToolSpec]) -> Result<EngineReply>;
}

/// One stored version of a remote file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub path: String,
    pub content: String,

    /// Opaque token identifying this exact version
    pub revision: String,
}

/// Kind of directory entry in a vault listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    pub name: String,
    pub kind: EntryKind,
}

/// Trait for remote, path-addressed, versioned document trees
#[async_trait]
pub trait VaultBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch a file; `None` when the path does not exist
    async fn get(&self, path: &str) -> Result<Option<RemoteFile>, ActionError>;

    /// Write a file as one commit and return the new revision.
    ///
    /// Without `revision` this is a create and fails with `AlreadyExists`
    /// when the path is taken. With `revision` it is an update and fails
    /// with `Conflict` when the revision is stale.
    async fn put(
        &self,
        path: &str,
        content: &str,
        revision: Option<&str>,
        message: &str,
    ) -> Result<String, ActionError>;

    /// List a directory; `NotFound` when it does not exist
    async fn list(&self, path: &str) -> Result<Vec<RemoteEntry>, ActionError>;
}

/// Trait for remote calendars
#[async_trait]
pub trait CalendarBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Create an event and return its provider id
    async fn insert(&self, calendar_id: &str, event: &CalendarEvent) -> Result<String, ActionError>;

    /// The earliest `limit` events starting at or after `from`, in start order
    async fn list_from(
        &self,
        calendar_id: &str,
        from: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<UpcomingEvent>, ActionError>;
}
