//! Core processing logic.
//!
//! This module contains:
//! - DateResolver: date phrase resolution
//! - VaultStore and TodoMutator: versioned document mutation
//! - CalendarGateway: calendar facade
//! - Catalog and ActionRegistry: the action set and its dispatch
//! - Orchestrator: the transcript processing loop
//! - RunLog: append-only record of processed transcripts

pub mod calendar;
pub mod catalog;
pub mod dates;
pub mod error;
pub mod notes;
pub mod orchestrator;
pub mod prompt;
pub mod registry;
pub mod run_log;
pub mod todo;
pub mod vault;

// Re-export commonly used types
pub use calendar::CalendarGateway;
pub use catalog::{catalog, Action, ActionKind, DEFAULT_MAX_RESULTS};
pub use dates::DateResolver;
pub use error::ActionError;
pub use notes::NoteBook;
pub use orchestrator::{Orchestrator, NO_ACTION_SUMMARY};
pub use registry::{ActionRegistry, CalendarActions};
pub use run_log::RunLog;
pub use todo::TodoMutator;
pub use vault::{normalize_path, FileRecord, VaultStore};
