//! voice-notes - turn voice transcripts into actions
//!
//! A transcript goes to a reasoning engine together with a catalog of
//! actions. The actions it asks for are executed in order against an
//! Obsidian vault kept in a Git repository and, optionally, a calendar.
//! The outcomes go back to the engine for a closing summary.
//!
//! # Modules
//!
//! - `adapters`: External services (OpenAI, GitHub contents API, Google Calendar) and in-memory doubles
//! - `core`: Orchestrator, action catalog and registry, vault store, TODO mutation, date resolution
//! - `domain`: Data structures (ActionRequest, Conversation, Note, TODO layout, RunReport)
//! - `config`: Configuration file and environment resolution
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Process a transcript
//! echo "Напомни завтра в 15:00 позвонить маме" | voice-notes process
//!
//! # Try it without touching the vault or calendar
//! voice-notes process --dry-run "Add a high priority task to renew the passport"
//!
//! # See what the date resolver makes of a phrase
//! voice-notes resolve-date "15 марта в 10:30"
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use core::{ActionError, ActionRegistry, CalendarGateway, DateResolver, Orchestrator, TodoMutator, VaultStore};
pub use domain::{ActionOutcome, ActionRequest, Conversation, ProcessResponse, RunReport};

pub use adapters::{
    CalendarBackend, EngineReply, GitHubVault, GoogleCalendarClient, MemoryCalendar, MemoryVault, OpenAiEngine,
    ReasoningEngine, VaultBackend,
};
