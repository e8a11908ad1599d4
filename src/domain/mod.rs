//! Domain types for voice-notes.
//!
//! This module contains the core data structures:
//! - Action requests and outcomes
//! - Conversation turns
//! - Notes, the TODO layout and calendar events
//! - Run phases, reports and records

pub mod action;
pub mod conversation;
pub mod event;
pub mod note;
pub mod run;
pub mod todo;

// Re-export commonly used types
pub use action::{ActionOutcome, ActionRequest};
pub use conversation::{Conversation, Turn};
pub use event::{event_end, CalendarEvent, UpcomingEvent, DEFAULT_DURATION_MINUTES, MAX_DURATION_MINUTES};
pub use note::{Folder, Note};
pub use run::{ProcessResponse, RunPhase, RunRecord, RunReport};
pub use todo::{Priority, Section, SectionKind, TODO_PATH, TODO_TEMPLATE};
