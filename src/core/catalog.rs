//! The fixed action catalog.
//!
//! `ActionKind` enumerates every action the reasoning engine may request.
//! The schemas offered to the engine and the typed `Action` values handed to
//! the registry are both derived from it.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::error::ActionError;
use crate::adapters::ToolSpec;
use crate::domain::{Folder, Priority, MAX_DURATION_MINUTES};

/// Default number of calendar events returned by `listCalendarEvents`
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Every action in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    CreateCalendarEvent,
    ListCalendarEvents,
    CreateNote,
    AddTodoTask,
    AppendToNote,
    ListNotes,
    ReadNote,
}

impl ActionKind {
    pub const ALL: [ActionKind; 7] = [
        ActionKind::CreateCalendarEvent,
        ActionKind::ListCalendarEvents,
        ActionKind::CreateNote,
        ActionKind::AddTodoTask,
        ActionKind::AppendToNote,
        ActionKind::ListNotes,
        ActionKind::ReadNote,
    ];

    /// Name offered to the reasoning engine
    pub fn name(self) -> &'static str {
        match self {
            ActionKind::CreateCalendarEvent => "createCalendarEvent",
            ActionKind::ListCalendarEvents => "listCalendarEvents",
            ActionKind::CreateNote => "createNote",
            ActionKind::AddTodoTask => "addTodoTask",
            ActionKind::AppendToNote => "appendToNote",
            ActionKind::ListNotes => "listNotes",
            ActionKind::ReadNote => "readNote",
        }
    }

    fn snake_name(self) -> &'static str {
        match self {
            ActionKind::CreateCalendarEvent => "create_calendar_event",
            ActionKind::ListCalendarEvents => "list_calendar_events",
            ActionKind::CreateNote => "create_note",
            ActionKind::AddTodoTask => "add_todo_task",
            ActionKind::AppendToNote => "append_to_note",
            ActionKind::ListNotes => "list_notes",
            ActionKind::ReadNote => "read_note",
        }
    }

    /// Look up an action by its camelCase or snake_case name
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name || kind.snake_name() == name)
    }

    pub fn is_calendar(self) -> bool {
        matches!(self, ActionKind::CreateCalendarEvent | ActionKind::ListCalendarEvents)
    }

    /// Schema description offered to the reasoning engine
    pub fn spec(self) -> ToolSpec {
        let (description, parameters) = match self {
            ActionKind::CreateCalendarEvent => (
                "Create a calendar event. Use for meetings, calls, appointments and reminders with a specific date or time.",
                json!({
                    "type": "object",
                    "properties": {
                        "title": {"type": "string", "description": "Event title"},
                        "startDate": {
                            "type": "string",
                            "description": "Start date and time, e.g. '2026-01-20 15:00', 'завтра в 15:00', '3 февраля 10:00'"
                        },
                        "durationMinutes": {"type": "integer", "description": "Duration in minutes", "default": 60, "minimum": 1, "maximum": MAX_DURATION_MINUTES},
                        "description": {"type": "string", "description": "Event description"},
                        "location": {"type": "string", "description": "Event location"}
                    },
                    "required": ["title", "startDate"]
                }),
            ),
            ActionKind::ListCalendarEvents => (
                "List upcoming calendar events.",
                json!({
                    "type": "object",
                    "properties": {
                        "maxResults": {"type": "integer", "description": "Maximum number of events", "default": DEFAULT_MAX_RESULTS}
                    }
                }),
            ),
            ActionKind::CreateNote => (
                "Create a Markdown note in the Obsidian vault. Use for ideas, thoughts, work and personal notes.",
                json!({
                    "type": "object",
                    "properties": {
                        "title": {"type": "string", "description": "Note title without the .md extension"},
                        "content": {"type": "string", "description": "Note body in Markdown"},
                        "folder": {
                            "type": "string",
                            "enum": Folder::ALL.iter().map(|f| f.as_str()).collect::<Vec<_>>(),
                            "default": Folder::default().as_str()
                        }
                    },
                    "required": ["title", "content"]
                }),
            ),
            ActionKind::AddTodoTask => (
                "Add a task to the TODO list. Use for things to do without a fixed time.",
                json!({
                    "type": "object",
                    "properties": {
                        "task": {"type": "string", "description": "Task description"},
                        "priority": {"type": "string", "enum": ["high", "medium", "low"], "default": "medium"},
                        "dueDate": {"type": "string", "description": "Due date in YYYY-MM-DD format"}
                    },
                    "required": ["task"]
                }),
            ),
            ActionKind::AppendToNote => (
                "Append content to the end of an existing note. Use when the user asks to add to or extend a note; find its path with listNotes first.",
                json!({
                    "type": "object",
                    "properties": {
                        "notePath": {"type": "string", "description": "Path relative to the vault, e.g. 'Work/2026-01-20-Project X.md'"},
                        "content": {"type": "string", "description": "Markdown to append"}
                    },
                    "required": ["notePath", "content"]
                }),
            ),
            ActionKind::ListNotes => (
                "List notes in one folder or in all folders, optionally filtered by a title search.",
                json!({
                    "type": "object",
                    "properties": {
                        "folder": {
                            "type": "string",
                            "enum": Folder::ALL.iter().map(|f| f.as_str()).collect::<Vec<_>>(),
                            "description": "Folder to search; omit to search all folders"
                        },
                        "searchQuery": {"type": "string", "description": "Case-insensitive substring of the note path"}
                    }
                }),
            ),
            ActionKind::ReadNote => (
                "Read the full content of a note.",
                json!({
                    "type": "object",
                    "properties": {
                        "notePath": {"type": "string", "description": "Path relative to the vault, e.g. 'Work/2026-01-20-Project X.md'"}
                    },
                    "required": ["notePath"]
                }),
            ),
        };

        ToolSpec {
            name: self.name().to_string(),
            description: description.to_string(),
            parameters,
        }
    }
}

/// Schemas for every action, in catalog order
pub fn catalog() -> Vec<ToolSpec> {
    ActionKind::ALL.into_iter().map(ActionKind::spec).collect()
}

/// A validated action ready for dispatch
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    CreateCalendarEvent {
        title: String,
        start_date: String,
        duration_minutes: Option<i64>,
        description: Option<String>,
        location: Option<String>,
    },
    ListCalendarEvents {
        max_results: usize,
    },
    CreateNote {
        title: String,
        content: String,
        folder: Folder,
    },
    AddTodoTask {
        task: String,
        priority: Priority,
        due_date: Option<String>,
    },
    AppendToNote {
        note_path: String,
        content: String,
    },
    ListNotes {
        folder: Option<Folder>,
        search_query: Option<String>,
    },
    ReadNote {
        note_path: String,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCalendarEventArgs {
    title: String,
    #[serde(alias = "start_date")]
    start_date: String,
    #[serde(default, alias = "duration_minutes")]
    duration_minutes: Option<i64>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    location: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListCalendarEventsArgs {
    #[serde(default, alias = "max_results")]
    max_results: Option<usize>,
}

#[derive(Deserialize)]
struct CreateNoteArgs {
    title: String,
    content: String,
    #[serde(default)]
    folder: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddTodoTaskArgs {
    task: String,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default, alias = "due_date")]
    due_date: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendToNoteArgs {
    #[serde(alias = "note_path")]
    note_path: String,
    content: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListNotesArgs {
    #[serde(default)]
    folder: Option<String>,
    #[serde(default, alias = "search_query")]
    search_query: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReadNoteArgs {
    #[serde(alias = "note_path")]
    note_path: String,
}

impl Action {
    /// Decode and validate a request's arguments
    pub fn parse(name: &str, arguments: &Map<String, Value>) -> Result<Self, ActionError> {
        let kind = ActionKind::from_name(name).ok_or_else(|| ActionError::UnknownAction(name.to_string()))?;
        let invalid = |reason: String| ActionError::InvalidArguments {
            action: kind.name().to_string(),
            reason,
        };

        let action = match kind {
            ActionKind::CreateCalendarEvent => {
                let args: CreateCalendarEventArgs = decode(kind, arguments)?;
                if args
                    .duration_minutes
                    .is_some_and(|d| !(1..=MAX_DURATION_MINUTES).contains(&d))
                {
                    return Err(invalid(format!(
                        "durationMinutes must be between 1 and {}",
                        MAX_DURATION_MINUTES
                    )));
                }
                Action::CreateCalendarEvent {
                    title: required(args.title, "title").map_err(invalid)?,
                    start_date: args.start_date,
                    duration_minutes: args.duration_minutes,
                    description: non_empty(args.description),
                    location: non_empty(args.location),
                }
            }
            ActionKind::ListCalendarEvents => {
                let args: ListCalendarEventsArgs = decode(kind, arguments)?;
                Action::ListCalendarEvents {
                    max_results: args.max_results.filter(|n| *n > 0).unwrap_or(DEFAULT_MAX_RESULTS),
                }
            }
            ActionKind::CreateNote => {
                let args: CreateNoteArgs = decode(kind, arguments)?;
                let folder = match non_empty(args.folder) {
                    Some(name) => parse_folder(&name).map_err(invalid)?,
                    None => Folder::default(),
                };
                Action::CreateNote {
                    title: required(args.title, "title").map_err(invalid)?,
                    content: args.content,
                    folder,
                }
            }
            ActionKind::AddTodoTask => {
                let args: AddTodoTaskArgs = decode(kind, arguments)?;
                let priority = match non_empty(args.priority) {
                    Some(value) => Priority::parse(&value)
                        .ok_or_else(|| invalid(format!("unknown priority '{}', expected high, medium or low", value)))?,
                    None => Priority::default(),
                };
                let due_date = match non_empty(args.due_date) {
                    Some(value) => {
                        NaiveDate::parse_from_str(&value, "%Y-%m-%d")
                            .map_err(|_| invalid(format!("dueDate '{}' is not a YYYY-MM-DD date", value)))?;
                        Some(value)
                    }
                    None => None,
                };
                Action::AddTodoTask {
                    task: required(args.task, "task").map_err(invalid)?,
                    priority,
                    due_date,
                }
            }
            ActionKind::AppendToNote => {
                let args: AppendToNoteArgs = decode(kind, arguments)?;
                Action::AppendToNote {
                    note_path: required(args.note_path, "notePath").map_err(invalid)?,
                    content: args.content,
                }
            }
            ActionKind::ListNotes => {
                let args: ListNotesArgs = decode(kind, arguments)?;
                let folder = match non_empty(args.folder) {
                    Some(name) => Some(parse_folder(&name).map_err(invalid)?),
                    None => None,
                };
                Action::ListNotes {
                    folder,
                    search_query: non_empty(args.search_query),
                }
            }
            ActionKind::ReadNote => {
                let args: ReadNoteArgs = decode(kind, arguments)?;
                Action::ReadNote {
                    note_path: required(args.note_path, "notePath").map_err(invalid)?,
                }
            }
        };

        Ok(action)
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Action::CreateCalendarEvent { .. } => ActionKind::CreateCalendarEvent,
            Action::ListCalendarEvents { .. } => ActionKind::ListCalendarEvents,
            Action::CreateNote { .. } => ActionKind::CreateNote,
            Action::AddTodoTask { .. } => ActionKind::AddTodoTask,
            Action::AppendToNote { .. } => ActionKind::AppendToNote,
            Action::ListNotes { .. } => ActionKind::ListNotes,
            Action::ReadNote { .. } => ActionKind::ReadNote,
        }
    }
}

fn decode<T: DeserializeOwned>(kind: ActionKind, arguments: &Map<String, Value>) -> Result<T, ActionError> {
    serde_json::from_value(Value::Object(arguments.clone())).map_err(|e| ActionError::InvalidArguments {
        action: kind.name().to_string(),
        reason: e.to_string(),
    })
}

fn required(value: String, field: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(format!("{} must not be empty", field))
    } else {
        Ok(trimmed.to_string())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_folder(name: &str) -> Result<Folder, String> {
    Folder::parse(name).ok_or_else(|| {
        format!(
            "unknown folder '{}', expected one of: {}",
            name,
            Folder::ALL.iter().map(|f| f.as_str()).collect::<Vec<_>>().join(", ")
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_catalog_names_round_trip() {
        for spec in catalog() {
            let kind = ActionKind::from_name(&spec.name).unwrap();
            assert_eq!(kind.spec().name, spec.name);
        }
        assert_eq!(catalog().len(), 7);
        assert_eq!(ActionKind::ALL.iter().filter(|k| k.is_calendar()).count(), 2);
    }

    #[test]
    fn test_snake_case_names_and_params_accepted() {
        let action = Action::parse("append_to_note", &args(json!({"note_path": "Work/a.md", "content": "x"}))).unwrap();
        assert_eq!(
            action,
            Action::AppendToNote {
                note_path: "Work/a.md".to_string(),
                content: "x".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_action() {
        let err = Action::parse("deleteEverything", &Map::new()).unwrap_err();
        assert_eq!(err.to_string(), "Unknown function: deleteEverything");
    }

    #[test]
    fn test_defaults_applied() {
        let note = Action::parse("createNote", &args(json!({"title": "Idea", "content": "body"}))).unwrap();
        assert!(matches!(note, Action::CreateNote { folder: Folder::VoiceNotes, .. }));

        let todo = Action::parse("addTodoTask", &args(json!({"task": "Call mom"}))).unwrap();
        assert!(matches!(
            todo,
            Action::AddTodoTask {
                priority: Priority::Medium,
                due_date: None,
                ..
            }
        ));

        let list = Action::parse("listCalendarEvents", &Map::new()).unwrap();
        assert_eq!(list, Action::ListCalendarEvents { max_results: 5 });
    }

    #[test]
    fn test_invalid_due_date_rejected() {
        let err = Action::parse("addTodoTask", &args(json!({"task": "x", "dueDate": "next friday"}))).unwrap_err();
        assert!(matches!(err, ActionError::InvalidArguments { .. }));
    }

    #[test]
    fn test_duration_outside_bounds_rejected() {
        for minutes in [0, -30, MAX_DURATION_MINUTES + 1, 1_000_000_000_000] {
            let err = Action::parse(
                "createCalendarEvent",
                &args(json!({"title": "x", "startDate": "2030-01-01 10:00", "durationMinutes": minutes})),
            )
            .unwrap_err();
            assert_eq!(
                err.to_string(),
                "Invalid arguments for createCalendarEvent: durationMinutes must be between 1 and 10080"
            );
        }

        let week = Action::parse(
            "createCalendarEvent",
            &args(json!({"title": "Trip", "startDate": "2030-01-01", "durationMinutes": MAX_DURATION_MINUTES})),
        );
        assert!(week.is_ok());
    }

    #[test]
    fn test_missing_required_field_rejected() {
        let err = Action::parse("readNote", &Map::new()).unwrap_err();
        match err {
            ActionError::InvalidArguments { action, reason } => {
                assert_eq!(action, "readNote");
                assert!(reason.contains("notePath"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_folder_rejected() {
        let err = Action::parse("listNotes", &args(json!({"folder": "Archive"}))).unwrap_err();
        assert!(err.to_string().contains("Archive"));
    }
}
