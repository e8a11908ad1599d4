//! Action dispatch.
//!
//! Each handler group holds only the collaborators it needs. Handler
//! failures never escape `execute`: they become outcome text for the
//! reasoning engine.

use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::calendar::CalendarGateway;
use super::catalog::{catalog, Action};
use super::dates::DateResolver;
use super::error::ActionError;
use super::notes::NoteBook;
use super::todo::TodoMutator;
use super::vault::VaultStore;
use crate::adapters::ToolSpec;
use crate::domain::event_end;

/// Calendar handlers; the gateway is absent when no calendar is configured
#[derive(Clone)]
pub struct CalendarActions {
    gateway: Option<CalendarGateway>,
    dates: DateResolver,
}

impl CalendarActions {
    pub fn new(gateway: Option<CalendarGateway>, dates: DateResolver) -> Self {
        Self { gateway, dates }
    }

    pub fn is_enabled(&self) -> bool {
        self.gateway.is_some()
    }

    fn gateway(&self) -> Result<&CalendarGateway, ActionError> {
        self.gateway.as_ref().ok_or(ActionError::NotConfigured("Calendar"))
    }

    async fn create_event(
        &self,
        title: &str,
        start_date: &str,
        duration_minutes: Option<i64>,
        description: Option<&str>,
        location: Option<&str>,
    ) -> Result<String, ActionError> {
        let gateway = self.gateway()?;
        let start = self.dates.resolve(start_date);
        let end = event_end(start, duration_minutes, None)?;

        gateway.create_event(title, start, end, description, location).await?;

        Ok(format!(
            "Event '{}' created for {} (duration: {} min)",
            title,
            start.format("%d.%m.%Y %H:%M"),
            (end - start).num_minutes()
        ))
    }

    async fn list_events(&self, max_results: usize) -> Result<String, ActionError> {
        let events = self.gateway()?.list_upcoming(max_results).await?;
        if events.is_empty() {
            return Ok("No upcoming events in the calendar.".to_string());
        }

        let lines: Vec<String> = events
            .iter()
            .enumerate()
            .map(|(i, event)| {
                format!(
                    "{}. {} - {}",
                    i + 1,
                    event.title,
                    event
                        .start
                        .with_timezone(&self.dates.offset())
                        .format("%d.%m.%Y %H:%M")
                )
            })
            .collect();

        Ok(format!("Upcoming events ({}):\n{}", events.len(), lines.join("\n")))
    }
}

/// Executes catalog actions against the vault, the TODO list and the calendar
#[derive(Clone)]
pub struct ActionRegistry {
    notes: NoteBook,
    todo: TodoMutator,
    calendar: CalendarActions,
}

impl ActionRegistry {
    pub fn new(notes: NoteBook, todo: TodoMutator, calendar: CalendarActions) -> Self {
        Self { notes, todo, calendar }
    }

    /// Wire all handler groups from one vault, an optional calendar and a resolver
    pub fn from_parts(vault: VaultStore, calendar: Option<CalendarGateway>, dates: DateResolver) -> Self {
        Self::new(
            NoteBook::new(vault.clone(), dates.offset()),
            TodoMutator::new(vault),
            CalendarActions::new(calendar, dates),
        )
    }

    /// Schemas offered to the reasoning engine
    pub fn catalog(&self) -> Vec<ToolSpec> {
        catalog()
    }

    pub fn calendar_enabled(&self) -> bool {
        self.calendar.is_enabled()
    }

    /// Current local time in the configured offset
    pub fn now(&self) -> DateTime<FixedOffset> {
        self.calendar.dates.now()
    }

    /// Execute one request and describe the result.
    ///
    /// Unknown names produce "Unknown function: <name>"; any other failure
    /// produces "Error executing <name>: <reason>".
    pub async fn execute(&self, name: &str, arguments: &Map<String, Value>) -> String {
        let action = match Action::parse(name, arguments) {
            Ok(action) => action,
            Err(e @ ActionError::UnknownAction(_)) => {
                warn!(action = name, "Unknown action requested");
                return e.to_string();
            }
            Err(e) => {
                warn!(action = name, error = %e, "Rejected action arguments");
                return format!("Error executing {}: {}", name, e);
            }
        };

        debug!(action = action.kind().name(), "Dispatching action");
        match self.dispatch(action).await {
            Ok(result) => result,
            Err(e) => {
                warn!(action = name, error = %e, "Action failed");
                format!("Error executing {}: {}", name, e)
            }
        }
    }

    async fn dispatch(&self, action: Action) -> Result<String, ActionError> {
        match action {
            Action::CreateCalendarEvent {
                title,
                start_date,
                duration_minutes,
                description,
                location,
            } => {
                self.calendar
                    .create_event(
                        &title,
                        &start_date,
                        duration_minutes,
                        description.as_deref(),
                        location.as_deref(),
                    )
                    .await
            }
            Action::ListCalendarEvents { max_results } => self.calendar.list_events(max_results).await,
            Action::CreateNote { title, content, folder } => {
                let path = self.notes.create(&title, &content, folder).await?;
                Ok(format!("Note '{}' created at {}", title, path))
            }
            Action::AddTodoTask {
                task,
                priority,
                due_date,
            } => {
                let line = self.todo.add_task(&task, priority, due_date.as_deref()).await?;
                Ok(format!("Task added to TODO.md ({} priority): {}", priority, line))
            }
            Action::AppendToNote { note_path, content } => {
                self.notes.append(&note_path, &content).await?;
                Ok(format!("Content appended to note {}", note_path))
            }
            Action::ListNotes { folder, search_query } => {
                let paths = self.notes.list(folder, search_query.as_deref()).await?;
                let location = match folder {
                    Some(folder) => format!("folder {}", folder),
                    None => "the vault".to_string(),
                };

                if paths.is_empty() {
                    return Ok(match search_query {
                        Some(query) => format!("No notes in {} matching '{}'", location, query),
                        None => format!("No notes in {}", location),
                    });
                }

                let listing: Vec<String> = paths.iter().map(|p| format!("- {}", p)).collect();
                Ok(format!("Notes in {}:\n{}", location, listing.join("\n")))
            }
            Action::ReadNote { note_path } => {
                let content = self.notes.read(&note_path).await?;
                Ok(format!("Note: {}\n\n{}", note_path, content))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;

    use crate::adapters::{MemoryCalendar, MemoryVault};

    fn offset() -> FixedOffset {
        FixedOffset::east_opt(3 * 3600).unwrap()
    }

    fn registry(backend: Arc<MemoryVault>, calendar: Option<Arc<MemoryCalendar>>) -> ActionRegistry {
        let gateway = calendar.map(|c| CalendarGateway::new(c, "primary", "Europe/Moscow", offset()));
        ActionRegistry::from_parts(VaultStore::new(backend), gateway, DateResolver::new(offset()))
    }

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_unknown_action_sentinel() {
        let registry = registry(Arc::new(MemoryVault::new()), None);
        let result = registry.execute("sendEmail", &Map::new()).await;
        assert_eq!(result, "Unknown function: sendEmail");
    }

    #[tokio::test]
    async fn test_calendar_not_configured() {
        let registry = registry(Arc::new(MemoryVault::new()), None);
        let result = registry
            .execute("listCalendarEvents", &args(json!({"maxResults": 3})))
            .await;
        assert_eq!(result, "Error executing listCalendarEvents: Calendar is not configured");
    }

    #[tokio::test]
    async fn test_create_event_reports_duration() {
        let calendar = Arc::new(MemoryCalendar::new());
        let registry = registry(Arc::new(MemoryVault::new()), Some(calendar.clone()));

        let result = registry
            .execute(
                "createCalendarEvent",
                &args(json!({"title": "Dentist", "startDate": "2030-05-04 16:30", "durationMinutes": 30})),
            )
            .await;

        assert_eq!(result, "Event 'Dentist' created for 04.05.2030 16:30 (duration: 30 min)");
        assert_eq!(calendar.created().len(), 1);
    }

    #[tokio::test]
    async fn test_huge_duration_is_an_outcome_not_a_panic() {
        let calendar = Arc::new(MemoryCalendar::new());
        let registry = registry(Arc::new(MemoryVault::new()), Some(calendar.clone()));

        let handle = tokio::spawn(async move {
            registry
                .execute(
                    "createCalendarEvent",
                    &args(json!({"title": "x", "startDate": "2030-01-01 10:00", "durationMinutes": 1_000_000_000_000i64})),
                )
                .await
        });
        let result = handle.await.unwrap();

        assert_eq!(
            result,
            "Error executing createCalendarEvent: Invalid arguments for createCalendarEvent: durationMinutes must be between 1 and 10080"
        );
        assert!(calendar.created().is_empty());
    }

    #[tokio::test]
    async fn test_add_todo_outcome() {
        let backend = Arc::new(MemoryVault::new());
        let registry = registry(backend.clone(), None);

        let result = registry
            .execute(
                "add_todo_task",
                &args(json!({"task": "Call mom", "priority": "high", "due_date": "2026-01-22"})),
            )
            .await;

        assert_eq!(
            result,
            "Task added to TODO.md (high priority): - [ ] Call mom (due: 2026-01-22)"
        );
        assert!(backend
            .content("TODO.md")
            .unwrap()
            .contains("## 🔴 High Priority\n\n- [ ] Call mom (due: 2026-01-22)"));
    }

    #[tokio::test]
    async fn test_read_missing_note_is_error_text() {
        let registry = registry(Arc::new(MemoryVault::new()), None);
        let result = registry
            .execute("readNote", &args(json!({"notePath": "Work/none.md"})))
            .await;
        assert_eq!(result, "Error executing readNote: Not found: Work/none.md");
    }

    #[tokio::test]
    async fn test_list_notes_empty_message() {
        let backend = Arc::new(MemoryVault::with_files([("Ideas/a.md", "")]));
        let registry = registry(backend, None);
        let result = registry
            .execute("listNotes", &args(json!({"searchQuery": "zzz"})))
            .await;
        assert_eq!(result, "No notes in the vault matching 'zzz'");
    }
}
