//! In-memory vault and calendar backends.
//!
//! Both honor the same contracts as the remote backends: creates collide,
//! stale revisions are rejected, missing directories are `NotFound`.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use super::{CalendarBackend, EntryKind, RemoteEntry, RemoteFile, VaultBackend};
use crate::core::ActionError;
use crate::domain::{CalendarEvent, UpcomingEvent};

/// A commit recorded by the in-memory vault
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub path: String,
    pub message: String,
    pub revision: String,
}

#[derive(Debug, Default)]
struct VaultState {
    files: BTreeMap<String, RemoteFile>,
    commits: Vec<Commit>,
}

/// In-memory vault backend
#[derive(Debug, Default)]
pub struct MemoryVault {
    state: Mutex<VaultState>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a vault pre-populated with files (no commits recorded)
    pub fn with_files<I, P, C>(files: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: Into<String>,
        C: Into<String>,
    {
        let vault = Self::new();
        {
            let mut state = vault.lock();
            for (path, content) in files {
                let path = path.into();
                let content = content.into();
                let revision = revision_for(&path, &content, 0);
                state.files.insert(
                    path.clone(),
                    RemoteFile {
                        path,
                        content,
                        revision,
                    },
                );
            }
        }
        vault
    }

    /// Current content of a file
    pub fn content(&self, path: &str) -> Option<String> {
        self.lock().files.get(path).map(|f| f.content.clone())
    }

    /// All file paths, sorted
    pub fn paths(&self) -> Vec<String> {
        self.lock().files.keys().cloned().collect()
    }

    /// Commits in the order they were made
    pub fn commits(&self) -> Vec<Commit> {
        self.lock().commits.clone()
    }

    fn lock(&self) -> MutexGuard<'_, VaultState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl VaultBackend for MemoryVault {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, path: &str) -> Result<Option<RemoteFile>, ActionError> {
        Ok(self.lock().files.get(path).cloned())
    }

    async fn put(
        &self,
        path: &str,
        content: &str,
        revision: Option<&str>,
        message: &str,
    ) -> Result<String, ActionError> {
        let mut state = self.lock();

        match (state.files.get(path), revision) {
            (Some(_), None) => return Err(ActionError::AlreadyExists(path.to_string())),
            (None, Some(_)) => return Err(ActionError::NotFound(path.to_string())),
            (Some(existing), Some(expected)) if existing.revision != expected => {
                return Err(ActionError::Conflict {
                    path: path.to_string(),
                    revision: expected.to_string(),
                });
            }
            _ => {}
        }

        let new_revision = revision_for(path, content, state.commits.len() + 1);
        state.files.insert(
            path.to_string(),
            RemoteFile {
                path: path.to_string(),
                content: content.to_string(),
                revision: new_revision.clone(),
            },
        );
        state.commits.push(Commit {
            path: path.to_string(),
            message: message.to_string(),
            revision: new_revision.clone(),
        });

        Ok(new_revision)
    }

    async fn list(&self, path: &str) -> Result<Vec<RemoteEntry>, ActionError> {
        let state = self.lock();
        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{}/", path)
        };

        let mut entries: BTreeMap<String, EntryKind> = BTreeMap::new();
        for file_path in state.files.keys() {
            let Some(rest) = file_path.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((dir, _)) => {
                    entries.insert(dir.to_string(), EntryKind::Dir);
                }
                None => {
                    entries.insert(rest.to_string(), EntryKind::File);
                }
            }
        }

        if entries.is_empty() && !path.is_empty() {
            return Err(ActionError::NotFound(path.to_string()));
        }

        Ok(entries
            .into_iter()
            .map(|(name, kind)| RemoteEntry { name, kind })
            .collect())
    }
}

/// Revision token: hash of path, content and commit sequence number
fn revision_for(path: &str, content: &str, sequence: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.as_bytes());
    hasher.update([0u8]);
    hasher.update(content.as_bytes());
    hasher.update(sequence.to_le_bytes());
    hex::encode(&hasher.finalize()[..20])
}

/// In-memory calendar backend
#[derive(Debug, Default)]
pub struct MemoryCalendar {
    events: Mutex<Vec<UpcomingEvent>>,
    created: Mutex<Vec<CalendarEvent>>,
}

impl MemoryCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing event
    pub fn push(&self, event: UpcomingEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }

    /// Events created through `insert`, in order
    pub fn created(&self) -> Vec<CalendarEvent> {
        self.created
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl CalendarBackend for MemoryCalendar {
    fn name(&self) -> &str {
        "memory"
    }

    async fn insert(&self, _calendar_id: &str, event: &CalendarEvent) -> Result<String, ActionError> {
        let mut events = self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let id = format!("evt-{}", events.len() + 1);
        events.push(UpcomingEvent {
            id: id.clone(),
            title: event.title.clone(),
            start: event.start,
            end: event.end,
        });
        drop(events);

        self.created
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.clone());
        Ok(id)
    }

    /// Earliest `limit` events starting at or after `from`
    async fn list_from(
        &self,
        _calendar_id: &str,
        from: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<UpcomingEvent>, ActionError> {
        let events = self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut upcoming: Vec<UpcomingEvent> = events.iter().filter(|e| e.start >= from).cloned().collect();
        upcoming.sort_by_key(|e| e.start);
        upcoming.truncate(limit);
        Ok(upcoming)
    }
}
