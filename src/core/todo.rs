//! Structural editor for the canonical TODO document.

use tracing::{info, warn};

use super::error::ActionError;
use super::vault::{FileRecord, VaultStore};
use crate::domain::todo::{insert_task, parse_sections, task_line};
use crate::domain::{Priority, Section, TODO_PATH, TODO_TEMPLATE};

/// Adds tasks to `TODO.md` under their priority section
#[derive(Clone)]
pub struct TodoMutator {
    vault: VaultStore,
}

impl TodoMutator {
    pub fn new(vault: VaultStore) -> Self {
        Self { vault }
    }

    /// Insert a task at the top of its priority section and return the line written.
    ///
    /// The document is created from the template on first use. The update is
    /// based on the revision read here; a concurrent edit fails with `Conflict`.
    pub async fn add_task(
        &self,
        task: &str,
        priority: Priority,
        due_date: Option<&str>,
    ) -> Result<String, ActionError> {
        let current = self.load_or_create().await?;

        let line = task_line(task, due_date);
        let updated = insert_task(&current.content, priority, &line)?;

        self.vault
            .update(
                TODO_PATH,
                &updated,
                &current.revision,
                &format!("Add TODO: {}", task.trim()),
            )
            .await?;

        info!(priority = %priority, "Added TODO task");
        Ok(line)
    }

    /// Tasks grouped by section, in document order
    pub async fn sections(&self) -> Result<Vec<Section>, ActionError> {
        match self.vault.read(TODO_PATH).await? {
            Some(record) => parse_sections(&record.content),
            None => parse_sections(TODO_TEMPLATE),
        }
    }

    async fn load_or_create(&self) -> Result<FileRecord, ActionError> {
        if let Some(record) = self.vault.read(TODO_PATH).await? {
            return Ok(record);
        }

        match self.vault.create(TODO_PATH, TODO_TEMPLATE, "Create TODO.md").await {
            Ok(record) => return Ok(record),
            Err(ActionError::AlreadyExists(_)) => {
                warn!("TODO.md appeared while creating it, re-reading");
            }
            Err(e) => return Err(e),
        }

        self.vault
            .read(TODO_PATH)
            .await?
            .ok_or_else(|| ActionError::NotFound(TODO_PATH.to_string()))
    }
}
