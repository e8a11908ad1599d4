//! Note operations: create, append, list and read.

use chrono::{DateTime, FixedOffset, Utc};
use tracing::{debug, info};

use super::error::ActionError;
use super::vault::VaultStore;
use crate::domain::{Folder, Note};

/// Notes stored in the vault's canonical folders
#[derive(Clone)]
pub struct NoteBook {
    vault: VaultStore,
    offset: FixedOffset,
}

impl NoteBook {
    pub fn new(vault: VaultStore, offset: FixedOffset) -> Self {
        Self { vault, offset }
    }

    /// Write a note dated today and return its path
    pub async fn create(&self, title: &str, content: &str, folder: Folder) -> Result<String, ActionError> {
        self.create_at(title, content, folder, Utc::now().with_timezone(&self.offset))
            .await
    }

    /// Write a note dated `now`; an existing note at the same path is replaced
    pub async fn create_at(
        &self,
        title: &str,
        content: &str,
        folder: Folder,
        now: DateTime<FixedOffset>,
    ) -> Result<String, ActionError> {
        let note = Note::new(title, folder, content, now);
        let path = note.path();

        self.vault
            .upsert(&path, &note.render(), &format!("Add voice note: {}", note.title.trim()))
            .await?;

        info!(path = %path, "Saved note");
        Ok(path)
    }

    /// Append a paragraph to an existing note
    pub async fn append(&self, path: &str, content: &str) -> Result<(), ActionError> {
        let existing = self
            .vault
            .read(path)
            .await?
            .ok_or_else(|| ActionError::NotFound(path.to_string()))?;

        let updated = format!("{}\n\n{}", existing.content, content);
        self.vault
            .update(
                &existing.path,
                &updated,
                &existing.revision,
                &format!("Update note: {}", existing.path),
            )
            .await?;

        info!(path = %existing.path, "Appended to note");
        Ok(())
    }

    /// Markdown note paths, optionally restricted to one folder and filtered
    /// by a case-insensitive substring of the path.
    ///
    /// Without a folder all canonical folders are searched and missing ones
    /// are skipped. A missing folder that was asked for by name is `NotFound`.
    pub async fn list(&self, folder: Option<Folder>, query: Option<&str>) -> Result<Vec<String>, ActionError> {
        let mut paths = Vec::new();

        match folder {
            Some(folder) => {
                paths.extend(self.folder_notes(folder).await?);
            }
            None => {
                for folder in Folder::ALL {
                    match self.folder_notes(folder).await {
                        Ok(found) => paths.extend(found),
                        Err(ActionError::NotFound(_)) => {
                            debug!(folder = %folder, "Folder missing, skipping");
                        }
                        Err(e) => return Err(e),
                    }
                }
            }
        }

        if let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) {
            let needle = query.to_lowercase();
            paths.retain(|path| path.to_lowercase().contains(&needle));
        }

        Ok(paths)
    }

    /// Full content of a note
    pub async fn read(&self, path: &str) -> Result<String, ActionError> {
        self.vault
            .read(path)
            .await?
            .map(|record| record.content)
            .ok_or_else(|| ActionError::NotFound(path.to_string()))
    }

    async fn folder_notes(&self, folder: Folder) -> Result<Vec<String>, ActionError> {
        Ok(self
            .vault
            .list_folder(folder.as_str())
            .await?
            .into_iter()
            .filter(|name| name.ends_with(".md"))
            .map(|name| format!("{}/{}", folder.as_str(), name))
            .collect())
    }
}
