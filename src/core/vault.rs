//! Versioned document store over a vault backend.
//!
//! Every mutation is a single remote commit. Updates carry the revision they
//! were based on; a stale revision is rejected, never merged.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use super::error::ActionError;
use crate::adapters::{EntryKind, RemoteFile, VaultBackend};

/// One stored version of one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: String,
    pub content: String,
    pub revision: String,
}

impl From<RemoteFile> for FileRecord {
    fn from(file: RemoteFile) -> Self {
        Self {
            path: file.path,
            content: file.content,
            revision: file.revision,
        }
    }
}

/// Path-addressed document store with optimistic revisions
#[derive(Clone)]
pub struct VaultStore {
    backend: Arc<dyn VaultBackend>,
}

impl VaultStore {
    pub fn new(backend: Arc<dyn VaultBackend>) -> Self {
        Self { backend }
    }

    /// Name of the underlying backend
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Read a document; `None` when absent
    #[instrument(skip(self))]
    pub async fn read(&self, path: &str) -> Result<Option<FileRecord>, ActionError> {
        let path = normalize_path(path)?;
        Ok(self.backend.get(&path).await?.map(FileRecord::from))
    }

    /// Create a document that must not exist yet
    #[instrument(skip(self, content))]
    pub async fn create(&self, path: &str, content: &str, message: &str) -> Result<FileRecord, ActionError> {
        let path = normalize_path(path)?;
        let revision = self.backend.put(&path, content, None, message).await?;
        info!(path = %path, "Created document");

        Ok(FileRecord {
            path,
            content: content.to_string(),
            revision,
        })
    }

    /// Replace a document based on `revision`
    #[instrument(skip(self, content))]
    pub async fn update(
        &self,
        path: &str,
        content: &str,
        revision: &str,
        message: &str,
    ) -> Result<FileRecord, ActionError> {
        let path = normalize_path(path)?;
        let new_revision = self.backend.put(&path, content, Some(revision), message).await?;
        info!(path = %path, "Updated document");

        Ok(FileRecord {
            path,
            content: content.to_string(),
            revision: new_revision,
        })
    }

    /// Create or replace a document.
    ///
    /// Read and write are separate calls, so a concurrent writer between
    /// them surfaces as `Conflict` or `AlreadyExists`.
    pub async fn upsert(&self, path: &str, content: &str, message: &str) -> Result<FileRecord, ActionError> {
        match self.read(path).await? {
            Some(existing) => self.update(path, content, &existing.revision, message).await,
            None => self.create(path, content, message).await,
        }
    }

    /// File names directly inside `path`, sorted; directories are skipped
    #[instrument(skip(self))]
    pub async fn list_folder(&self, path: &str) -> Result<Vec<String>, ActionError> {
        let path = normalize_path(path)?;
        let mut names: Vec<String> = self
            .backend
            .list(&path)
            .await?
            .into_iter()
            .filter(|entry| entry.kind == EntryKind::File)
            .map(|entry| entry.name)
            .collect();
        names.sort();
        debug!(path = %path, count = names.len(), "Listed folder");
        Ok(names)
    }
}

/// Trim surrounding slashes and reject empty, `.` and `..` segments
pub fn normalize_path(path: &str) -> Result<String, ActionError> {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Err(ActionError::InvalidPath(path.to_string()));
    }

    let invalid = trimmed
        .split('/')
        .any(|segment| segment.trim().is_empty() || segment == "." || segment == "..");
    if invalid {
        return Err(ActionError::InvalidPath(path.to_string()));
    }

    Ok(trimmed.to_string())
}
