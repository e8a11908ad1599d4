//! GitHub Contents API backend for the Obsidian vault.
//!
//! Every write is a commit on the configured branch. The blob `sha` serves
//! as the revision token: GitHub rejects an update whose `sha` is not the
//! current one.

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{EntryKind, RemoteEntry, RemoteFile, VaultBackend};
use crate::config::VaultSettings;
use crate::core::ActionError;

/// Public GitHub REST endpoint
pub const GITHUB_API: &str = "https://api.github.com";

const SERVICE: &str = "GitHub";

/// Vault backend over the GitHub Contents API
pub struct GitHubVault {
    api_base: String,
    owner: String,
    repo: String,
    branch: String,
    token: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ContentFile {
    sha: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct ContentEntry {
    name: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Serialize)]
struct PutRequest<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct PutResponse {
    content: PutContent,
}

#[derive(Debug, Deserialize)]
struct PutContent {
    sha: String,
}

impl GitHubVault {
    /// Create a client for `owner/repo` on `branch`
    pub fn new(
        token: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            api_base: GITHUB_API.to_string(),
            owner: owner.into(),
            repo: repo.into(),
            branch: branch.into(),
            token: token.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Point the client at a different API host (GitHub Enterprise, tests)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Create from resolved settings
    pub fn from_settings(settings: &VaultSettings) -> Result<Self> {
        let token = settings
            .token
            .clone()
            .context("GITHUB_TOKEN environment variable required")?;
        let owner = settings
            .repo_owner
            .clone()
            .context("Vault repository owner not configured (vault.repo_owner or GITHUB_REPO_OWNER)")?;
        let repo = settings
            .repo_name
            .clone()
            .context("Vault repository name not configured (vault.repo_name or GITHUB_REPO_NAME)")?;

        Ok(Self::new(token, owner, repo, settings.branch.clone()).with_api_base(settings.api_base.clone()))
    }

    /// `owner/repo` label for display
    pub fn repository(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Build the contents URL, percent-encoding each path segment
    fn contents_url(&self, path: &str) -> Result<Url, ActionError> {
        let mut url = Url::parse(&self.api_base).map_err(|e| ActionError::upstream(SERVICE, e))?;
        url.path_segments_mut()
            .map_err(|_| ActionError::upstream(SERVICE, "API base URL cannot be a base"))?
            .pop_if_empty()
            .extend(["repos", self.owner.as_str(), self.repo.as_str(), "contents"])
            .extend(path.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header("User-Agent", "voice-notes")
    }

    async fn error_body(response: reqwest::Response) -> String {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        format!("{} {}", status, text.trim())
    }
}

#[async_trait]
impl VaultBackend for GitHubVault {
    fn name(&self) -> &str {
        "github"
    }

    async fn get(&self, path: &str) -> Result<Option<RemoteFile>, ActionError> {
        let url = self.contents_url(path)?;
        let response = self
            .request(reqwest::Method::GET, url)
            .query(&[("ref", self.branch.as_str())])
            .send()
            .await
            .map_err(|e| ActionError::upstream(SERVICE, e))?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(path, "File not found in vault");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(ActionError::upstream(SERVICE, Self::error_body(response).await));
        }

        let file: ContentFile = response
            .json()
            .await
            .map_err(|e| ActionError::upstream(SERVICE, format!("expected a file at {}: {}", path, e)))?;

        // GitHub wraps base64 at 60 columns
        let encoded: String = file.content.split_whitespace().collect();
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| ActionError::upstream(SERVICE, format!("invalid base64 for {}: {}", path, e)))?;
        let content = String::from_utf8(bytes)
            .map_err(|e| ActionError::upstream(SERVICE, format!("{} is not UTF-8: {}", path, e)))?;

        Ok(Some(RemoteFile {
            path: path.to_string(),
            content,
            revision: file.sha,
        }))
    }

    async fn put(
        &self,
        path: &str,
        content: &str,
        revision: Option<&str>,
        message: &str,
    ) -> Result<String, ActionError> {
        let url = self.contents_url(path)?;
        let body = PutRequest {
            message,
            content: STANDARD.encode(content.as_bytes()),
            branch: &self.branch,
            sha: revision,
        };

        let response = self
            .request(reqwest::Method::PUT, url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ActionError::upstream(SERVICE, e))?;

        let status = response.status();
        if status.is_success() {
            let created: PutResponse = response
                .json()
                .await
                .map_err(|e| ActionError::upstream(SERVICE, e))?;
            return Ok(created.content.sha);
        }

        // 409: sha mismatch; 422: sha missing for an existing file
        match (status, revision) {
            (StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY, Some(stale)) => Err(ActionError::Conflict {
                path: path.to_string(),
                revision: stale.to_string(),
            }),
            (StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY, None) => {
                Err(ActionError::AlreadyExists(path.to_string()))
            }
            (StatusCode::NOT_FOUND, _) => Err(ActionError::NotFound(path.to_string())),
            _ => Err(ActionError::upstream(SERVICE, Self::error_body(response).await)),
        }
    }

    async fn list(&self, path: &str) -> Result<Vec<RemoteEntry>, ActionError> {
        let url = self.contents_url(path)?;
        let response = self
            .request(reqwest::Method::GET, url)
            .query(&[("ref", self.branch.as_str())])
            .send()
            .await
            .map_err(|e| ActionError::upstream(SERVICE, e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ActionError::NotFound(path.to_string()));
        }
        if !response.status().is_success() {
            return Err(ActionError::upstream(SERVICE, Self::error_body(response).await));
        }

        let entries: Vec<ContentEntry> = response
            .json()
            .await
            .map_err(|e| ActionError::upstream(SERVICE, format!("expected a directory at {}: {}", path, e)))?;

        Ok(entries
            .into_iter()
            .map(|entry| RemoteEntry {
                kind: if entry.kind == "dir" {
                    EntryKind::Dir
                } else {
                    EntryKind::File
                },
                name: entry.name,
            })
            .collect())
    }
}
