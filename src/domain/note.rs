//! Notes stored in the Obsidian vault.
//!
//! A note lives at `<folder>/<YYYY-MM-DD>-<title>.md` and starts with a
//! YAML front matter block followed by a `# <title>` heading.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Canonical vault folders a note can be filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Folder {
    Ideas,
    Work,
    Personal,
    #[default]
    #[serde(rename = "Voice Notes")]
    VoiceNotes,
}

impl Folder {
    /// All canonical folders, in search order
    pub const ALL: [Folder; 4] = [Folder::Ideas, Folder::Work, Folder::Personal, Folder::VoiceNotes];

    /// Folder name as it appears in the vault
    pub fn as_str(self) -> &'static str {
        match self {
            Folder::Ideas => "Ideas",
            Folder::Work => "Work",
            Folder::Personal => "Personal",
            Folder::VoiceNotes => "Voice Notes",
        }
    }

    /// Parse a folder name (case-insensitive)
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|folder| folder.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A note about to be written to the vault
#[derive(Debug, Clone)]
pub struct Note {
    pub title: String,
    pub folder: Folder,
    pub content: String,
    pub created: DateTime<FixedOffset>,
}

impl Note {
    pub fn new(
        title: impl Into<String>,
        folder: Folder,
        content: impl Into<String>,
        created: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            title: title.into(),
            folder,
            content: content.into(),
            created,
        }
    }

    /// File name: `<YYYY-MM-DD>-<title>.md`
    pub fn file_name(&self) -> String {
        format!("{}-{}.md", self.created.format("%Y-%m-%d"), sanitize_title(&self.title))
    }

    /// Vault path: `<folder>/<file name>`
    pub fn path(&self) -> String {
        format!("{}/{}", self.folder.as_str(), self.file_name())
    }

    /// Front matter block, closing delimiter included
    pub fn front_matter(&self) -> String {
        format!(
            "---\ncreated: {}\nsource: voice\ntags: [voice-note]\n---\n",
            self.created.to_rfc3339()
        )
    }

    /// Full Markdown document
    pub fn render(&self) -> String {
        format!(
            "{}\n# {}\n\n{}",
            self.front_matter(),
            self.title.trim(),
            self.content
        )
    }
}

/// Path separators in a title would create unintended subfolders
fn sanitize_title(title: &str) -> String {
    title
        .trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '-' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn created() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 1, 20, 9, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_note_path() {
        let note = Note::new("Project Alpha", Folder::Work, "body", created());
        assert_eq!(note.path(), "Work/2026-01-20-Project Alpha.md");
    }

    #[test]
    fn test_voice_notes_folder_has_space() {
        let note = Note::new("Idea", Folder::VoiceNotes, "body", created());
        assert_eq!(note.path(), "Voice Notes/2026-01-20-Idea.md");
    }

    #[test]
    fn test_title_slashes_replaced() {
        let note = Note::new("Q1/Q2 plan", Folder::Work, "body", created());
        assert_eq!(note.file_name(), "2026-01-20-Q1-Q2 plan.md");
    }

    #[test]
    fn test_render_layout() {
        let note = Note::new("Sunset", Folder::Personal, "Orange sky.", created());
        let body = note.render();

        assert!(body.starts_with("---\ncreated: 2026-01-20T09:30:00+03:00\n"));
        assert!(body.contains("source: voice\n"));
        assert!(body.contains("tags: [voice-note]\n"));
        assert!(body.ends_with("---\n\n# Sunset\n\nOrange sky."));
    }

    #[test]
    fn test_folder_serde_names() {
        let json = serde_json::to_string(&Folder::VoiceNotes).unwrap();
        assert_eq!(json, "\"Voice Notes\"");
        let parsed: Folder = serde_json::from_str("\"Work\"").unwrap();
        assert_eq!(parsed, Folder::Work);
        assert_eq!(Folder::parse("voice notes"), Some(Folder::VoiceNotes));
        assert_eq!(Folder::parse("Archive"), None);
    }
}
