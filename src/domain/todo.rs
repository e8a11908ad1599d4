//! The TODO document layout.
//!
//! The document has four sections in fixed order. Tasks are Markdown
//! checklist lines, optionally annotated with `(due: <date>)`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::ActionError;

/// Vault path of the canonical TODO document
pub const TODO_PATH: &str = "TODO.md";

/// Initial content written when the TODO document does not exist yet
pub const TODO_TEMPLATE: &str = "# 📋 TODO

## 🔴 High Priority

## 🟡 Medium Priority

## 🟢 Low Priority

## ✅ Completed
";

const COMPLETED_HEADER: &str = "## ✅ Completed";

/// Task priority, mapped to a TODO section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Header line of the section holding tasks of this priority
    pub fn header(self) -> &'static str {
        match self {
            Priority::High => "## 🔴 High Priority",
            Priority::Medium => "## 🟡 Medium Priority",
            Priority::Low => "## 🟢 Low Priority",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which of the four sections a group of tasks belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Open(Priority),
    Completed,
}

impl SectionKind {
    /// All sections in document order
    pub const ORDER: [SectionKind; 4] = [
        SectionKind::Open(Priority::High),
        SectionKind::Open(Priority::Medium),
        SectionKind::Open(Priority::Low),
        SectionKind::Completed,
    ];

    pub fn header(self) -> &'static str {
        match self {
            SectionKind::Open(priority) => priority.header(),
            SectionKind::Completed => COMPLETED_HEADER,
        }
    }
}

/// Tasks found under one section header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    pub tasks: Vec<String>,
}

/// Format a checklist line for a new task.
///
/// Line breaks and runs of whitespace collapse to single spaces so a task
/// always occupies exactly one line.
pub fn task_line(task: &str, due_date: Option<&str>) -> String {
    match due_date {
        Some(due) => format!("- [ ] {} (due: {})", single_line(task), single_line(due)),
        None => format!("- [ ] {}", single_line(task)),
    }
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Insert a task line at the top of its priority section.
///
/// The line goes right after the header, skipping one blank line if present.
pub fn insert_task(content: &str, priority: Priority, line: &str) -> Result<String, ActionError> {
    let mut lines: Vec<&str> = content.split('\n').collect();
    let header = priority.header();

    let header_index = lines
        .iter()
        .position(|l| l.trim() == header)
        .ok_or_else(|| ActionError::SectionNotFound {
            document: TODO_PATH.to_string(),
            header: header.to_string(),
        })?;

    let mut insert_at = header_index + 1;
    if lines.get(insert_at).is_some_and(|l| l.trim().is_empty()) {
        insert_at += 1;
    }

    lines.insert(insert_at, line);
    Ok(lines.join("\n"))
}

/// Split the document into its four sections.
///
/// Every header must be present and in canonical order.
pub fn parse_sections(content: &str) -> Result<Vec<Section>, ActionError> {
    let lines: Vec<&str> = content.split('\n').collect();
    let mut positions = Vec::with_capacity(SectionKind::ORDER.len());

    let mut search_from = 0;
    for kind in SectionKind::ORDER {
        let found = lines[search_from..]
            .iter()
            .position(|l| l.trim() == kind.header())
            .map(|offset| search_from + offset)
            .ok_or_else(|| ActionError::SectionNotFound {
                document: TODO_PATH.to_string(),
                header: kind.header().to_string(),
            })?;
        positions.push(found);
        search_from = found + 1;
    }

    let mut sections = Vec::with_capacity(positions.len());
    for (i, kind) in SectionKind::ORDER.into_iter().enumerate() {
        let start = positions[i] + 1;
        let end = positions.get(i + 1).copied().unwrap_or(lines.len());
        let tasks = lines[start..end]
            .iter()
            .map(|l| l.trim())
            .filter(|l| l.starts_with("- ["))
            .map(str::to_string)
            .collect();
        sections.push(Section { kind, tasks });
    }

    Ok(sections)
}
