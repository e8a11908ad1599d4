//! Conversation turns exchanged with the reasoning engine during one run.
//!
//! A conversation is append-only and owned by the run that created it.

use serde::{Deserialize, Serialize};

use super::action::ActionRequest;

/// One turn of the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Turn {
    /// Fixed instructions: action taxonomy and classification rules
    System { content: String },

    /// The transcript being processed
    User { content: String },

    /// Model reply, possibly carrying action requests
    Assistant {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        action_requests: Vec<ActionRequest>,
    },

    /// Outcome of one executed action, tagged with its correlation id
    Tool {
        call_id: String,
        name: String,
        content: String,
    },
}

/// Ordered turn sequence for a single run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    /// Start a conversation from system instructions and a transcript
    pub fn new(instructions: impl Into<String>, transcript: impl Into<String>) -> Self {
        Self {
            turns: vec![
                Turn::System {
                    content: instructions.into(),
                },
                Turn::User {
                    content: transcript.into(),
                },
            ],
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Record the model's reply with its action requests
    pub fn push_assistant(&mut self, content: Option<String>, action_requests: Vec<ActionRequest>) {
        self.turns.push(Turn::Assistant {
            content,
            action_requests,
        });
    }

    /// Record the outcome of one executed request
    pub fn push_tool_outcome(&mut self, request: &ActionRequest, content: impl Into<String>) {
        self.turns.push(Turn::Tool {
            call_id: request.id.clone(),
            name: request.name.clone(),
            content: content.into(),
        });
    }

    /// Text of the most recent assistant turn, if any
    pub fn last_assistant_text(&self) -> Option<&str> {
        self.turns.iter().rev().find_map(|turn| match turn {
            Turn::Assistant { content, .. } => content.as_deref(),
            _ => None,
        })
    }

    /// Number of tool outcomes recorded so far
    pub fn tool_outcome_count(&self) -> usize {
        self.turns
            .iter()
            .filter(|turn| matches!(turn, Turn::Tool { .. }))
            .count()
    }
}
