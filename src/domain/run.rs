//! Run phases, reports and the boundary response.
//!
//! A run processes exactly one transcript:
//! `Init → AwaitingModel → {NoAction → Done | Executing → AwaitingSummary → Done}`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::action::ActionOutcome;
use super::conversation::Conversation;

/// Phase of an orchestration run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Init,
    AwaitingModel,
    NoAction,
    Executing,
    AwaitingSummary,
    Done,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Init => "init",
            RunPhase::AwaitingModel => "awaiting_model",
            RunPhase::NoAction => "no_action",
            RunPhase::Executing => "executing",
            RunPhase::AwaitingSummary => "awaiting_summary",
            RunPhase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Everything a completed run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,

    /// One outcome per executed request, in request order
    pub outcomes: Vec<ActionOutcome>,

    /// Closing natural-language summary (never empty)
    pub summary: String,

    /// Final conversation, including tool outcomes and the summary turn
    pub conversation: Conversation,
}

/// Response shape reported to callers of `process`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcription: Option<String>,

    #[serde(default)]
    pub actions: Vec<ActionOutcome>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ProcessResponse {
    pub fn success(transcript: &str, report: &RunReport) -> Self {
        Self {
            success: true,
            transcription: Some(transcript.to_string()),
            actions: report.outcomes.clone(),
            agent_summary: Some(report.summary.clone()),
            error: None,
            details: None,
        }
    }

    /// Generic message plus the underlying error chain as detail
    pub fn failure(transcript: &str, error: &anyhow::Error) -> Self {
        Self {
            success: false,
            transcription: Some(transcript.to_string()),
            actions: Vec::new(),
            agent_summary: None,
            error: Some("Voice note processing failed".to_string()),
            details: Some(format!("{:#}", error)),
        }
    }
}

/// Persisted record of one processed transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub transcript: String,
    #[serde(default)]
    pub outcomes: Vec<ActionOutcome>,
    pub summary: Option<String>,
    pub error: Option<String>,
}

impl RunRecord {
    pub fn completed(transcript: &str, report: &RunReport) -> Self {
        Self {
            id: report.run_id,
            timestamp: Utc::now(),
            transcript: transcript.to_string(),
            outcomes: report.outcomes.clone(),
            summary: Some(report.summary.clone()),
            error: None,
        }
    }

    pub fn failed(transcript: &str, error: &anyhow::Error) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            transcript: transcript.to_string(),
            outcomes: Vec::new(),
            summary: None,
            error: Some(format!("{:#}", error)),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
