//! Main orchestrator for transcript processing.
//!
//! One run handles one transcript: ask the reasoning engine which actions
//! to take, execute them in order, feed the outcomes back and collect a
//! closing summary.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::adapters::ReasoningEngine;
use crate::domain::{ActionOutcome, Conversation, RunPhase, RunReport};

use super::prompt;
use super::registry::ActionRegistry;

/// Summary used when the engine requests no actions and says nothing
pub const NO_ACTION_SUMMARY: &str = "Processing complete, no actions required.";

/// Main transcript orchestrator
pub struct Orchestrator {
    engine: Arc<dyn ReasoningEngine>,
    registry: ActionRegistry,

    /// Timezone name shown to the engine alongside the current date
    timezone: String,
}

impl Orchestrator {
    /// Create a new orchestrator
    pub fn new(engine: Arc<dyn ReasoningEngine>, registry: ActionRegistry, timezone: impl Into<String>) -> Self {
        Self {
            engine,
            registry,
            timezone: timezone.into(),
        }
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Process one transcript
    #[instrument(skip(self, transcript), fields(engine = %self.engine.name(), chars = transcript.len()))]
    pub async fn process(&self, transcript: &str) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        info!(%run_id, "Processing transcript");

        // Init
        let now = self.registry.now();
        let instructions = prompt::render(now, &self.timezone);
        let mut conversation = Conversation::new(instructions, transcript);
        let mut phase = RunPhase::Init;
        debug!(%phase, "Conversation prepared");

        // Ask for actions
        phase = RunPhase::AwaitingModel;
        debug!(%phase, "Requesting actions");
        let catalog = self.registry.catalog();
        let reply = self
            .engine
            .complete(&conversation, &catalog)
            .await
            .context("Reasoning engine request failed")?;

        if !reply.has_actions() {
            phase = RunPhase::NoAction;
            debug!(%phase, "No actions requested");

            let summary = reply
                .text
                .clone()
                .filter(|text| !text.trim().is_empty())
                .unwrap_or_else(|| NO_ACTION_SUMMARY.to_string());
            conversation.push_assistant(Some(summary.clone()), Vec::new());

            info!(%run_id, phase = %RunPhase::Done, "Run complete without actions");
            return Ok(RunReport {
                run_id,
                outcomes: Vec::new(),
                summary,
                conversation,
            });
        }

        // Execute strictly in received order
        phase = RunPhase::Executing;
        let requests = reply.action_requests.clone();
        info!(%phase, count = requests.len(), "Executing actions");
        conversation.push_assistant(reply.text, reply.action_requests);

        let mut outcomes = Vec::with_capacity(requests.len());
        for request in &requests {
            debug!(call_id = %request.id, action = %request.name, "Executing action");
            let result = self.registry.execute(&request.name, &request.arguments).await;
            conversation.push_tool_outcome(request, result.clone());
            outcomes.push(ActionOutcome::new(request, result));
        }

        // Closing summary, no tools offered
        phase = RunPhase::AwaitingSummary;
        debug!(%phase, "Requesting summary");
        let closing = self
            .engine
            .complete(&conversation, &[])
            .await
            .context("Reasoning engine request failed")?;

        let summary = closing
            .text
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| format!("Processed {} action(s).", outcomes.len()));
        conversation.push_assistant(Some(summary.clone()), Vec::new());

        info!(%run_id, phase = %RunPhase::Done, actions = outcomes.len(), "Run complete");
        Ok(RunReport {
            run_id,
            outcomes,
            summary,
            conversation,
        })
    }
}
