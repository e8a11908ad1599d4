//! Orchestrator Integration Tests
//!
//! Full runs against a scripted reasoning engine and in-memory backends.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use chrono::FixedOffset;
use serde_json::json;

use voice_notes::adapters::ToolSpec;
use voice_notes::core::NO_ACTION_SUMMARY;
use voice_notes::domain::Turn;
use voice_notes::{
    ActionRegistry, ActionRequest, Conversation, DateResolver, EngineReply, MemoryVault, Orchestrator,
    ReasoningEngine, VaultStore,
};

/// Engine that replays canned replies and records what it was sent
struct ScriptedEngine {
    replies: Mutex<VecDeque<Result<EngineReply>>>,
    seen: Mutex<Vec<(Conversation, usize)>>,
}

impl ScriptedEngine {
    fn new(replies: Vec<Result<EngineReply>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            seen: Mutex::new(Vec::new()),
        })
    }

    /// (conversation, number of tools offered) per call
    fn calls(&self) -> Vec<(Conversation, usize)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReasoningEngine for ScriptedEngine {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, conversation: &Conversation, tools: &[ToolSpec]) -> Result<EngineReply> {
        self.seen.lock().unwrap().push((conversation.clone(), tools.len()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow::anyhow!("script exhausted")))
    }
}

fn orchestrator(engine: Arc<ScriptedEngine>, vault: Arc<MemoryVault>) -> Orchestrator {
    let dates = DateResolver::new(FixedOffset::east_opt(3 * 3600).unwrap());
    let registry = ActionRegistry::from_parts(VaultStore::new(vault), None, dates);
    Orchestrator::new(engine, registry, "Europe/Moscow")
}

fn request(id: &str, name: &str, arguments: serde_json::Value) -> ActionRequest {
    ActionRequest::from_json(id, name, arguments)
}

#[tokio::test]
async fn test_zero_actions_yields_summary() {
    let engine = ScriptedEngine::new(vec![Ok(EngineReply::text("Nothing to do here."))]);
    let report = orchestrator(engine.clone(), Arc::new(MemoryVault::new()))
        .process("just thinking out loud")
        .await
        .unwrap();

    assert!(report.outcomes.is_empty());
    assert_eq!(report.summary, "Nothing to do here.");
    assert_eq!(engine.calls().len(), 1);
}

#[tokio::test]
async fn test_zero_actions_without_text_uses_default_summary() {
    let engine = ScriptedEngine::new(vec![Ok(EngineReply::default())]);
    let report = orchestrator(engine, Arc::new(MemoryVault::new()))
        .process("hmm")
        .await
        .unwrap();

    assert!(report.outcomes.is_empty());
    assert_eq!(report.summary, NO_ACTION_SUMMARY);
}

#[tokio::test]
async fn test_actions_run_in_order_and_see_earlier_writes() {
    let vault = Arc::new(MemoryVault::with_files([("Work/2026-01-02-Alpha.md", "Kickoff")]));
    let engine = ScriptedEngine::new(vec![
        Ok(EngineReply::actions(vec![
            request("call_1", "listNotes", json!({"folder": "Work", "searchQuery": "alpha"})),
            request(
                "call_2",
                "appendToNote",
                json!({"notePath": "Work/2026-01-02-Alpha.md", "content": "Follow-up"}),
            ),
            request("call_3", "readNote", json!({"notePath": "Work/2026-01-02-Alpha.md"})),
        ])),
        Ok(EngineReply::text("Appended the follow-up to the Alpha note.")),
    ]);

    let report = orchestrator(engine.clone(), vault.clone())
        .process("add a follow-up to the alpha note")
        .await
        .unwrap();

    let names: Vec<&str> = report.outcomes.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["listNotes", "appendToNote", "readNote"]);
    assert_eq!(report.outcomes[0].result, "Notes in folder Work:\n- Work/2026-01-02-Alpha.md");
    assert_eq!(report.outcomes[1].result, "Content appended to note Work/2026-01-02-Alpha.md");
    assert!(report.outcomes[2].result.ends_with("Kickoff\n\nFollow-up"));
    assert_eq!(report.summary, "Appended the follow-up to the Alpha note.");

    // The summary request carries every outcome, tagged, and offers no tools
    let calls = engine.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].1, 7);
    assert_eq!(calls[1].1, 0);

    let tool_ids: Vec<String> = calls[1]
        .0
        .turns()
        .iter()
        .filter_map(|turn| match turn {
            Turn::Tool { call_id, .. } => Some(call_id.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(tool_ids, vec!["call_1", "call_2", "call_3"]);
}

#[tokio::test]
async fn test_unknown_and_failing_actions_do_not_abort_the_batch() {
    let vault = Arc::new(MemoryVault::new());
    let engine = ScriptedEngine::new(vec![
        Ok(EngineReply::actions(vec![
            request("call_1", "sendEmail", json!({"to": "boss"})),
            request("call_2", "readNote", json!({"notePath": "Work/missing.md"})),
            request("call_3", "addTodoTask", json!({"task": "Buy milk"})),
        ])),
        Ok(EngineReply::text("Added the task; the note was not found.")),
    ]);

    let report = orchestrator(engine, vault.clone())
        .process("buy milk and read my note")
        .await
        .unwrap();

    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(report.outcomes[0].result, "Unknown function: sendEmail");
    assert_eq!(
        report.outcomes[1].result,
        "Error executing readNote: Not found: Work/missing.md"
    );
    assert!(report.outcomes[2].result.starts_with("Task added to TODO.md (medium priority)"));
    assert!(vault.content("TODO.md").unwrap().contains("- [ ] Buy milk"));
}

#[tokio::test]
async fn test_engine_failure_is_terminal() {
    let engine = ScriptedEngine::new(vec![Err(anyhow::anyhow!("connection reset"))]);
    let err = orchestrator(engine, Arc::new(MemoryVault::new()))
        .process("anything")
        .await
        .unwrap_err();

    assert_eq!(format!("{:#}", err), "Reasoning engine request failed: connection reset");
}

#[tokio::test]
async fn test_summary_failure_keeps_committed_writes() {
    let vault = Arc::new(MemoryVault::new());
    let engine = ScriptedEngine::new(vec![
        Ok(EngineReply::actions(vec![request(
            "call_1",
            "createNote",
            json!({"title": "Idea", "content": "Solar kettle", "folder": "Ideas"}),
        )])),
        Err(anyhow::anyhow!("timeout")),
    ]);

    let result = orchestrator(engine, vault.clone()).process("idea: solar kettle").await;

    assert!(result.is_err());
    assert_eq!(vault.paths().len(), 1);
    assert!(vault.paths()[0].starts_with("Ideas/"));
}

#[tokio::test]
async fn test_empty_summary_gets_fallback() {
    let engine = ScriptedEngine::new(vec![
        Ok(EngineReply::actions(vec![request(
            "call_1",
            "addTodoTask",
            json!({"task": "Water plants", "priority": "low"}),
        )])),
        Ok(EngineReply::text("   ")),
    ]);

    let report = orchestrator(engine, Arc::new(MemoryVault::new()))
        .process("water the plants sometime")
        .await
        .unwrap();

    assert_eq!(report.summary, "Processed 1 action(s).");
}
