//! OpenAI chat completions client with tool calling.
//!
//! Endpoint: POST {base_url}/chat/completions
//! Auth: Bearer token

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{EngineReply, ReasoningEngine, ToolSpec};
use crate::config::OpenAiSettings;
use crate::domain::{ActionRequest, Conversation, Turn};

/// Public OpenAI endpoint
pub const OPENAI_API: &str = "https://api.openai.com/v1";

/// Reasoning engine backed by the OpenAI chat completions API
pub struct OpenAiEngine {
    api_key: String,
    model: String,
    base_url: String,
    temperature: f64,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAiTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAiToolCall>>,
}

#[derive(Debug, Serialize)]
struct OpenAiTool {
    r#type: &'static str,
    function: OpenAiToolDefinition,
}

#[derive(Debug, Serialize)]
struct OpenAiToolDefinition {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAiToolCall {
    id: String,
    r#type: String,
    function: OpenAiToolCallFunction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAiToolCallFunction {
    name: String,
    /// JSON-encoded arguments object
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAiToolCall>>,
}

impl OpenAiEngine {
    /// Create a new client
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: OPENAI_API.to_string(),
            temperature: 0.3,
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .connect_timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    /// Use a different API base (proxies, compatible servers, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Create from resolved settings
    pub fn from_settings(settings: &OpenAiSettings) -> Result<Self> {
        let api_key = settings
            .api_key
            .clone()
            .context("OPENAI_API_KEY environment variable required")?;

        Ok(Self::new(api_key, settings.model.clone())
            .with_base_url(settings.base_url.clone())
            .with_temperature(settings.temperature))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, conversation: &Conversation, tools: &[ToolSpec]) -> ChatRequest {
        let messages = conversation.turns().iter().map(to_message).collect();

        let (tools, tool_choice) = if tools.is_empty() {
            (None, None)
        } else {
            let tools = tools
                .iter()
                .map(|spec| OpenAiTool {
                    r#type: "function",
                    function: OpenAiToolDefinition {
                        name: spec.name.clone(),
                        description: spec.description.clone(),
                        parameters: spec.parameters.clone(),
                    },
                })
                .collect();
            (Some(tools), Some("auto"))
        };

        ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            tools,
            tool_choice,
        }
    }
}

fn to_message(turn: &Turn) -> Message {
    match turn {
        Turn::System { content } => text_message("system", content),
        Turn::User { content } => text_message("user", content),
        Turn::Assistant {
            content,
            action_requests,
        } => Message {
            role: "assistant",
            content: content.clone(),
            tool_call_id: None,
            tool_calls: if action_requests.is_empty() {
                None
            } else {
                Some(action_requests.iter().map(to_tool_call).collect())
            },
        },
        Turn::Tool { call_id, content, .. } => Message {
            role: "tool",
            content: Some(content.clone()),
            tool_call_id: Some(call_id.clone()),
            tool_calls: None,
        },
    }
}

fn text_message(role: &'static str, content: &str) -> Message {
    Message {
        role,
        content: Some(content.to_string()),
        tool_call_id: None,
        tool_calls: None,
    }
}

fn to_tool_call(request: &ActionRequest) -> OpenAiToolCall {
    OpenAiToolCall {
        id: request.id.clone(),
        r#type: "function".to_string(),
        function: OpenAiToolCallFunction {
            name: request.name.clone(),
            arguments: Value::Object(request.arguments.clone()).to_string(),
        },
    }
}

/// Decode the JSON-encoded arguments string; malformed input yields no arguments
fn parse_arguments(call: &OpenAiToolCall) -> Map<String, Value> {
    match serde_json::from_str::<Value>(&call.function.arguments) {
        Ok(Value::Object(map)) => map,
        Ok(_) | Err(_) => {
            warn!(
                call_id = %call.id,
                function = %call.function.name,
                "Tool call arguments are not a JSON object, using empty arguments"
            );
            Map::new()
        }
    }
}

#[async_trait]
impl ReasoningEngine for OpenAiEngine {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, conversation: &Conversation, tools: &[ToolSpec]) -> Result<EngineReply> {
        let request = self.build_request(conversation, tools);
        debug!(
            model = %self.model,
            messages = request.messages.len(),
            tools = tools.len(),
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .context("Failed to reach OpenAI API")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI API error ({}): {}", status, text);
        }

        let chat: ChatResponse = response
            .json()
            .await
            .context("Failed to parse OpenAI response")?;

        let message = chat
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .context("OpenAI response contained no choices")?;

        let action_requests = message
            .tool_calls
            .unwrap_or_default()
            .iter()
            .map(|call| ActionRequest::new(call.id.clone(), call.function.name.clone(), parse_arguments(call)))
            .collect();

        Ok(EngineReply {
            text: message.content.filter(|text| !text.trim().is_empty()),
            action_requests,
        })
    }
}
