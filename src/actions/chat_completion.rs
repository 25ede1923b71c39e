//! Chat completion action and the tool-execution conversation loop
//!
//! One invocation drives a single logical exchange with the model: send the
//! accumulated history plus the registered tools, execute any requested tool
//! calls locally, feed the results back, and repeat until the model returns
//! a plain answer or the round bound is hit. Tool failures are folded back
//! into the conversation as per-call error results; only transport failures
//! terminate the loop.

use crate::actions::base::UsageSummary;
use crate::config::AddonConfig;
use crate::error::{Result, ToolError};
use crate::llm::{ContentBlock, LlmMessage, MessageRequest, MessageRole, ModelTransport};
use crate::tools::ToolRegistry;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use uuid::Uuid;

/// Default bound on model round-trips per invocation
///
/// The loop must terminate even against a model that requests tools on
/// every round, so the bound is small and finite by default.
pub const DEFAULT_MAX_ROUNDS: usize = 10;

/// A prior conversation turn supplied by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message role: user or assistant
    pub role: MessageRole,

    /// Message content
    pub content: String,
}

/// Inputs for the chat completion action
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatInput {
    /// User message to send to the model
    pub message: String,

    /// Full prior conversation history
    #[serde(default)]
    pub messages: Option<Vec<ChatMessage>>,

    /// Max tokens (overrides config default)
    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// Temperature (overrides config default)
    #[serde(default)]
    pub temperature: Option<f32>,

    /// System prompt
    #[serde(default)]
    pub system: Option<String>,

    /// Round bound (overrides [`DEFAULT_MAX_ROUNDS`])
    #[serde(default)]
    pub max_rounds: Option<usize>,
}

impl ChatInput {
    /// Create an input carrying just the user message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }
}

/// Output of the chat completion action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatOutput {
    /// The model's final answer
    pub response: String,

    /// Model used
    pub model: String,

    /// Token usage aggregated across all rounds
    pub usage: UsageSummary,

    /// Why the model stopped generating
    pub stop_reason: Option<String>,

    /// True when the round bound cut the exchange short
    #[serde(default)]
    pub truncated: bool,
}

/// Terminal states of one loop invocation; transport failures surface as
/// the `Err` branch instead
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopOutcome {
    Done,
    RoundLimitExceeded,
}

/// Drives a single tool-augmented exchange with the model
pub struct ConversationLoop<'a> {
    transport: &'a dyn ModelTransport,
    registry: &'a ToolRegistry,
    model: String,
    max_tokens: u32,
    temperature: Option<f32>,
    system: Option<String>,
    history: Vec<LlmMessage>,
    round_count: usize,
    max_rounds: usize,
}

impl<'a> ConversationLoop<'a> {
    /// Build a loop from addon defaults and action inputs
    pub fn new(
        config: &AddonConfig,
        transport: &'a dyn ModelTransport,
        registry: &'a ToolRegistry,
        input: &ChatInput,
    ) -> Self {
        let mut history = Vec::new();
        if let Some(messages) = &input.messages {
            for msg in messages {
                history.push(LlmMessage {
                    role: msg.role,
                    content: msg.content.clone().into(),
                });
            }
        }
        history.push(LlmMessage::user(&input.message));

        Self {
            transport,
            registry,
            model: config.model.clone(),
            max_tokens: input.max_tokens.unwrap_or(config.max_tokens),
            temperature: input.temperature.or(Some(config.temperature)),
            system: input.system.clone(),
            history,
            round_count: 0,
            max_rounds: input.max_rounds.unwrap_or(DEFAULT_MAX_ROUNDS),
        }
    }

    fn build_request(&self) -> MessageRequest {
        let tools = self.registry.wire_format();
        MessageRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system: self.system.clone(),
            messages: self.history.clone(),
            tools: if tools.is_empty() { None } else { Some(tools) },
        }
    }

    /// Run the exchange to completion
    pub async fn run(mut self) -> Result<ChatOutput> {
        let turn_id = Uuid::new_v4();
        let mut answer = String::new();
        let mut usage = UsageSummary::default();
        let mut stop_reason = None;

        let outcome = loop {
            if self.round_count >= self.max_rounds {
                tracing::warn!(
                    %turn_id,
                    "Round bound of {} reached, truncating exchange",
                    self.max_rounds
                );
                break LoopOutcome::RoundLimitExceeded;
            }
            self.round_count += 1;

            tracing::debug!(%turn_id, "Model round {} of {}", self.round_count, self.max_rounds);
            let response = self.transport.create_message(self.build_request()).await?;

            usage.accumulate(response.usage);
            stop_reason = response.stop_reason.clone();
            answer.push_str(&response.text());

            if !response.has_tool_use() {
                break LoopOutcome::Done;
            }

            let results = self.execute_tool_calls(&response.content);
            self.history
                .push(LlmMessage::blocks(MessageRole::Assistant, response.content));
            self.history
                .push(LlmMessage::blocks(MessageRole::User, results));
        };

        Ok(ChatOutput {
            response: answer,
            model: self.model,
            usage,
            stop_reason,
            truncated: outcome == LoopOutcome::RoundLimitExceeded,
        })
    }

    /// Execute every tool call of one round, in the order the model emitted
    /// them; each failure is scoped to its own call id
    fn execute_tool_calls(&self, content: &[ContentBlock]) -> Vec<ContentBlock> {
        let mut results = Vec::new();

        for block in content {
            let ContentBlock::ToolUse { id, name, input } = block else {
                continue;
            };

            tracing::debug!("Executing tool: {} with input: {}", name, input);
            let start = Instant::now();

            let result = match self.registry.resolve(name) {
                Some(handler) => {
                    let arguments = self.registry.coerce_arguments(name, input.clone());
                    handler(arguments)
                }
                None => Err(ToolError::NotFound { name: name.clone() }.to_string()),
            };

            let duration_ms = start.elapsed().as_millis();
            let result_block = match result {
                Ok(value) => {
                    tracing::debug!("Tool {} executed successfully in {}ms", name, duration_ms);
                    ContentBlock::ToolResult {
                        tool_use_id: id.clone(),
                        is_error: Some(false),
                        content: stringify(value),
                    }
                }
                Err(message) => {
                    tracing::error!("Tool {} execution failed: {}", name, message);
                    ContentBlock::ToolResult {
                        tool_use_id: id.clone(),
                        is_error: Some(true),
                        content: format!("Error executing tool: {}", message),
                    }
                }
            };
            results.push(result_block);
        }

        results
    }
}

fn stringify(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Execute the chat completion action
pub async fn chat_completion(
    config: &AddonConfig,
    transport: &dyn ModelTransport,
    registry: &ToolRegistry,
    input: ChatInput,
) -> Result<ChatOutput> {
    tracing::debug!(
        "Executing chat_completion with message: {:.100}...",
        input.message
    );

    let output = ConversationLoop::new(config, transport, registry, &input)
        .run()
        .await?;

    tracing::info!(
        "Chat completion successful. Used {} tokens.",
        output.usage.total_tokens
    );
    Ok(output)
}
