//! Model transport trait and response structures

use crate::error::{LlmError, Result};
use crate::llm::message::{ContentBlock, LlmMessage};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Trait for model transports
///
/// The conversation loop only depends on this contract: accept history plus
/// tools and parameters, return either a final message or tool-call requests
/// along with usage and stop-reason metadata.
#[async_trait]
pub trait ModelTransport: Send + Sync {
    /// Send one message-creation request to the model
    async fn create_message(&self, request: MessageRequest) -> Result<ModelResponse>;

    /// Get the configured model name
    fn model_name(&self) -> &str;

    /// Upload a file for later analysis
    async fn upload_file(&self, _path: &Path, _filename: &str) -> Result<UploadedFile> {
        Err(LlmError::InvalidRequest {
            message: "File upload not supported by this transport".to_string(),
        }
        .into())
    }
}

/// Metadata for a file stored with the provider
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedFile {
    /// File ID assigned by the provider
    pub id: String,

    /// Filename recorded at upload
    #[serde(default)]
    pub filename: String,

    /// File size in bytes
    #[serde(default)]
    pub size_bytes: u64,

    /// MIME type reported by the provider
    #[serde(default)]
    pub mime_type: String,
}

/// A single message-creation request
#[derive(Debug, Clone, Serialize)]
pub struct MessageRequest {
    /// Model identifier
    pub model: String,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// System prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Conversation messages
    pub messages: Vec<LlmMessage>,

    /// Tool definitions for function calling; omitted entirely when no
    /// tools are registered so the request is a plain completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
}

/// Response from the model
#[derive(Debug, Clone, Deserialize)]
pub struct ModelResponse {
    /// Content blocks of the response
    pub content: Vec<ContentBlock>,

    /// Model that produced the response
    pub model: String,

    /// Why generation stopped
    pub stop_reason: Option<String>,

    /// Token usage for this request
    pub usage: Usage,
}

/// Token usage for one model call
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Usage {
    /// Number of tokens in the prompt
    pub input_tokens: u32,

    /// Number of tokens in the completion
    pub output_tokens: u32,
}

impl Usage {
    /// Total tokens for this call
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// Tool definition in the provider's function-calling wire format
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    /// Action identifier of the tool
    pub name: String,

    /// Description shown to the model
    pub description: String,

    /// JSON schema for the tool's input
    pub input_schema: serde_json::Value,
}

impl ModelResponse {
    /// Whether the response requests any tool invocations
    pub fn has_tool_use(&self) -> bool {
        self.content
            .iter()
            .any(|block| matches!(block, ContentBlock::ToolUse { .. }))
    }

    /// Concatenated text of all text blocks
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .concat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_omits_empty_optionals() {
        let request = MessageRequest {
            model: "claude-3-5-sonnet-20241022".to_string(),
            max_tokens: 1024,
            temperature: None,
            system: None,
            messages: vec![LlmMessage::user("hi")],
            tools: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("tools").is_none());
        assert!(value.get("system").is_none());
        assert!(value.get("temperature").is_none());
    }

    #[test]
    fn test_response_tool_use_detection() {
        let response = ModelResponse {
            content: vec![ContentBlock::ToolUse {
                id: "toolu_1".to_string(),
                name: "db::describe".to_string(),
                input: json!({}),
            }],
            model: "claude-3-5-sonnet-20241022".to_string(),
            stop_reason: Some("tool_use".to_string()),
            usage: Usage {
                input_tokens: 10,
                output_tokens: 5,
            },
        };
        assert!(response.has_tool_use());
        assert_eq!(response.text(), "");
        assert_eq!(response.usage.total(), 15);
    }
}
