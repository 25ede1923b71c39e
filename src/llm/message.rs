//! Conversation message structures
//!
//! These mirror the Anthropic Messages API content model: a message is a
//! role plus either plain text or a sequence of typed content blocks.

use serde::{Deserialize, Serialize};

/// Represents a message in a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmMessage {
    /// Role of the message sender
    pub role: MessageRole,

    /// Content of the message
    pub content: MessageContent,
}

/// Role of the message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User message (human input or tool results)
    User,

    /// Assistant message (model response)
    Assistant,
}

/// Content of a message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Simple text content
    Text(String),

    /// Structured content blocks
    Blocks(Vec<ContentBlock>),
}

/// A block of content within a message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Text content
    Text {
        text: String,

        /// Source citations attached by the provider (web search results)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        citations: Option<Vec<Citation>>,
    },

    /// Tool invocation requested by the model
    ToolUse {
        /// Unique identifier for this tool use
        id: String,
        /// Action identifier of the tool to invoke
        name: String,
        /// Input arguments for the tool
        input: serde_json::Value,
    },

    /// Provider-stored document attached for analysis
    Document {
        /// Where the document content comes from
        source: DocumentSource,
    },

    /// Result of a local tool invocation, fed back to the model
    ToolResult {
        /// ID of the tool use this is a result for
        tool_use_id: String,
        /// Whether the tool execution failed
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
        /// Result content
        content: String,
    },
}

/// Source reference for a document block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSource {
    /// Source kind; `"file"` for provider-stored files
    #[serde(rename = "type")]
    pub kind: String,

    /// ID of the stored file
    pub file_id: String,
}

/// A cited source reported by the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    /// Title of the cited source
    #[serde(default = "unknown_title")]
    pub title: String,

    /// URL of the cited source
    #[serde(default)]
    pub url: String,

    /// Relevant snippet from the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

fn unknown_title() -> String {
    "Unknown".to_string()
}

impl LlmMessage {
    /// Create a new user message
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            role: MessageRole::User,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create a new assistant message
    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create a message from content blocks
    pub fn blocks(role: MessageRole, blocks: Vec<ContentBlock>) -> Self {
        Self {
            role,
            content: MessageContent::Blocks(blocks),
        }
    }

    /// Get the concatenated text content of the message
    pub fn get_text(&self) -> Option<String> {
        match &self.content {
            MessageContent::Text(text) => Some(text.clone()),
            MessageContent::Blocks(blocks) => {
                let text_parts: Vec<&str> = blocks
                    .iter()
                    .filter_map(|block| match block {
                        ContentBlock::Text { text, .. } => Some(text.as_str()),
                        _ => None,
                    })
                    .collect();
                if text_parts.is_empty() {
                    None
                } else {
                    Some(text_parts.join("\n"))
                }
            }
        }
    }
}

impl ContentBlock {
    /// Create a plain text block
    pub fn text<S: Into<String>>(text: S) -> Self {
        ContentBlock::Text {
            text: text.into(),
            citations: None,
        }
    }

    /// Create a document block referencing a provider-stored file
    pub fn document<S: Into<String>>(file_id: S) -> Self {
        ContentBlock::Document {
            source: DocumentSource {
                kind: "file".to_string(),
                file_id: file_id.into(),
            },
        }
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        MessageContent::Text(text)
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        MessageContent::Text(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_text_joins_text_blocks() {
        let message = LlmMessage::blocks(
            MessageRole::Assistant,
            vec![
                ContentBlock::text("first"),
                ContentBlock::ToolUse {
                    id: "toolu_1".to_string(),
                    name: "db::describe".to_string(),
                    input: json!({}),
                },
                ContentBlock::text("second"),
            ],
        );
        assert_eq!(message.get_text(), Some("first\nsecond".to_string()));
    }

    #[test]
    fn test_tool_result_serialization() {
        let block = ContentBlock::ToolResult {
            tool_use_id: "toolu_1".to_string(),
            is_error: Some(false),
            content: "ok".to_string(),
        };
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value["type"], "tool_result");
        assert_eq!(value["tool_use_id"], "toolu_1");
    }

    #[test]
    fn test_citation_defaults() {
        let citation: Citation = serde_json::from_value(json!({})).unwrap();
        assert_eq!(citation.title, "Unknown");
        assert_eq!(citation.url, "");
        assert!(citation.snippet.is_none());
    }
}
