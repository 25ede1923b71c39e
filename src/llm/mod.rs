//! Model transport and message structures

pub mod client;
pub mod message;
pub mod providers;

pub use client::{MessageRequest, ModelResponse, ModelTransport, ToolDefinition, UploadedFile, Usage};
pub use message::{Citation, ContentBlock, DocumentSource, LlmMessage, MessageContent, MessageRole};
pub use providers::AnthropicTransport;
