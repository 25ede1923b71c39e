//! Externally invocable actions
//!
//! Only `chat_completion` engages the tool-execution conversation loop;
//! `file_analysis` and `web_search` are one-shot request builders on the
//! same transport.

pub mod base;
pub mod chat_completion;
pub mod file_analysis;
pub mod web_search;

pub use base::{ActionResponse, TokensSchema, UsageSummary};
pub use chat_completion::{
    chat_completion, ChatInput, ChatMessage, ChatOutput, ConversationLoop, DEFAULT_MAX_ROUNDS,
};
pub use file_analysis::{file_analysis, FileAnalysisInput, FileAnalysisOutput, FileInfo, FileUpload};
pub use web_search::{web_search, WebSearchInput, WebSearchOutput};
