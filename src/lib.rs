//! # anthropic-rooms
//!
//! Rooms workflow-engine addon for the Anthropic Messages API.
//!
//! The engine hands the addon a set of named tool functions plus metadata;
//! the addon registers them for one conversation turn, converts them into
//! the provider's function-calling schema, and drives the multi-turn
//! tool-execution loop until the model produces a final answer or the round
//! bound is hit. File analysis and web search are one-shot actions on the
//! same transport.

pub mod actions;
pub mod addon;
pub mod config;
pub mod credentials;
pub mod error;
pub mod llm;
pub mod tools;

// Re-export commonly used types
pub use actions::{
    ActionResponse, ChatInput, ChatMessage, ChatOutput, FileAnalysisInput, FileAnalysisOutput,
    TokensSchema, UsageSummary, WebSearchInput, WebSearchOutput, DEFAULT_MAX_ROUNDS,
};
pub use addon::AnthropicRoomsAddon;
pub use config::AddonConfig;
pub use error::{Error, Result};
pub use llm::{AnthropicTransport, ModelTransport, ToolDefinition};
pub use tools::{ParamType, ToolFunction, ToolGroup, ToolRegistry, ToolSchema};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for the library
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

/// Initialize tracing with a specific debug mode
pub fn init_tracing_with_debug(debug: bool) {
    let filter = if debug { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();
}
