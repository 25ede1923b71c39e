//! Model provider implementations

pub mod anthropic;

pub use anthropic::AnthropicTransport;
