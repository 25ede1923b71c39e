//! Shared action response envelope
//!
//! The workflow engine consumes every action result through this envelope
//! and branches on `code`, so addon-level entry points never raise; failures
//! become a `code` 500 envelope with the error text as the response body.

use crate::llm::Usage;
use serde::{Deserialize, Serialize};

/// Token accounting reported to the engine
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokensSchema {
    /// Tokens consumed by this action invocation
    pub step_amount: u32,

    /// Running total for the current workflow step
    pub total_current_amount: u32,
}

/// Aggregated token usage across all model calls of one action
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UsageSummary {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

impl UsageSummary {
    /// Fold one model call's usage into the summary
    pub fn accumulate(&mut self, usage: Usage) {
        self.input_tokens += usage.input_tokens;
        self.output_tokens += usage.output_tokens;
        self.total_tokens += usage.total();
    }
}

impl From<Usage> for UsageSummary {
    fn from(usage: Usage) -> Self {
        Self {
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            total_tokens: usage.total(),
        }
    }
}

/// Envelope returned to the workflow engine for every action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse<T> {
    /// Action-specific output
    pub output: T,

    /// Token accounting
    pub tokens: TokensSchema,

    /// Human-readable status message
    pub message: String,

    /// Status code; 200 on success, 500 on failure
    pub code: u16,
}

impl<T> ActionResponse<T> {
    /// Build a success envelope
    pub fn success(output: T, tokens: TokensSchema, message: impl Into<String>) -> Self {
        Self {
            output,
            tokens,
            message: message.into(),
            code: 200,
        }
    }

    /// Build a failure envelope
    pub fn failure(output: T, message: impl Into<String>) -> Self {
        Self {
            output,
            tokens: TokensSchema::default(),
            message: message.into(),
            code: 500,
        }
    }

    /// Whether the action succeeded
    pub fn is_success(&self) -> bool {
        self.code < 400
    }
}
