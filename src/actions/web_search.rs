//! Web search action
//!
//! Single round-trip: ask the model to answer with current web information
//! and collect any citations it attaches. Does not consult the tool
//! registry or the conversation loop.

use crate::actions::base::UsageSummary;
use crate::config::AddonConfig;
use crate::error::Result;
use crate::llm::{Citation, ContentBlock, LlmMessage, MessageRequest, ModelTransport};
use serde::{Deserialize, Serialize};

const DEFAULT_SEARCH_SYSTEM: &str = "You have access to real-time web search. Use it to find \
    current, accurate information to answer the user's question. Always cite your sources.";

// Queries carrying these terms are assumed to have triggered a search even
// when the provider reports no citations
const RECENCY_KEYWORDS: &[&str] = &["current", "latest", "recent", "2024", "2025", "today", "now"];

/// Inputs for the web search action
#[derive(Debug, Clone, Deserialize)]
pub struct WebSearchInput {
    /// Search query or question
    pub query: String,

    /// Max tokens (overrides config default)
    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// Temperature (overrides config default)
    #[serde(default)]
    pub temperature: Option<f32>,

    /// System prompt (overrides the search default)
    #[serde(default)]
    pub system: Option<String>,
}

impl WebSearchInput {
    /// Create an input carrying just the query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_tokens: None,
            temperature: None,
            system: None,
        }
    }
}

/// Output of the web search action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSearchOutput {
    /// The model's response with web information
    pub response: String,

    /// Sources the model used
    pub citations: Vec<Citation>,

    /// Whether the provider actually performed a search
    pub search_performed: bool,

    /// Model used
    pub model: String,

    /// Token usage
    pub usage: UsageSummary,

    /// Why the model stopped generating
    pub stop_reason: Option<String>,
}

/// Execute the web search action
pub async fn web_search(
    config: &AddonConfig,
    transport: &dyn ModelTransport,
    input: WebSearchInput,
) -> Result<WebSearchOutput> {
    tracing::debug!("Executing web_search with query: {:.100}...", input.query);

    let request = MessageRequest {
        model: config.model.clone(),
        max_tokens: input.max_tokens.unwrap_or(config.max_tokens),
        temperature: input.temperature.or(Some(config.temperature)),
        system: Some(
            input
                .system
                .clone()
                .unwrap_or_else(|| DEFAULT_SEARCH_SYSTEM.to_string()),
        ),
        messages: vec![LlmMessage::user(&input.query)],
        tools: None,
    };

    let response = transport.create_message(request).await?;

    let mut response_text = String::new();
    let mut citations = Vec::new();
    let mut search_performed = false;

    for block in &response.content {
        if let ContentBlock::Text {
            text,
            citations: block_citations,
        } = block
        {
            response_text.push_str(text);
            if let Some(cites) = block_citations {
                if !cites.is_empty() {
                    search_performed = true;
                    citations.extend(cites.iter().cloned());
                }
            }
        }
    }

    if !search_performed {
        let query = input.query.to_lowercase();
        search_performed = RECENCY_KEYWORDS.iter().any(|kw| query.contains(kw));
    }

    let usage = UsageSummary::from(response.usage);
    tracing::info!(
        "Web search successful. Found {} citations. Used {} tokens.",
        citations.len(),
        usage.total_tokens
    );

    Ok(WebSearchOutput {
        response: response_text,
        citations,
        search_performed,
        model: config.model.clone(),
        usage,
        stop_reason: response.stop_reason,
    })
}
