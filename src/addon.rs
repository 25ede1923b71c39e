//! Addon facade consumed by the workflow engine
//!
//! One instance serves one conversation turn at a time: the engine loads
//! config and credentials once, then for each turn registers tools, invokes
//! a single action to completion, and clears the registry. The facade never
//! raises at the action boundary; the engine branches on the envelope code.

use crate::actions::{
    chat_completion, file_analysis, web_search, ActionResponse, ChatInput, ChatOutput,
    FileAnalysisInput, FileAnalysisOutput, TokensSchema, UsageSummary, WebSearchInput,
    WebSearchOutput,
};
use crate::config::AddonConfig;
use crate::credentials::CredentialsRegistry;
use crate::error::{ConfigError, Result};
use crate::llm::{AnthropicTransport, ModelTransport, ToolDefinition};
use crate::tools::{ToolFunction, ToolGroup, ToolRegistry};
use std::collections::HashMap;
use std::sync::Arc;

/// Anthropic addon for the Rooms workflow engine
pub struct AnthropicRoomsAddon {
    config: AddonConfig,
    credentials: CredentialsRegistry,
    tool_registry: ToolRegistry,
    transport: Option<Arc<dyn ModelTransport>>,
}

impl AnthropicRoomsAddon {
    /// Create an addon with no configuration loaded yet
    pub fn new() -> Self {
        Self {
            config: AddonConfig::default(),
            credentials: CredentialsRegistry::new(),
            tool_registry: ToolRegistry::new(),
            transport: None,
        }
    }

    /// Replace the model transport; used by tests and host integrations
    /// that bring their own client
    pub fn with_transport(mut self, transport: Arc<dyn ModelTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Load addon configuration received from the engine
    pub fn load_addon_config(&mut self, value: serde_json::Value) -> Result<()> {
        let config = AddonConfig::from_value(value)?;
        tracing::info!("Addon configuration loaded successfully: model={}", config.model);
        self.config = config;
        Ok(())
    }

    /// Load credentials into the addon's credential store
    ///
    /// Every secret named by the configuration must be present.
    pub fn load_credentials(&mut self, credentials: HashMap<String, String>) -> Result<()> {
        tracing::debug!("Loading credentials...");

        let missing = self
            .config
            .secrets
            .keys()
            .find(|name| !credentials.contains_key(*name));
        if let Some(name) = missing {
            return Err(ConfigError::MissingSecret { name: name.clone() }.into());
        }

        let count = credentials.len();
        self.credentials.store_multiple(credentials);
        tracing::info!("Loaded {} credentials successfully", count);
        Ok(())
    }

    /// Register tool groups for the next conversation turn
    pub fn load_tools(
        &mut self,
        tools_dict: &[(String, ToolGroup)],
        tool_functions: &HashMap<String, ToolFunction>,
        context: &str,
    ) {
        tracing::debug!(
            "Loading tools: {} tool groups, {} functions, context length {}",
            tools_dict.len(),
            tool_functions.len(),
            context.len()
        );
        self.tool_registry
            .register(tools_dict, tool_functions, context);
    }

    /// Register tool groups from the engine's raw JSON tools dictionary
    ///
    /// Malformed entries are logged and skipped; they never abort
    /// registration of the well-formed ones.
    pub fn load_tools_from_value(
        &mut self,
        tools_dict: &serde_json::Value,
        tool_functions: &HashMap<String, ToolFunction>,
        context: &str,
    ) {
        let Some(object) = tools_dict.as_object() else {
            tracing::warn!("Tools dictionary is not an object, skipping registration");
            return;
        };

        let mut groups = Vec::new();
        for (name, entry) in object {
            match serde_json::from_value::<ToolGroup>(entry.clone()) {
                Ok(group) => groups.push((name.clone(), group)),
                Err(e) => {
                    tracing::warn!("Skipping malformed tool group '{}': {}", name, e);
                }
            }
        }
        self.tool_registry
            .register(&groups, tool_functions, context);
    }

    /// Current tool definitions in the provider's wire format
    pub fn get_tools(&self) -> Vec<ToolDefinition> {
        self.tool_registry.wire_format()
    }

    /// Remove all registered tools
    pub fn clear_tools(&mut self) {
        self.tool_registry.clear();
    }

    /// Access the tool registry
    pub fn tool_registry(&self) -> &ToolRegistry {
        &self.tool_registry
    }

    // The engine may deliver the API key either inside the config's secrets
    // or through a later load_credentials call
    fn resolved_config(&self) -> AddonConfig {
        let mut config = self.config.clone();
        if !config.secrets.contains_key("anthropic_api_key") {
            if let Some(key) = self.credentials.get("anthropic_api_key") {
                config
                    .secrets
                    .insert("anthropic_api_key".to_string(), key.to_string());
            }
        }
        config
    }

    fn transport(&self, config: &AddonConfig) -> Result<Arc<dyn ModelTransport>> {
        match &self.transport {
            Some(transport) => Ok(Arc::clone(transport)),
            None => Ok(Arc::new(AnthropicTransport::new(config)?)),
        }
    }

    /// Run a chat completion, driving the tool-execution loop when tools
    /// are registered
    pub async fn chat_completion(&self, input: ChatInput) -> ActionResponse<ChatOutput> {
        let config = self.resolved_config();
        let result = async {
            let transport = self.transport(&config)?;
            chat_completion(&config, transport.as_ref(), &self.tool_registry, input).await
        }
        .await;

        match result {
            Ok(output) => {
                let total = output.usage.total_tokens;
                ActionResponse::success(
                    output,
                    TokensSchema {
                        step_amount: total,
                        total_current_amount: total,
                    },
                    "Chat completion successful",
                )
            }
            Err(e) => {
                tracing::error!("Chat completion failed: {}", e);
                ActionResponse::failure(
                    ChatOutput {
                        response: format!("Error: {}", e),
                        model: config.model.clone(),
                        usage: UsageSummary::default(),
                        stop_reason: Some("error".to_string()),
                        truncated: false,
                    },
                    format!("Chat completion failed: {}", e),
                )
            }
        }
    }

    /// Analyze a file with a single model round-trip
    pub async fn file_analysis(&self, input: FileAnalysisInput) -> ActionResponse<FileAnalysisOutput> {
        let config = self.resolved_config();
        let result = async {
            let transport = self.transport(&config)?;
            file_analysis(&config, transport.as_ref(), input).await
        }
        .await;

        match result {
            Ok(output) => {
                let tokens = TokensSchema {
                    step_amount: output.usage.output_tokens,
                    total_current_amount: output.usage.total_tokens,
                };
                ActionResponse::success(output, tokens, "File analysis successful")
            }
            Err(e) => {
                tracing::error!("File analysis failed: {}", e);
                ActionResponse::failure(
                    FileAnalysisOutput {
                        response: format!("Error: {}", e),
                        file_info: None,
                        model: config.model.clone(),
                        usage: UsageSummary::default(),
                        stop_reason: Some("error".to_string()),
                    },
                    format!("File analysis failed: {}", e),
                )
            }
        }
    }

    /// Answer a query with web information in a single model round-trip
    pub async fn web_search(&self, input: WebSearchInput) -> ActionResponse<WebSearchOutput> {
        let config = self.resolved_config();
        let result = async {
            let transport = self.transport(&config)?;
            web_search(&config, transport.as_ref(), input).await
        }
        .await;

        match result {
            Ok(output) => {
                let tokens = TokensSchema {
                    step_amount: output.usage.output_tokens,
                    total_current_amount: output.usage.total_tokens,
                };
                ActionResponse::success(output, tokens, "Web search successful")
            }
            Err(e) => {
                tracing::error!("Web search failed: {}", e);
                ActionResponse::failure(
                    WebSearchOutput {
                        response: format!("Error: {}", e),
                        citations: Vec::new(),
                        search_performed: false,
                        model: config.model.clone(),
                        usage: UsageSummary::default(),
                        stop_reason: Some("error".to_string()),
                    },
                    format!("Web search failed: {}", e),
                )
            }
        }
    }
}

impl Default for AnthropicRoomsAddon {
    fn default() -> Self {
        Self::new()
    }
}
