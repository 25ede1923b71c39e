//! Addon configuration
//!
//! The workflow engine hands the addon a fully resolved configuration value;
//! discovery and merging happen on the engine side.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default Anthropic model when the engine supplies none
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";

/// Addon-level defaults for model requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddonConfig {
    /// Anthropic model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum tokens for responses
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Temperature for text generation
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Secret values supplied by the engine (must include `anthropic_api_key`)
    #[serde(default)]
    pub secrets: HashMap<String, String>,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.7
}

impl Default for AddonConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            secrets: HashMap::new(),
        }
    }
}

impl AddonConfig {
    /// Parse a configuration value received from the engine
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let config: AddonConfig =
            serde_json::from_value(value).map_err(|_| ConfigError::InvalidFormat)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.model.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "model".to_string(),
                value: self.model.clone(),
            }
            .into());
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "temperature".to_string(),
                value: self.temperature.to_string(),
            }
            .into());
        }

        if !self.secrets.contains_key("anthropic_api_key") {
            return Err(ConfigError::MissingSecret {
                name: "anthropic_api_key".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Get the Anthropic API key from the secrets map
    pub fn api_key(&self) -> Result<&str> {
        self.secrets
            .get("anthropic_api_key")
            .map(|s| s.as_str())
            .ok_or_else(|| {
                ConfigError::MissingSecret {
                    name: "anthropic_api_key".to_string(),
                }
                .into()
            })
    }
}
