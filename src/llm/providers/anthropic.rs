//! Anthropic Messages API transport

use crate::config::AddonConfig;
use crate::error::{LlmError, Result};
use crate::llm::client::{MessageRequest, ModelResponse, ModelTransport, UploadedFile};
use async_trait::async_trait;
use reqwest::Client;
use std::path::Path;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const FILES_BETA: &str = "files-api-2025-04-14";

/// Anthropic API transport
pub struct AnthropicTransport {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl AnthropicTransport {
    /// Create a new transport from addon configuration
    pub fn new(config: &AddonConfig) -> Result<Self> {
        let api_key = config.api_key()?.to_string();
        if api_key.is_empty() {
            return Err(LlmError::Authentication {
                message: "Anthropic API key is empty".to_string(),
            }
            .into());
        }

        Ok(Self {
            client: Client::new(),
            api_key,
            base_url: "https://api.anthropic.com".to_string(),
            model: config.model.clone(),
        })
    }

    /// Override the API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl ModelTransport for AnthropicTransport {
    async fn create_message(&self, request: MessageRequest) -> Result<ModelResponse> {
        tracing::debug!("Calling Anthropic API with model: {}", request.model);

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Network {
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api { status, message }.into());
        }

        let model_response: ModelResponse =
            response.json().await.map_err(|e| LlmError::Network {
                message: format!("Failed to parse response: {}", e),
            })?;

        Ok(model_response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    /// Upload a file via the Files API, returning its metadata
    async fn upload_file(&self, path: &Path, filename: &str) -> Result<UploadedFile> {
        let bytes = tokio::fs::read(path).await?;

        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(format!("{}/v1/files", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("anthropic-beta", FILES_BETA)
            .multipart(form)
            .send()
            .await
            .map_err(|e| LlmError::Network {
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api { status, message }.into());
        }

        let uploaded: UploadedFile = response.json().await.map_err(|e| LlmError::Network {
            message: format!("Failed to parse upload response: {}", e),
        })?;

        tracing::info!("File uploaded successfully: {} (ID: {})", filename, uploaded.id);
        Ok(uploaded)
    }
}
