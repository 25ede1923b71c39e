//! File analysis action
//!
//! Single round-trip: optionally upload a file via the Files API, then ask
//! the model one question about it. Does not consult the tool registry or
//! the conversation loop.

use crate::actions::base::UsageSummary;
use crate::config::AddonConfig;
use crate::error::{ActionError, Result};
use crate::llm::{ContentBlock, LlmMessage, MessageRequest, MessageRole, ModelTransport};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A file to upload before analysis
#[derive(Debug, Clone, Deserialize)]
pub struct FileUpload {
    /// Path to the file to upload
    pub file_path: String,

    /// Custom filename; the path's basename when not provided
    #[serde(default)]
    pub filename: Option<String>,

    /// Purpose of the upload
    #[serde(default = "default_purpose")]
    pub purpose: String,
}

fn default_purpose() -> String {
    "analysis".to_string()
}

/// Inputs for the file analysis action
#[derive(Debug, Clone, Deserialize)]
pub struct FileAnalysisInput {
    /// Question or instruction about the file
    pub message: String,

    /// File to upload and analyze
    #[serde(default)]
    pub file_upload: Option<FileUpload>,

    /// ID of an already uploaded file
    #[serde(default)]
    pub file_id: Option<String>,

    /// Max tokens (overrides config default)
    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// Temperature (overrides config default)
    #[serde(default)]
    pub temperature: Option<f32>,
}

/// Metadata for the file that was analyzed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfo {
    /// File ID
    pub id: String,

    /// Original filename
    pub filename: String,

    /// File size in bytes
    pub size_bytes: u64,

    /// File type
    #[serde(rename = "type")]
    pub kind: String,
}

/// Output of the file analysis action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileAnalysisOutput {
    /// The model's analysis of the file
    pub response: String,

    /// Information about the uploaded file, when an upload happened
    pub file_info: Option<FileInfo>,

    /// Model used
    pub model: String,

    /// Token usage
    pub usage: UsageSummary,

    /// Why the model stopped generating
    pub stop_reason: Option<String>,
}

/// Execute the file analysis action
pub async fn file_analysis(
    config: &AddonConfig,
    transport: &dyn ModelTransport,
    input: FileAnalysisInput,
) -> Result<FileAnalysisOutput> {
    tracing::debug!(
        "Executing file_analysis with message: {:.100}...",
        input.message
    );

    if input.file_upload.is_none() && input.file_id.is_none() {
        return Err(ActionError::MissingFileSource.into());
    }
    if input.file_upload.is_some() && input.file_id.is_some() {
        return Err(ActionError::ConflictingFileSource.into());
    }

    let mut file_info = None;
    let file_id = match (&input.file_upload, &input.file_id) {
        (Some(upload), _) => {
            let path = Path::new(&upload.file_path);
            if !path.exists() {
                return Err(ActionError::FileNotFound {
                    path: upload.file_path.clone(),
                }
                .into());
            }

            let filename = upload
                .filename
                .clone()
                .or_else(|| path.file_name().map(|n| n.to_string_lossy().into_owned()))
                .unwrap_or_else(|| upload.file_path.clone());

            tracing::debug!("Uploading file: {}", upload.file_path);
            let uploaded = transport.upload_file(path, &filename).await?;

            file_info = Some(FileInfo {
                id: uploaded.id.clone(),
                filename,
                size_bytes: uploaded.size_bytes,
                kind: uploaded.mime_type,
            });
            uploaded.id
        }
        (None, Some(id)) => id.clone(),
        (None, None) => unreachable!(),
    };

    let request = MessageRequest {
        model: config.model.clone(),
        max_tokens: input.max_tokens.unwrap_or(config.max_tokens),
        temperature: input.temperature.or(Some(config.temperature)),
        system: None,
        messages: vec![LlmMessage::blocks(
            MessageRole::User,
            vec![
                ContentBlock::document(&file_id),
                ContentBlock::text(&input.message),
            ],
        )],
        tools: None,
    };

    let response = transport.create_message(request).await?;
    let usage = UsageSummary::from(response.usage);

    tracing::info!("File analysis successful. Used {} tokens.", usage.total_tokens);

    Ok(FileAnalysisOutput {
        response: response.text(),
        file_info,
        model: config.model.clone(),
        usage,
        stop_reason: response.stop_reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ModelResponse, UploadedFile, Usage};
    use std::sync::Mutex;

    fn config() -> AddonConfig {
        let mut config = AddonConfig::default();
        config
            .secrets
            .insert("anthropic_api_key".to_string(), "sk-test".to_string());
        config
    }

    struct NoopTransport;

    #[async_trait::async_trait]
    impl ModelTransport for NoopTransport {
        async fn create_message(
            &self,
            _request: MessageRequest,
        ) -> Result<crate::llm::ModelResponse> {
            unreachable!("input validation must reject before any request")
        }

        fn model_name(&self) -> &str {
            "claude-3-5-sonnet-20241022"
        }
    }

    struct UploadingTransport {
        last_request: Mutex<Option<MessageRequest>>,
    }

    #[async_trait::async_trait]
    impl ModelTransport for UploadingTransport {
        async fn create_message(&self, request: MessageRequest) -> Result<ModelResponse> {
            *self.last_request.lock().unwrap() = Some(request);
            Ok(ModelResponse {
                content: vec![ContentBlock::text("a quarterly report")],
                model: "claude-3-5-sonnet-20241022".to_string(),
                stop_reason: Some("end_turn".to_string()),
                usage: Usage {
                    input_tokens: 10,
                    output_tokens: 5,
                },
            })
        }

        fn model_name(&self) -> &str {
            "claude-3-5-sonnet-20241022"
        }

        async fn upload_file(&self, _path: &Path, filename: &str) -> Result<UploadedFile> {
            Ok(UploadedFile {
                id: "file_abc".to_string(),
                filename: filename.to_string(),
                size_bytes: 42,
                mime_type: "application/pdf".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_upload_then_analyze_builds_document_request() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        let transport = UploadingTransport {
            last_request: Mutex::new(None),
        };
        let input = FileAnalysisInput {
            message: "summarize this".to_string(),
            file_upload: Some(FileUpload {
                file_path: path.to_string_lossy().into_owned(),
                filename: None,
                purpose: default_purpose(),
            }),
            file_id: None,
            max_tokens: None,
            temperature: None,
        };

        let output = file_analysis(&config(), &transport, input).await.unwrap();

        let info = output.file_info.expect("upload must yield file info");
        assert_eq!(info.id, "file_abc");
        assert_eq!(info.filename, "report.pdf");
        assert_eq!(output.response, "a quarterly report");

        // The one request must reference the uploaded file as a document block
        let request = transport.last_request.lock().unwrap().take().unwrap();
        let text = serde_json::to_string(&request.messages[0]).unwrap();
        assert!(text.contains("\"type\":\"document\""));
        assert!(text.contains("file_abc"));
        assert!(text.contains("summarize this"));
    }

    #[tokio::test]
    async fn test_requires_a_file_source() {
        let input = FileAnalysisInput {
            message: "what is this?".to_string(),
            file_upload: None,
            file_id: None,
            max_tokens: None,
            temperature: None,
        };
        let result = file_analysis(&config(), &NoopTransport, input).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_rejects_both_file_sources() {
        let input = FileAnalysisInput {
            message: "what is this?".to_string(),
            file_upload: Some(FileUpload {
                file_path: "/tmp/report.pdf".to_string(),
                filename: None,
                purpose: default_purpose(),
            }),
            file_id: Some("file_123".to_string()),
            max_tokens: None,
            temperature: None,
        };
        let result = file_analysis(&config(), &NoopTransport, input).await;
        assert!(result.is_err());
    }
}
