//! Error types and handling for the Anthropic Rooms addon

use thiserror::Error;

/// Result type alias for addon operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the addon
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Model transport errors
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Tool execution errors
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Action input validation errors
    #[error("Action error: {0}")]
    Action(#[from] ActionError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required secret: {name}")]
    MissingSecret { name: String },

    #[error("Invalid value for field '{field}': {value}")]
    InvalidValue { field: String, value: String },

    #[error("Invalid configuration format")]
    InvalidFormat,
}

/// Model transport errors; all of these are fatal to an in-flight
/// conversation turn
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {message}")]
    Network { message: String },
}

/// Tool execution errors; folded into per-call error results inside the
/// conversation loop, they never terminate it
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Tool not found: {name}")]
    NotFound { name: String },

    #[error("Tool execution failed: {name} - {message}")]
    ExecutionFailed { name: String, message: String },

    #[error("Invalid tool parameters: {message}")]
    InvalidParameters { message: String },
}

/// Action input validation errors
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("Either file_upload or file_id must be provided")]
    MissingFileSource,

    #[error("Cannot provide both file_upload and file_id")]
    ConflictingFileSource,

    #[error("File not found: {path}")]
    FileNotFound { path: String },
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Generic(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Generic(msg.to_string())
    }
}
