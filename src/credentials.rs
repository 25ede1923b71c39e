//! In-memory credential store

use std::collections::HashMap;

/// Registry for secrets handed over by the workflow engine
#[derive(Debug, Default)]
pub struct CredentialsRegistry {
    secrets: HashMap<String, String>,
}

impl CredentialsRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a single credential
    pub fn store(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.secrets.insert(key.into(), value.into());
    }

    /// Store a batch of credentials
    pub fn store_multiple(&mut self, credentials: HashMap<String, String>) {
        self.secrets.extend(credentials);
    }

    /// Get a credential by key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.secrets.get(key).map(|s| s.as_str())
    }

    /// Number of stored credentials
    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    /// Whether the registry holds no credentials
    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}
