//! Error types for the vocabulary puller

use thiserror::Error;

/// Result type alias for puller operations
pub type Result<T> = std::result::Result<T, PullerError>;

#[derive(Error, Debug)]
pub enum PullerError {
    /// Neither the data commons list nor the hidden model list leaves anything to pull
    #[error("No model configured for pulling property PVs.")]
    NoModelConfigured,

    /// The run was interrupted before it finished
    #[error("Task is stopped...")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    /// A storage backend failed
    #[error("Storage error: {0}")]
    Store(String),

    #[error("STS request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    #[cfg(feature = "mongo")]
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),
}

impl PullerError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }
}
