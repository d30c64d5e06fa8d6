//! Error types for the uploader
//!
//! Manifest problems found by the validator are not errors: they are logged
//! and folded into a boolean outcome. The variants here cover the cases where
//! validation cannot run at all.

use thiserror::Error;

/// Result type alias for uploader operations
pub type Result<T> = std::result::Result<T, UploaderError>;

#[derive(Error, Debug)]
pub enum UploaderError {
    /// Required file is missing
    #[error("File not found: '{0}'. Verify the path exists and you have read permissions.")]
    FileNotFound(String),

    /// Manifest could not be read as a tab-separated file
    #[error("Invalid manifest: {0}. The manifest must be a tab-separated file with a header line.")]
    InvalidManifest(String),

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Check the config file and DATAHUB_* environment variables.")]
    Config(String),

    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}. Check the file syntax at the indicated line/column.")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to read manifest: {0}")]
    Csv(#[from] csv::Error),
}

impl UploaderError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_manifest(msg: impl Into<String>) -> Self {
        Self::InvalidManifest(msg.into())
    }
}
