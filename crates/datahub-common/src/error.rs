//! Error types shared by the Data Hub crates

use thiserror::Error;

/// Result type alias for shared operations
pub type Result<T> = std::result::Result<T, DataHubError>;

/// Errors raised by the shared utilities
#[derive(Error, Debug)]
pub enum DataHubError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },
}
