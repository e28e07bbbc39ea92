//! Error types for log list operations

use thiserror::Error;

/// Errors that can occur while loading a log list
#[derive(Debug, Error)]
pub enum Error {
    /// One of the three inputs could not be read
    #[error("failed to fetch {locator}: {reason}")]
    Fetch { locator: String, reason: String },

    /// The log list public key is not a usable PEM public key
    #[error("failed to parse log list public key: {0}")]
    KeyParse(String),

    /// The detached signature does not match the list
    #[error("log list signature verification failed: {0}")]
    Signature(String),

    /// The list is not valid log list JSON
    #[error("failed to parse log list: {0}")]
    Parse(#[from] serde_json::Error),

    /// A locator is neither a file path nor an http(s) URL
    #[error("invalid source {0}")]
    InvalidSource(String),
}

/// Result type for log list operations
pub type Result<T> = std::result::Result<T, Error>;
