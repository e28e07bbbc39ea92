//! Error types for ct-types

use thiserror::Error;

/// Errors that can occur in ct-types
#[derive(Error, Debug)]
pub enum Error {
    /// Base64 decoding error
    #[error("Base64 decoding error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Invalid encoding (wrong length, bad hex, ...)
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),
}

/// Result type for ct-types operations
pub type Result<T> = std::result::Result<T, Error>;
