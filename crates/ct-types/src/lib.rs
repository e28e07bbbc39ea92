//! Core types for Certificate Transparency verification
//!
//! This crate provides the small, type-safe building blocks shared by the
//! rest of the workspace: fixed-size SHA-256 digests that travel as base64 in
//! JSON, and the 32-byte log identifiers that SCTs refer to.

pub mod encoding;
pub mod error;

pub use encoding::{LogKeyId, Sha256Hash};
pub use error::{Error, Result};
