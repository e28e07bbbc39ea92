//! Cryptographic primitives for Certificate Transparency verification
//!
//! This crate provides hashing, public-key parsing and signature verification
//! using aws-lc-rs as the cryptographic backend. Key generation and signing
//! are included so tests can act as a log or a log-list publisher.

pub mod error;
pub mod hash;
pub mod keys;
pub mod signing;
pub mod verification;

pub use error::{Error, Result};
pub use hash::sha256;
pub use keys::{parse_public_key_pem, PublicKey};
pub use signing::{KeyPair, Signature, SigningScheme};
pub use verification::{verify_signature, VerificationKey};
