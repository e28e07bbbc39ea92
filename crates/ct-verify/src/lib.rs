//! Certificate Transparency checks for TLS connections
//!
//! This crate decides whether a TLS peer's certificate was publicly logged.
//! SCTs are taken from the TLS handshake and from the leaf certificate; a
//! connection passes when at least one SCT was issued by a trusted log, is
//! correctly signed, and is either provably included in the log or still
//! within the log's maximum merge delay.
//!
//! # Example
//!
//! ```no_run
//! use ct_verify::{check_connection_state, ConnectionState};
//!
//! # async fn example(state: ConnectionState) -> Result<(), ct_verify::Error> {
//! let outcome = check_connection_state(Some(&state)).await?;
//! println!("SCT from {} via {}", outcome.log_description, outcome.source);
//! # Ok(())
//! # }
//! ```
//!
//! Callers with their own trust store build a [`Checker`] directly:
//!
//! ```no_run
//! use ct_loglist::{LoaderConfig, LogList, LogRegistry};
//! use ct_verify::{CheckOptions, Checker, CheckerConfig, HttpLogClientFactory};
//! use std::sync::Arc;
//!
//! # async fn example(state: ct_verify::ConnectionState) -> Result<(), ct_verify::Error> {
//! let list = LogList::load(&LoaderConfig::from_dir("/etc/ct")).await?;
//! let checker = Checker::new(
//!     Arc::new(LogRegistry::new(&list)),
//!     Arc::new(HttpLogClientFactory::new()?),
//!     CheckerConfig::default(),
//! );
//! let outcome = checker
//!     .check(Some(&state), &CheckOptions::strict().require_inclusion())
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod chain;
pub mod checker;
pub mod client;
pub mod error;
pub mod evidence;
pub mod leaf;
pub mod validator;

pub use chain::{build_certificate_chain, CertificateChain, ChainCertificate};
pub use checker::{
    check_connection_state, check_scts, CheckOptions, CheckOutcome, Checker, CheckerConfig,
    ConnectionState, EvidenceOrder,
};
pub use client::{
    HttpLogClient, HttpLogClientFactory, InclusionProof, LogClient, LogClientFactory,
    SignedTreeHead,
};
pub use error::{Error, Result};
pub use evidence::{extract_embedded_scts, extract_handshake_scts, EvidenceSource, SctBytes};
pub use leaf::MerkleTreeLeaf;
pub use validator::{InclusionStatus, SctValidator};
