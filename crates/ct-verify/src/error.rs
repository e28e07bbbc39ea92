//! Error types for SCT verification

use crate::evidence::EvidenceSource;
use ct_types::LogKeyId;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during SCT verification
#[derive(Error, Debug)]
pub enum Error {
    /// The TLS layer provided no connection state
    #[error("no TLS connection state")]
    NoConnectionState,

    /// The peer presented no certificates
    #[error("no peer certificates")]
    NoPeerCertificates,

    /// A peer certificate could not be decoded
    #[error("failed to parse certificate: {0}")]
    Certificate(String),

    /// A source carried no SCTs
    #[error("no SCTs in {0}")]
    EmptyEvidence(EvidenceSource),

    /// Embedded SCTs cannot be checked without the issuer certificate
    #[error("embedded SCTs require the issuer certificate")]
    MissingIssuer,

    /// SCT bytes are not a valid TLS-encoded SCT
    #[error("malformed SCT: {0}")]
    MalformedSct(String),

    /// The SCT names a log that is not in the trust store
    #[error("no log found with key ID {0}")]
    UnknownLog(LogKeyId),

    /// The SCT signature does not verify under the log's key
    #[error("failed to verify signature from log {log:?}: {reason}")]
    SignatureInvalid { log: String, reason: String },

    /// Inclusion could not be proven and the merge delay has passed
    #[error("failed to verify inclusion in log {log:?}: {reason}")]
    InclusionFailed { log: String, reason: String },

    /// Neither source contained any SCT
    #[error("no Signed Certificate Timestamps found")]
    NoEvidence,

    /// SCTs were found but none of them was valid
    #[error("no valid SCT: {0}")]
    NoValidSct(Box<Error>),

    /// Loading the trust store failed
    #[error(transparent)]
    LogList(#[from] ct_loglist::Error),

    /// Talking to a CT log failed
    #[error("CT log client error: {0}")]
    Client(String),

    /// The process-wide default checker could not be built
    #[error("default checker unavailable: {0}")]
    DefaultUnavailable(Arc<Error>),
}

/// Result type for SCT verification
pub type Result<T> = std::result::Result<T, Error>;
