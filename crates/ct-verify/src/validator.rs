//! Per-SCT validation
//!
//! An SCT is accepted when its signature verifies under the key of a known
//! log and the log can prove that the entry is in its tree. A log has up to
//! its maximum merge delay to incorporate an entry, so a failed proof for a
//! young SCT is not held against it.

use crate::client::{LogClient, LogClientFactory};
use crate::error::{Error, Result};
use crate::evidence::SctBytes;
use crate::leaf::{signing_scheme, MerkleTreeLeaf};
use chrono::{DateTime, Utc};
use ct_crypto::PublicKey;
use ct_loglist::{LogDescriptor, LogRegistry};
use ct_types::{LogKeyId, Sha256Hash};
use std::sync::Arc;
use std::time::Duration;
use x509_cert::ext::pkix::SignedCertificateTimestamp;

/// How an accepted SCT was accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InclusionStatus {
    /// The log proved inclusion against a signed tree head
    Confirmed { leaf_index: u64, tree_size: u64 },
    /// Inclusion could not be proven, but the SCT is younger than the
    /// log's maximum merge delay
    WithinMergeDelay {
        age: Duration,
        max_merge_delay: Duration,
    },
}

impl InclusionStatus {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, InclusionStatus::Confirmed { .. })
    }
}

/// Validates individual SCTs against the trust store
#[derive(Clone)]
pub struct SctValidator {
    registry: Arc<LogRegistry>,
    clients: Arc<dyn LogClientFactory>,
    inclusion_timeout: Option<Duration>,
    accept_unmerged: bool,
}

impl SctValidator {
    /// Create a validator that accepts unmerged SCTs within the merge delay
    pub fn new(registry: Arc<LogRegistry>, clients: Arc<dyn LogClientFactory>) -> Self {
        Self {
            registry,
            clients,
            inclusion_timeout: None,
            accept_unmerged: true,
        }
    }

    /// Bound the time spent proving inclusion for one SCT
    pub fn with_inclusion_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.inclusion_timeout = timeout;
        self
    }

    /// Whether a failed proof within the merge delay is acceptable
    pub fn with_accept_unmerged(mut self, accept: bool) -> Self {
        self.accept_unmerged = accept;
        self
    }

    /// Validate one SCT for the given log entry
    pub async fn validate_one(
        &self,
        sct: &SctBytes,
        leaf: &MerkleTreeLeaf,
    ) -> Result<InclusionStatus> {
        self.validate_one_at(sct, leaf, Utc::now()).await
    }

    /// Validate one SCT as if the current time were `now`
    pub async fn validate_one_at(
        &self,
        sct: &SctBytes,
        leaf: &MerkleTreeLeaf,
        now: DateTime<Utc>,
    ) -> Result<InclusionStatus> {
        let sct = sct.parse()?;

        let key_id = LogKeyId::new(sct.log_id.key_id);
        let log = self
            .registry
            .find_by_key_id(&key_id)
            .ok_or(Error::UnknownLog(key_id))?;

        let client = self.clients.client_for(log)?;
        let key = verify_sct_signature(log, &sct, leaf)?;

        let leaf_hash = leaf.leaf_hash(&sct)?;
        let proof = match self.inclusion_timeout {
            Some(timeout) => {
                match tokio::time::timeout(timeout, prove_inclusion(client.as_ref(), &key, leaf_hash))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(Error::Client(format!(
                        "inclusion check timed out after {:?}",
                        timeout
                    ))),
                }
            }
            None => prove_inclusion(client.as_ref(), &key, leaf_hash).await,
        };

        match proof {
            Ok(status) => {
                tracing::debug!("Inclusion in log {:?} confirmed", log.description());
                Ok(status)
            }
            Err(e) => self.excuse_unmerged(log, sct.timestamp, now, e),
        }
    }

    fn excuse_unmerged(
        &self,
        log: &LogDescriptor,
        sct_timestamp: u64,
        now: DateTime<Utc>,
        cause: Error,
    ) -> Result<InclusionStatus> {
        let age = sct_age(sct_timestamp, now);
        let max_merge_delay = log.max_merge_delay();

        if age >= max_merge_delay || !self.accept_unmerged {
            return Err(Error::InclusionFailed {
                log: log.description().to_string(),
                reason: cause.to_string(),
            });
        }

        tracing::warn!(
            "Inclusion in log {:?} not proven ({}); accepting SCT aged {:?} within merge delay {:?}",
            log.description(),
            cause,
            age,
            max_merge_delay
        );
        Ok(InclusionStatus::WithinMergeDelay {
            age,
            max_merge_delay,
        })
    }
}

/// Verify the SCT signature over the entry, returning the parsed log key
fn verify_sct_signature(
    log: &LogDescriptor,
    sct: &SignedCertificateTimestamp,
    leaf: &MerkleTreeLeaf,
) -> Result<PublicKey> {
    let invalid = |reason: String| Error::SignatureInvalid {
        log: log.description().to_string(),
        reason,
    };

    let key = PublicKey::from_der(log.key()).map_err(|e| invalid(e.to_string()))?;
    let scheme = signing_scheme(&sct.signature.algorithm).map_err(|e| invalid(e.to_string()))?;
    let data = leaf.signed_data(sct)?;
    key.verify_with(&data, sct.signature.signature.as_slice(), scheme)
        .map_err(|e| invalid(e.to_string()))?;
    Ok(key)
}

async fn prove_inclusion(
    client: &dyn LogClient,
    key: &PublicKey,
    leaf_hash: Sha256Hash,
) -> Result<InclusionStatus> {
    let sth = client.get_sth().await?;
    sth.verify(key)?;
    if sth.tree_size == 0 {
        return Err(Error::Client("log tree is empty".to_string()));
    }

    let proof = client.get_proof_by_hash(leaf_hash, sth.tree_size).await?;
    ct_merkle::verify_inclusion_proof(
        &leaf_hash,
        proof.leaf_index,
        sth.tree_size,
        &proof.audit_path,
        &sth.sha256_root_hash,
    )
    .map_err(|e| Error::Client(format!("inclusion proof rejected: {}", e)))?;

    Ok(InclusionStatus::Confirmed {
        leaf_index: proof.leaf_index,
        tree_size: sth.tree_size,
    })
}

/// Time since the SCT was issued; SCTs from the future have age zero
fn sct_age(sct_timestamp: u64, now: DateTime<Utc>) -> Duration {
    let now_ms = u64::try_from(now.timestamp_millis()).unwrap_or(0);
    Duration::from_millis(now_ms.saturating_sub(sct_timestamp))
}
