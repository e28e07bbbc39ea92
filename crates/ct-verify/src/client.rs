//! CT log client for the RFC 6962 read API
//!
//! Only the two calls needed to prove inclusion are implemented:
//! `get-sth` and `get-proof-by-hash`.

use crate::error::{Error, Result};
use crate::leaf::{signing_scheme, SignatureType};
use ct_crypto::PublicKey;
use ct_loglist::LogDescriptor;
use ct_types::{encoding::base64_bytes, Sha256Hash};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tls_codec::{DeserializeBytes, SerializeBytes, TlsSerializeBytes, TlsSize};
use x509_cert::ext::pkix::sct::{DigitallySigned, Version};

/// Boxed future returned by [`LogClient`] methods
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Default User-Agent sent to CT logs
pub const DEFAULT_USER_AGENT: &str = concat!("ct-verify/", env!("CARGO_PKG_VERSION"));

/// A signed tree head as returned by `get-sth`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTreeHead {
    pub tree_size: u64,
    /// Milliseconds since the epoch
    pub timestamp: u64,
    pub sha256_root_hash: Sha256Hash,
    /// TLS-encoded `digitally-signed` struct
    #[serde(with = "base64_bytes")]
    pub tree_head_signature: Vec<u8>,
}

/// TreeHeadSignature as defined in RFC 6962 section 3.5
#[derive(PartialEq, Debug, TlsSerializeBytes, TlsSize)]
struct TreeHeadSignature {
    version: Version,
    signature_type: SignatureType,
    timestamp: u64,
    tree_size: u64,
    sha256_root_hash: [u8; 32],
}

impl SignedTreeHead {
    /// Bytes covered by `tree_head_signature`
    pub fn signed_data(&self) -> Result<Vec<u8>> {
        TreeHeadSignature {
            version: Version::V1,
            signature_type: SignatureType::TreeHash,
            timestamp: self.timestamp,
            tree_size: self.tree_size,
            sha256_root_hash: *self.sha256_root_hash.as_bytes(),
        }
        .tls_serialize()
        .map_err(|e| Error::Client(format!("failed to serialize tree head: {:?}", e)))
    }

    /// Check the tree head signature with the log's key
    pub fn verify(&self, key: &PublicKey) -> Result<()> {
        let (signature, rest) = DigitallySigned::tls_deserialize_bytes(&self.tree_head_signature)
            .map_err(|e| Error::Client(format!("malformed tree head signature: {:?}", e)))?;
        if !rest.is_empty() {
            return Err(Error::Client(
                "trailing bytes after tree head signature".to_string(),
            ));
        }
        let scheme = signing_scheme(&signature.algorithm)?;
        key.verify_with(&self.signed_data()?, signature.signature.as_slice(), scheme)
            .map_err(|e| Error::Client(format!("invalid tree head signature: {}", e)))
    }
}

/// An audit path as returned by `get-proof-by-hash`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionProof {
    pub leaf_index: u64,
    pub audit_path: Vec<Sha256Hash>,
}

/// Read access to one CT log
pub trait LogClient: Send + Sync {
    /// Fetch the latest signed tree head
    fn get_sth(&self) -> BoxFuture<'_, Result<SignedTreeHead>>;

    /// Fetch the audit path for `leaf_hash` in the tree of `tree_size`
    fn get_proof_by_hash(
        &self,
        leaf_hash: Sha256Hash,
        tree_size: u64,
    ) -> BoxFuture<'_, Result<InclusionProof>>;
}

/// Builds a [`LogClient`] for a log from the trust store
pub trait LogClientFactory: Send + Sync {
    fn client_for(&self, log: &LogDescriptor) -> Result<Box<dyn LogClient>>;
}

/// A client for a CT log's HTTP API
pub struct HttpLogClient {
    /// Base URL of the log, without trailing slash
    url: String,
    /// HTTP client
    client: reqwest::Client,
}

impl HttpLogClient {
    /// Create a client sharing an existing HTTP connection pool
    pub fn new(url: impl Into<String>, client: reqwest::Client) -> Self {
        let url = url.into().trim_end_matches('/').to_string();
        Self { url, client }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_sth(&self) -> Result<SignedTreeHead> {
        let url = format!("{}/ct/v1/get-sth", self.url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Client(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Client(format!(
                "failed to get STH from {}: {}",
                self.url,
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Client(format!("failed to parse JSON: {}", e)))
    }

    async fn fetch_proof(&self, leaf_hash: Sha256Hash, tree_size: u64) -> Result<InclusionProof> {
        let url = format!("{}/ct/v1/get-proof-by-hash", self.url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("hash", leaf_hash.to_base64()),
                ("tree_size", tree_size.to_string()),
            ])
            .send()
            .await
            .map_err(|e| Error::Client(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Client(format!(
                "failed to get inclusion proof from {}: {}",
                self.url,
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Client(format!("failed to parse JSON: {}", e)))
    }
}

impl LogClient for HttpLogClient {
    fn get_sth(&self) -> BoxFuture<'_, Result<SignedTreeHead>> {
        Box::pin(self.fetch_sth())
    }

    fn get_proof_by_hash(
        &self,
        leaf_hash: Sha256Hash,
        tree_size: u64,
    ) -> BoxFuture<'_, Result<InclusionProof>> {
        Box::pin(self.fetch_proof(leaf_hash, tree_size))
    }
}

/// Hands out [`HttpLogClient`]s that share one connection pool
#[derive(Debug, Clone)]
pub struct HttpLogClientFactory {
    client: reqwest::Client,
}

impl HttpLogClientFactory {
    /// Create a factory with the default User-Agent and no request timeout
    pub fn new() -> Result<Self> {
        Self::with_options(DEFAULT_USER_AGENT, None)
    }

    /// Create a factory with a custom User-Agent and request timeout
    pub fn with_options(user_agent: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Client(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl LogClientFactory for HttpLogClientFactory {
    fn client_for(&self, log: &LogDescriptor) -> Result<Box<dyn LogClient>> {
        Ok(Box::new(HttpLogClient::new(log.url(), self.client.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ct_crypto::KeyPair;
    use x509_cert::ext::pkix::sct::{HashAlgorithm, SignatureAlgorithm, SignatureAndHashAlgorithm};

    fn signed_sth(kp: &KeyPair) -> SignedTreeHead {
        let mut sth = SignedTreeHead {
            tree_size: 7,
            timestamp: 1_700_000_000_000,
            sha256_root_hash: Sha256Hash::from_bytes([3u8; 32]),
            tree_head_signature: Vec::new(),
        };
        let sig = kp.sign(&sth.signed_data().unwrap()).unwrap();
        sth.tree_head_signature = DigitallySigned {
            algorithm: SignatureAndHashAlgorithm {
                hash: HashAlgorithm::Sha256,
                signature: SignatureAlgorithm::Ecdsa,
            },
            signature: sig.as_bytes().into(),
        }
        .tls_serialize()
        .unwrap();
        sth
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = HttpLogClient::new("https://ct.example.com/2025h1/", reqwest::Client::new());
        assert_eq!(client.url(), "https://ct.example.com/2025h1");
    }

    #[test]
    fn test_sth_json() {
        let json = r#"{
            "tree_size": 3,
            "timestamp": 1447955443456,
            "sha256_root_hash": "AwMDAwMDAwMDAwMDAwMDAwMDAwMDAwMDAwMDAwMDAwM=",
            "tree_head_signature": "BAMABAECAwQ="
        }"#;
        let sth: SignedTreeHead = serde_json::from_str(json).unwrap();
        assert_eq!(sth.tree_size, 3);
        assert_eq!(sth.sha256_root_hash, Sha256Hash::from_bytes([3u8; 32]));
        assert_eq!(sth.tree_head_signature, vec![4, 3, 0, 4, 1, 2, 3, 4]);
    }

    #[test]
    fn test_proof_json() {
        let json = r#"{"leaf_index": 5, "audit_path": ["AwMDAwMDAwMDAwMDAwMDAwMDAwMDAwMDAwMDAwMDAwM="]}"#;
        let proof: InclusionProof = serde_json::from_str(json).unwrap();
        assert_eq!(proof.leaf_index, 5);
        assert_eq!(proof.audit_path.len(), 1);
    }

    #[test]
    fn test_sth_signature() {
        let kp = KeyPair::generate_ecdsa_p256().unwrap();
        let key = PublicKey::from_der(&kp.public_key_to_der().unwrap()).unwrap();
        let sth = signed_sth(&kp);
        assert!(sth.verify(&key).is_ok());

        let mut forged = sth.clone();
        forged.tree_size += 1;
        assert!(forged.verify(&key).is_err());
    }
}
