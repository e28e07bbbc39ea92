//! Shared fixtures: simulated CT logs, test certificates and SCTs
#![allow(dead_code)]

use chrono::Utc;
use const_oid::db::rfc6962::CT_PRECERT_SCTS;
use ct_crypto::KeyPair;
use ct_loglist::{LogDescriptor, LogRegistry, LogStatus};
use ct_merkle::{hash_children, hash_leaf};
use ct_types::Sha256Hash;
use ct_verify::client::BoxFuture;
use ct_verify::{
    Checker, CheckerConfig, ConnectionState, Error, InclusionProof, LogClient, LogClientFactory,
    MerkleTreeLeaf, Result, SctBytes, SignedTreeHead,
};
use rustls_pki_types::CertificateDer;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tls_codec::{SerializeBytes, TlsByteVecU16};
use x509_cert::der::asn1::OctetString;
use x509_cert::der::{Decode, Encode};
use x509_cert::ext::pkix::sct::{
    DigitallySigned, HashAlgorithm, LogId, SerializedSct, SignatureAlgorithm,
    SignatureAndHashAlgorithm, Version,
};
use x509_cert::ext::pkix::{SignedCertificateTimestamp, SignedCertificateTimestampList};
use x509_cert::ext::Extension;
use x509_cert::Certificate;

pub const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Current time in milliseconds since the epoch
pub fn now_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

pub fn ago(d: Duration) -> u64 {
    now_ms() - d.as_millis() as u64
}

fn ecdsa_sha256() -> SignatureAndHashAlgorithm {
    SignatureAndHashAlgorithm {
        hash: HashAlgorithm::Sha256,
        signature: SignatureAlgorithm::Ecdsa,
    }
}

/// How a simulated log answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Honest,
    /// Every request fails
    Offline,
    /// Requests take an hour
    Slow,
    /// Tree heads are signed by some other key
    ForgedTreeHead,
}

/// An in-memory CT log holding a real RFC 6962 tree
pub struct TestLog {
    pub key: KeyPair,
    pub descriptor: LogDescriptor,
    entries: Mutex<Vec<Sha256Hash>>,
    behavior: Mutex<Behavior>,
}

impl TestLog {
    pub fn new(name: &str, mmd: Duration) -> Arc<Self> {
        let key = KeyPair::generate_ecdsa_p256().unwrap();
        let descriptor = LogDescriptor::new(
            name,
            format!("https://{}.example.com/", name),
            key.public_key_to_der().unwrap(),
            LogStatus::Usable,
            mmd,
        )
        .with_operator("Test Operator");
        Arc::new(Self {
            key,
            descriptor,
            entries: Mutex::new(Vec::new()),
            behavior: Mutex::new(Behavior::Honest),
        })
    }

    pub fn set_behavior(&self, behavior: Behavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    fn behavior(&self) -> Behavior {
        *self.behavior.lock().unwrap()
    }

    /// Append a leaf hash to the tree
    pub fn append(&self, leaf_hash: Sha256Hash) {
        self.entries.lock().unwrap().push(leaf_hash);
    }

    /// Append unrelated entries
    pub fn append_noise(&self, count: usize) {
        for i in 0..count {
            self.append(hash_leaf(format!("noise {}", i).as_bytes()));
        }
    }

    /// Append the entry `sct` was issued for
    pub fn merge(&self, entry: &MerkleTreeLeaf, sct: &SctBytes) {
        self.append(entry.leaf_hash(&sct.parse().unwrap()).unwrap());
    }

    /// Issue an SCT for `entry` without merging it
    pub fn issue(&self, entry: &MerkleTreeLeaf, timestamp: u64) -> SctBytes {
        let mut sct = SignedCertificateTimestamp {
            version: Version::V1,
            log_id: LogId {
                key_id: *self.descriptor.key_id().as_bytes(),
            },
            timestamp,
            extensions: TlsByteVecU16::new(Vec::new()),
            signature: DigitallySigned {
                algorithm: ecdsa_sha256(),
                signature: TlsByteVecU16::new(Vec::new()),
            },
        };
        let sig = self.key.sign(&entry.signed_data(&sct).unwrap()).unwrap();
        sct.signature.signature = sig.as_bytes().into();
        SctBytes::new(sct.tls_serialize().unwrap())
    }

    /// Issue an SCT and merge its entry
    pub fn issue_merged(&self, entry: &MerkleTreeLeaf, timestamp: u64) -> SctBytes {
        let sct = self.issue(entry, timestamp);
        self.merge(entry, &sct);
        sct
    }

    fn sth(&self) -> SignedTreeHead {
        let entries = self.entries.lock().unwrap().clone();
        let root = if entries.is_empty() {
            Sha256Hash::from_bytes(ct_crypto::sha256(b""))
        } else {
            tree_root(&entries)
        };
        let mut sth = SignedTreeHead {
            tree_size: entries.len() as u64,
            timestamp: now_ms(),
            sha256_root_hash: root,
            tree_head_signature: Vec::new(),
        };

        let data = sth.signed_data().unwrap();
        let sig = match self.behavior() {
            Behavior::ForgedTreeHead => KeyPair::generate_ecdsa_p256()
                .unwrap()
                .sign(&data)
                .unwrap(),
            _ => self.key.sign(&data).unwrap(),
        };
        sth.tree_head_signature = DigitallySigned {
            algorithm: ecdsa_sha256(),
            signature: sig.as_bytes().into(),
        }
        .tls_serialize()
        .unwrap();
        sth
    }

    fn proof(&self, leaf_hash: Sha256Hash, tree_size: u64) -> Result<InclusionProof> {
        let entries = self.entries.lock().unwrap();
        let tree = entries
            .get(..tree_size as usize)
            .ok_or_else(|| Error::Client("tree size out of range".to_string()))?;
        let index = tree
            .iter()
            .position(|h| *h == leaf_hash)
            .ok_or_else(|| Error::Client("leaf not found".to_string()))?;
        Ok(InclusionProof {
            leaf_index: index as u64,
            audit_path: audit_path(index, tree),
        })
    }

    async fn answer(&self) -> Result<()> {
        match self.behavior() {
            Behavior::Offline => Err(Error::Client("connection refused".to_string())),
            Behavior::Slow => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

fn split(n: usize) -> usize {
    let mut k = 1;
    while k << 1 < n {
        k <<= 1;
    }
    k
}

/// MTH from RFC 6962 section 2.1
pub fn tree_root(leaves: &[Sha256Hash]) -> Sha256Hash {
    if leaves.len() == 1 {
        return leaves[0];
    }
    let k = split(leaves.len());
    hash_children(&tree_root(&leaves[..k]), &tree_root(&leaves[k..]))
}

/// PATH from RFC 6962 section 2.1.1
fn audit_path(m: usize, leaves: &[Sha256Hash]) -> Vec<Sha256Hash> {
    if leaves.len() <= 1 {
        return Vec::new();
    }
    let k = split(leaves.len());
    if m < k {
        let mut path = audit_path(m, &leaves[..k]);
        path.push(tree_root(&leaves[k..]));
        path
    } else {
        let mut path = audit_path(m - k, &leaves[k..]);
        path.push(tree_root(&leaves[..k]));
        path
    }
}

struct StubClient {
    log: Arc<TestLog>,
}

impl LogClient for StubClient {
    fn get_sth(&self) -> BoxFuture<'_, Result<SignedTreeHead>> {
        Box::pin(async move {
            self.log.answer().await?;
            Ok(self.log.sth())
        })
    }

    fn get_proof_by_hash(
        &self,
        leaf_hash: Sha256Hash,
        tree_size: u64,
    ) -> BoxFuture<'_, Result<InclusionProof>> {
        Box::pin(async move {
            self.log.answer().await?;
            self.log.proof(leaf_hash, tree_size)
        })
    }
}

/// Routes requests to simulated logs and counts how often clients are built
pub struct StubLogs {
    logs: Vec<Arc<TestLog>>,
    calls: AtomicUsize,
}

impl StubLogs {
    pub fn new(logs: &[Arc<TestLog>]) -> Arc<Self> {
        Arc::new(Self {
            logs: logs.to_vec(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LogClientFactory for StubLogs {
    fn client_for(&self, log: &LogDescriptor) -> Result<Box<dyn LogClient>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let log = self
            .logs
            .iter()
            .find(|l| l.descriptor.key_id() == log.key_id())
            .ok_or_else(|| Error::Client(format!("no route to {}", log.url())))?;
        Ok(Box::new(StubClient {
            log: Arc::clone(log),
        }))
    }
}

/// Registry trusting exactly `logs`
pub fn registry(logs: &[Arc<TestLog>]) -> Arc<LogRegistry> {
    Arc::new(LogRegistry::from_descriptors(
        logs.iter().map(|l| l.descriptor.clone()),
    ))
}

/// A checker trusting `trusted`; `reachable` are the logs the network can reach
pub fn checker_with(
    trusted: &[Arc<TestLog>],
    reachable: &[Arc<TestLog>],
    config: CheckerConfig,
) -> (Checker, Arc<StubLogs>) {
    let stubs = StubLogs::new(reachable);
    let checker = Checker::new(registry(trusted), stubs.clone(), config);
    (checker, stubs)
}

pub fn checker(logs: &[Arc<TestLog>]) -> (Checker, Arc<StubLogs>) {
    checker_with(logs, logs, CheckerConfig::default())
}

/// A CA and a leaf certificate it issued
pub struct TestPki {
    pub issuer: CertificateDer<'static>,
    pub leaf: CertificateDer<'static>,
}

impl TestPki {
    pub fn new() -> Self {
        let ca_key = rcgen::KeyPair::generate().unwrap();
        let mut ca_params = rcgen::CertificateParams::new(Vec::<String>::new()).unwrap();
        ca_params.is_ca = rcgen::IsCa::Ca(rcgen::BasicConstraints::Unconstrained);
        ca_params
            .distinguished_name
            .push(rcgen::DnType::CommonName, "Test CA");
        let ca = ca_params.self_signed(&ca_key).unwrap();

        let leaf_key = rcgen::KeyPair::generate().unwrap();
        let leaf_params =
            rcgen::CertificateParams::new(vec!["ct.example.com".to_string()]).unwrap();
        let leaf = leaf_params.signed_by(&leaf_key, &ca, &ca_key).unwrap();

        Self {
            issuer: ca.der().clone(),
            leaf: leaf.der().clone(),
        }
    }

    pub fn issuer_cert(&self) -> Certificate {
        Certificate::from_der(self.issuer.as_ref()).unwrap()
    }

    pub fn leaf_cert(&self) -> Certificate {
        Certificate::from_der(self.leaf.as_ref()).unwrap()
    }

    /// Entry for SCTs delivered in the handshake
    pub fn x509_entry(&self) -> MerkleTreeLeaf {
        MerkleTreeLeaf::from_x509(self.leaf.as_ref())
    }

    /// Entry for SCTs embedded into the leaf
    pub fn precert_entry(&self) -> MerkleTreeLeaf {
        MerkleTreeLeaf::from_precert(&self.leaf_cert(), &self.issuer_cert()).unwrap()
    }

    /// The leaf with `scts` embedded in the SCT list extension
    pub fn leaf_with_scts(&self, scts: &[SctBytes]) -> CertificateDer<'static> {
        let mut cert = self.leaf_cert();
        let serialized = scts
            .iter()
            .map(|s| SerializedSct::new(s.parse().unwrap()).unwrap())
            .collect::<Vec<_>>();
        let list = SignedCertificateTimestampList::new(&serialized).unwrap();
        let extension = Extension {
            extn_id: CT_PRECERT_SCTS,
            critical: false,
            extn_value: OctetString::new(list.to_der().unwrap()).unwrap(),
        };
        cert.tbs_certificate
            .extensions
            .get_or_insert_with(Vec::new)
            .push(extension);
        CertificateDer::from(cert.to_der().unwrap())
    }

    /// Leaf whose SCT list carries `entries` verbatim, decodable or not
    pub fn leaf_with_raw_scts(&self, entries: &[&[u8]]) -> CertificateDer<'static> {
        let mut list = Vec::new();
        for entry in entries {
            list.extend_from_slice(&(entry.len() as u16).to_be_bytes());
            list.extend_from_slice(entry);
        }
        let mut tls = (list.len() as u16).to_be_bytes().to_vec();
        tls.extend_from_slice(&list);

        let mut cert = self.leaf_cert();
        let extension = Extension {
            extn_id: CT_PRECERT_SCTS,
            critical: false,
            extn_value: OctetString::new(OctetString::new(tls).unwrap().to_der().unwrap())
                .unwrap(),
        };
        cert.tbs_certificate
            .extensions
            .get_or_insert_with(Vec::new)
            .push(extension);
        CertificateDer::from(cert.to_der().unwrap())
    }
}

/// Connection state carrying `certs` and handshake `scts`
pub fn connection(certs: &[CertificateDer<'static>], scts: &[SctBytes]) -> ConnectionState {
    ConnectionState {
        peer_certificates: certs.to_vec(),
        signed_certificate_timestamps: scts.iter().map(|s| s.as_bytes().to_vec()).collect(),
    }
}
