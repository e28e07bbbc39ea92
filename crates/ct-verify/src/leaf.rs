//! RFC 6962 log entries and the structures signed over them
//!
//! From one [`MerkleTreeLeaf`] and an SCT two encodings are derived: the
//! `digitally-signed` input of the SCT signature (section 3.2) and the
//! `MerkleTreeLeaf` whose hash the log's tree contains (section 3.4).

use crate::error::{Error, Result};
use const_oid::db::rfc6962::CT_PRECERT_SCTS;
use ct_crypto::{sha256, SigningScheme};
use ct_merkle::hash_leaf;
use ct_types::Sha256Hash;
use tls_codec::{SerializeBytes, TlsByteVecU16, TlsByteVecU24, TlsSerializeBytes, TlsSize};
use x509_cert::{
    der::Encode,
    ext::pkix::{
        sct::{SignatureAndHashAlgorithm, Version},
        SignedCertificateTimestamp,
    },
    Certificate,
};

// TLS SignatureAndHashAlgorithm constants (RFC 5246)
const ECDSA_SHA256: u16 = 0x0403;
const ECDSA_SHA384: u16 = 0x0503;
const RSA_PKCS1_SHA256: u16 = 0x0401;
const RSA_PKCS1_SHA384: u16 = 0x0501;
const RSA_PKCS1_SHA512: u16 = 0x0601;

/// SignatureType as defined in RFC 6962
#[derive(PartialEq, Debug, TlsSerializeBytes, TlsSize)]
#[repr(u8)]
pub(crate) enum SignatureType {
    CertificateTimestamp = 0,
    TreeHash = 1,
}

/// MerkleLeafType as defined in RFC 6962
#[derive(PartialEq, Debug, TlsSerializeBytes, TlsSize)]
#[repr(u8)]
enum MerkleLeafType {
    TimestampedEntry = 0,
}

/// LogEntryType as defined in RFC 6962
#[derive(PartialEq, Debug)]
#[repr(u16)]
enum LogEntryType {
    X509Entry = 0,
    PrecertEntry = 1,
}

/// PreCert structure for precertificate entries
#[derive(PartialEq, Debug, Clone, TlsSerializeBytes, TlsSize)]
struct PreCert {
    /// SHA-256 hash of the issuer's SubjectPublicKeyInfo
    issuer_key_hash: [u8; 32],
    /// The TBSCertificate with SCT extension removed
    tbs_certificate: TlsByteVecU24,
}

/// SignedEntry enum for different log entry types
#[derive(PartialEq, Debug, Clone, TlsSerializeBytes, TlsSize)]
#[repr(u16)]
enum SignedEntry {
    #[tls_codec(discriminant = "LogEntryType::X509Entry")]
    X509Entry(TlsByteVecU24),
    #[tls_codec(discriminant = "LogEntryType::PrecertEntry")]
    PrecertEntry(PreCert),
}

/// The digitally-signed structure that is verified against the CT log's signature
#[derive(PartialEq, Debug, TlsSerializeBytes, TlsSize)]
struct SignatureInput {
    version: Version,
    signature_type: SignatureType,
    timestamp: u64,
    signed_entry: SignedEntry,
    extensions: TlsByteVecU16,
}

/// The leaf stored in the log's Merkle tree
#[derive(PartialEq, Debug, TlsSerializeBytes, TlsSize)]
struct LeafInput {
    version: Version,
    leaf_type: MerkleLeafType,
    timestamp: u64,
    signed_entry: SignedEntry,
    extensions: TlsByteVecU16,
}

/// The entry a log committed to, independent of any particular SCT
#[derive(Debug, Clone, PartialEq)]
pub struct MerkleTreeLeaf {
    entry: SignedEntry,
}

impl MerkleTreeLeaf {
    /// Entry for SCTs delivered in the TLS handshake: the whole leaf certificate
    pub fn from_x509(leaf_der: &[u8]) -> Self {
        Self {
            entry: SignedEntry::X509Entry(leaf_der.into()),
        }
    }

    /// Entry for SCTs embedded in the leaf: the precertificate it was issued from
    pub fn from_precert(leaf: &Certificate, issuer: &Certificate) -> Result<Self> {
        let issuer_spki = issuer
            .tbs_certificate
            .subject_public_key_info
            .to_der()
            .map_err(|e| Error::Certificate(format!("failed to encode issuer key: {}", e)))?;
        let issuer_key_hash = sha256(&issuer_spki);

        // Reconstruct the precertificate TBS by removing the SCT extension
        let mut tbs_precert = leaf.tbs_certificate.clone();
        tbs_precert.extensions = tbs_precert
            .extensions
            .map(|exts| {
                exts.into_iter()
                    .filter(|ext| ext.extn_id != CT_PRECERT_SCTS)
                    .collect::<Vec<_>>()
            })
            .filter(|exts| !exts.is_empty());

        let tbs_precert_der = tbs_precert
            .to_der()
            .map_err(|e| Error::Certificate(format!("failed to encode precert TBS: {}", e)))?;

        Ok(Self {
            entry: SignedEntry::PrecertEntry(PreCert {
                issuer_key_hash,
                tbs_certificate: tbs_precert_der.as_slice().into(),
            }),
        })
    }

    /// Bytes the log signed when it issued `sct`
    pub fn signed_data(&self, sct: &SignedCertificateTimestamp) -> Result<Vec<u8>> {
        let input = SignatureInput {
            version: sct_version(sct),
            signature_type: SignatureType::CertificateTimestamp,
            timestamp: sct.timestamp,
            signed_entry: self.entry.clone(),
            extensions: sct.extensions.clone(),
        };
        input
            .tls_serialize()
            .map_err(|e| Error::MalformedSct(format!("failed to serialize SCT data: {:?}", e)))
    }

    /// The `MerkleTreeLeaf` the log appends for `sct`
    pub fn leaf_input(&self, sct: &SignedCertificateTimestamp) -> Result<Vec<u8>> {
        let input = LeafInput {
            version: sct_version(sct),
            leaf_type: MerkleLeafType::TimestampedEntry,
            timestamp: sct.timestamp,
            signed_entry: self.entry.clone(),
            extensions: sct.extensions.clone(),
        };
        input
            .tls_serialize()
            .map_err(|e| Error::MalformedSct(format!("failed to serialize leaf: {:?}", e)))
    }

    /// Leaf hash used to look the entry up in the log
    pub fn leaf_hash(&self, sct: &SignedCertificateTimestamp) -> Result<Sha256Hash> {
        Ok(hash_leaf(&self.leaf_input(sct)?))
    }
}

fn sct_version(sct: &SignedCertificateTimestamp) -> Version {
    match sct.version {
        Version::V1 => Version::V1,
    }
}

/// Map a TLS signature algorithm to the matching scheme
pub(crate) fn signing_scheme(algorithm: &SignatureAndHashAlgorithm) -> Result<SigningScheme> {
    let bytes = algorithm
        .tls_serialize()
        .map_err(|e| Error::MalformedSct(format!("failed to serialize signature algorithm: {:?}", e)))?;
    let sig_alg = match bytes.as_slice() {
        [hash, sig] => u16::from_be_bytes([*hash, *sig]),
        _ => {
            return Err(Error::MalformedSct(
                "signature algorithm is not two bytes".to_string(),
            ))
        }
    };

    match sig_alg {
        ECDSA_SHA256 => Ok(SigningScheme::EcdsaP256Sha256),
        ECDSA_SHA384 => Ok(SigningScheme::EcdsaP384Sha384),
        RSA_PKCS1_SHA256 => Ok(SigningScheme::RsaPkcs1Sha256),
        RSA_PKCS1_SHA384 => Ok(SigningScheme::RsaPkcs1Sha384),
        RSA_PKCS1_SHA512 => Ok(SigningScheme::RsaPkcs1Sha512),
        _ => Err(Error::MalformedSct(format!(
            "unsupported signature algorithm: 0x{:04x}",
            sig_alg
        ))),
    }
}
