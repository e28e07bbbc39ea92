//! Signing schemes, and key generation/signing using aws-lc-rs
//!
//! Verifiers only need [`SigningScheme`]. [`KeyPair`] exists so a test harness
//! can play the role of a CT log or of the log-list publisher.

use crate::error::{Error, Result};
use aws_lc_rs::{
    rand::SystemRandom,
    signature::{
        EcdsaKeyPair, KeyPair as AwsKeyPair, ECDSA_P256_SHA256_ASN1_SIGNING,
        ECDSA_P384_SHA384_ASN1_SIGNING,
    },
};
use const_oid::db::rfc5912::{ID_EC_PUBLIC_KEY, SECP_256_R_1, SECP_384_R_1};

/// A cryptographic signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(Vec<u8>);

impl Signature {
    /// Create a new Signature from raw bytes
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Get the raw signature bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Signature schemes used by CT logs and log-list publishers
///
/// RFC 6962 only allows ECDSA (NIST P-256) and RSA PKCS#1 v1.5 with SHA-256;
/// the other hashes appear in the TLS `SignatureAndHashAlgorithm` registry and
/// are accepted when a log advertises them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningScheme {
    /// ECDSA P-256 with SHA-256
    EcdsaP256Sha256,
    /// ECDSA P-384 with SHA-384
    EcdsaP384Sha384,
    /// RSA PKCS#1 v1.5 with SHA-256
    RsaPkcs1Sha256,
    /// RSA PKCS#1 v1.5 with SHA-384
    RsaPkcs1Sha384,
    /// RSA PKCS#1 v1.5 with SHA-512
    RsaPkcs1Sha512,
}

impl SigningScheme {
    /// Get the name of this scheme
    pub fn name(&self) -> &'static str {
        match self {
            SigningScheme::EcdsaP256Sha256 => "ECDSA_P256_SHA256",
            SigningScheme::EcdsaP384Sha384 => "ECDSA_P384_SHA384",
            SigningScheme::RsaPkcs1Sha256 => "RSA_PKCS1_SHA256",
            SigningScheme::RsaPkcs1Sha384 => "RSA_PKCS1_SHA384",
            SigningScheme::RsaPkcs1Sha512 => "RSA_PKCS1_SHA512",
        }
    }
}

/// An ECDSA key pair that signs like a CT log
pub struct KeyPair {
    inner: EcdsaKeyPair,
    scheme: SigningScheme,
}

impl KeyPair {
    /// Generate a key pair for an ECDSA scheme
    pub fn generate(scheme: SigningScheme) -> Result<Self> {
        let alg = match scheme {
            SigningScheme::EcdsaP256Sha256 => &ECDSA_P256_SHA256_ASN1_SIGNING,
            SigningScheme::EcdsaP384Sha384 => &ECDSA_P384_SHA384_ASN1_SIGNING,
            other => {
                return Err(Error::KeyGeneration(format!(
                    "cannot generate {} keys",
                    other.name()
                )))
            }
        };
        let pkcs8 = EcdsaKeyPair::generate_pkcs8(alg, &SystemRandom::new())
            .map_err(|_| Error::KeyGeneration(format!("{} key generation failed", scheme.name())))?;
        let inner = EcdsaKeyPair::from_pkcs8(alg, pkcs8.as_ref())?;
        Ok(Self { inner, scheme })
    }

    pub fn generate_ecdsa_p256() -> Result<Self> {
        Self::generate(SigningScheme::EcdsaP256Sha256)
    }

    pub fn generate_ecdsa_p384() -> Result<Self> {
        Self::generate(SigningScheme::EcdsaP384Sha384)
    }

    /// Uncompressed EC point
    pub fn public_key_bytes(&self) -> &[u8] {
        self.inner.public_key().as_ref()
    }

    /// ASN.1 DER ECDSA signature over `data`
    pub fn sign(&self, data: &[u8]) -> Result<Signature> {
        let sig = self.inner.sign(&SystemRandom::new(), data)?;
        Ok(Signature::new(sig.as_ref().to_vec()))
    }

    pub fn default_scheme(&self) -> SigningScheme {
        self.scheme
    }

    /// SubjectPublicKeyInfo, DER encoded
    pub fn public_key_to_der(&self) -> Result<Vec<u8>> {
        use der::asn1::BitString;
        use der::Encode;
        use spki::{AlgorithmIdentifier, SubjectPublicKeyInfo};

        let curve = match self.scheme {
            SigningScheme::EcdsaP384Sha384 => SECP_384_R_1,
            _ => SECP_256_R_1,
        };
        let spki = SubjectPublicKeyInfo {
            algorithm: AlgorithmIdentifier {
                oid: ID_EC_PUBLIC_KEY,
                parameters: Some(
                    der::Any::encode_from(&curve).map_err(|e| Error::Der(e.to_string()))?,
                ),
            },
            subject_public_key: BitString::from_bytes(self.public_key_bytes())
                .map_err(|e| Error::Der(e.to_string()))?,
        };
        spki.to_der().map_err(|e| Error::Der(e.to_string()))
    }

    /// SubjectPublicKeyInfo with `PUBLIC KEY` armor, as log lists publish keys
    pub fn public_key_to_pem(&self) -> Result<String> {
        let der = self.public_key_to_der()?;
        Ok(pem::encode(&pem::Pem::new("PUBLIC KEY", der)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ecdsa_p256_public_key_len() {
        let kp = KeyPair::generate_ecdsa_p256().unwrap();
        let bytes = kp.public_key_bytes();
        // Uncompressed P-256 key should be 65 bytes (0x04 + 32 bytes X + 32 bytes Y)
        assert_eq!(bytes.len(), 65);
        assert_eq!(bytes[0], 0x04);
    }

    #[test]
    fn test_sign_ecdsa_p384() {
        let kp = KeyPair::generate_ecdsa_p384().unwrap();
        let sig = kp.sign(b"test data to sign").unwrap();
        assert!(!sig.as_bytes().is_empty());
        assert_eq!(kp.default_scheme(), SigningScheme::EcdsaP384Sha384);
    }

    #[test]
    fn test_rsa_generation_unsupported() {
        assert!(KeyPair::generate(SigningScheme::RsaPkcs1Sha256).is_err());
    }

    #[test]
    fn test_public_key_pem_header() {
        let kp = KeyPair::generate_ecdsa_p256().unwrap();
        let pem = kp.public_key_to_pem().unwrap();
        assert!(pem.starts_with("-----BEGIN PUBLIC KEY-----"));
    }
}
