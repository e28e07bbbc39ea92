//! Public key parsing
//!
//! Log-list publishers ship their key as a PEM `PUBLIC KEY` block; CT logs
//! publish theirs as base64 DER. Both are SubjectPublicKeyInfo structures.

use crate::error::{Error, Result};
use crate::hash::sha256;
use crate::signing::SigningScheme;
use crate::verification::verify_signature;
use const_oid::db::rfc5912::{ID_EC_PUBLIC_KEY, RSA_ENCRYPTION, SECP_256_R_1, SECP_384_R_1};
use const_oid::ObjectIdentifier;
use ct_types::LogKeyId;
use der::Decode;
use spki::SubjectPublicKeyInfoRef;

/// A parsed public key together with its natural signing scheme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    der: Vec<u8>,
    raw: Vec<u8>,
    scheme: SigningScheme,
}

impl PublicKey {
    /// Parse a DER-encoded SubjectPublicKeyInfo
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let spki = SubjectPublicKeyInfoRef::from_der(der)
            .map_err(|e| Error::InvalidKeyFormat(format!("failed to parse SPKI: {}", e)))?;
        let scheme = determine_signing_scheme(&spki)?;
        let raw = spki
            .subject_public_key
            .as_bytes()
            .ok_or_else(|| Error::InvalidKeyFormat("subject public key has unused bits".into()))?
            .to_vec();
        Ok(Self {
            der: der.to_vec(),
            raw,
            scheme,
        })
    }

    /// The DER-encoded SubjectPublicKeyInfo
    pub fn as_der(&self) -> &[u8] {
        &self.der
    }

    /// The scheme used when the signer does not name one
    pub fn scheme(&self) -> SigningScheme {
        self.scheme
    }

    /// SHA-256 over the DER encoding, i.e. the RFC 6962 log ID for a log key
    pub fn key_id(&self) -> LogKeyId {
        LogKeyId::new(sha256(&self.der))
    }

    /// Verify a signature over `data` with this key's natural scheme
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> Result<()> {
        self.verify_with(data, signature, self.scheme)
    }

    /// Verify a signature over `data` with an explicitly chosen scheme
    ///
    /// SCTs and tree heads name their own hash and signature algorithm, which
    /// need not be the key's natural one.
    pub fn verify_with(&self, data: &[u8], signature: &[u8], scheme: SigningScheme) -> Result<()> {
        verify_signature(&self.raw, data, signature, scheme)
    }
}

/// Parse a PEM-encoded `PUBLIC KEY` block
pub fn parse_public_key_pem(pem_data: &[u8]) -> Result<PublicKey> {
    let parsed = pem::parse(pem_data).map_err(|e| Error::Pem(e.to_string()))?;
    if parsed.tag() != "PUBLIC KEY" {
        return Err(Error::Pem(format!(
            "expected PUBLIC KEY block, found {}",
            parsed.tag()
        )));
    }
    PublicKey::from_der(parsed.contents())
}

/// Determine the signing scheme from SubjectPublicKeyInfo
///
/// Unlike certificate keys, a trust anchor with an unknown algorithm is an
/// error rather than something to guess at.
fn determine_signing_scheme(spki: &SubjectPublicKeyInfoRef<'_>) -> Result<SigningScheme> {
    let alg_oid = spki.algorithm.oid;

    if alg_oid == ID_EC_PUBLIC_KEY {
        let params = spki.algorithm.parameters.as_ref().ok_or_else(|| {
            Error::InvalidKeyFormat("EC key missing curve parameters".to_string())
        })?;
        // params.value() returns the raw OID content bytes (without tag/length)
        let curve_oid = ObjectIdentifier::from_bytes(params.value())
            .map_err(|e| Error::InvalidKeyFormat(format!("failed to parse EC curve OID: {}", e)))?;

        if curve_oid == SECP_256_R_1 {
            Ok(SigningScheme::EcdsaP256Sha256)
        } else if curve_oid == SECP_384_R_1 {
            Ok(SigningScheme::EcdsaP384Sha384)
        } else {
            Err(Error::UnsupportedAlgorithm(format!(
                "EC curve {}",
                curve_oid
            )))
        }
    } else if alg_oid == RSA_ENCRYPTION {
        Ok(SigningScheme::RsaPkcs1Sha256)
    } else {
        tracing::debug!("Unsupported public key algorithm OID: {}", alg_oid);
        Err(Error::UnsupportedAlgorithm(format!(
            "public key algorithm {}",
            alg_oid
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::KeyPair;

    #[test]
    fn test_parse_pem_roundtrip() {
        let kp = KeyPair::generate_ecdsa_p256().unwrap();
        let pem = kp.public_key_to_pem().unwrap();

        let key = parse_public_key_pem(pem.as_bytes()).unwrap();
        assert_eq!(key.scheme(), SigningScheme::EcdsaP256Sha256);
        assert_eq!(key.as_der(), kp.public_key_to_der().unwrap().as_slice());
    }

    #[test]
    fn test_p384_scheme() {
        let kp = KeyPair::generate_ecdsa_p384().unwrap();
        let key = PublicKey::from_der(&kp.public_key_to_der().unwrap()).unwrap();
        assert_eq!(key.scheme(), SigningScheme::EcdsaP384Sha384);
    }

    #[test]
    fn test_key_id_is_sha256_of_der() {
        let kp = KeyPair::generate_ecdsa_p256().unwrap();
        let der = kp.public_key_to_der().unwrap();
        let key = PublicKey::from_der(&der).unwrap();
        assert_eq!(key.key_id().as_bytes(), &sha256(&der));
    }

    #[test]
    fn test_verify_with_natural_scheme() {
        let kp = KeyPair::generate_ecdsa_p256().unwrap();
        let key = PublicKey::from_der(&kp.public_key_to_der().unwrap()).unwrap();
        let sig = kp.sign(b"log list").unwrap();
        assert!(key.verify(b"log list", sig.as_bytes()).is_ok());
        assert!(key.verify(b"log lisT", sig.as_bytes()).is_err());
    }

    #[test]
    fn test_rejects_wrong_pem_tag() {
        let pem = pem::encode(&pem::Pem::new("CERTIFICATE", vec![0u8; 8]));
        assert!(matches!(
            parse_public_key_pem(pem.as_bytes()),
            Err(Error::Pem(_))
        ));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_public_key_pem(b"not a pem").is_err());
        assert!(PublicKey::from_der(&[0x30, 0x03, 0x01, 0x01, 0x00]).is_err());
    }
}
