//! Signature verification using aws-lc-rs

use crate::error::{Error, Result};
use crate::signing::SigningScheme;
use aws_lc_rs::signature::{
    UnparsedPublicKey, ECDSA_P256_SHA256_ASN1, ECDSA_P384_SHA384_ASN1, RSA_PKCS1_2048_8192_SHA256,
    RSA_PKCS1_2048_8192_SHA384, RSA_PKCS1_2048_8192_SHA512,
};

/// A public key for verification
pub struct VerificationKey<'a> {
    /// Raw subject public key (EC point or PKCS#1 RSAPublicKey)
    pub bytes: &'a [u8],
    /// The scheme to use for verification
    pub scheme: SigningScheme,
}

impl<'a> VerificationKey<'a> {
    /// Create a new verification key
    pub fn new(bytes: &'a [u8], scheme: SigningScheme) -> Self {
        Self { bytes, scheme }
    }

    /// Verify a signature over data
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> Result<()> {
        match self.scheme {
            SigningScheme::EcdsaP256Sha256 => {
                let key = UnparsedPublicKey::new(&ECDSA_P256_SHA256_ASN1, self.bytes);
                key.verify(data, signature)
                    .map_err(|_| Error::Verification("ECDSA P-256 signature invalid".to_string()))
            }
            SigningScheme::EcdsaP384Sha384 => {
                let key = UnparsedPublicKey::new(&ECDSA_P384_SHA384_ASN1, self.bytes);
                key.verify(data, signature)
                    .map_err(|_| Error::Verification("ECDSA P-384 signature invalid".to_string()))
            }
            SigningScheme::RsaPkcs1Sha256 => {
                let key = UnparsedPublicKey::new(&RSA_PKCS1_2048_8192_SHA256, self.bytes);
                key.verify(data, signature).map_err(|_| {
                    Error::Verification("RSA PKCS#1 SHA-256 signature invalid".to_string())
                })
            }
            SigningScheme::RsaPkcs1Sha384 => {
                let key = UnparsedPublicKey::new(&RSA_PKCS1_2048_8192_SHA384, self.bytes);
                key.verify(data, signature).map_err(|_| {
                    Error::Verification("RSA PKCS#1 SHA-384 signature invalid".to_string())
                })
            }
            SigningScheme::RsaPkcs1Sha512 => {
                let key = UnparsedPublicKey::new(&RSA_PKCS1_2048_8192_SHA512, self.bytes);
                key.verify(data, signature).map_err(|_| {
                    Error::Verification("RSA PKCS#1 SHA-512 signature invalid".to_string())
                })
            }
        }
    }
}

/// Verify a signature using the specified scheme
///
/// `public_key` is the contents of the signer's SubjectPublicKeyInfo bit
/// string, not the SPKI itself. [`crate::PublicKey`] takes care of that split.
pub fn verify_signature(
    public_key: &[u8],
    data: &[u8],
    signature: &[u8],
    scheme: SigningScheme,
) -> Result<()> {
    VerificationKey::new(public_key, scheme).verify(data, signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::KeyPair;

    #[test]
    fn test_verify_ecdsa_p256() {
        let kp = KeyPair::generate_ecdsa_p256().unwrap();
        let raw = kp.public_key_bytes().to_vec();
        let data = b"test data";
        let sig = kp.sign(data).unwrap();

        let vk = VerificationKey::new(&raw, SigningScheme::EcdsaP256Sha256);
        assert!(vk.verify(data, sig.as_bytes()).is_ok());
    }

    #[test]
    fn test_verify_wrong_data() {
        let kp = KeyPair::generate_ecdsa_p256().unwrap();
        let raw = kp.public_key_bytes().to_vec();
        let sig = kp.sign(b"test data").unwrap();

        let result = verify_signature(
            &raw,
            b"wrong data",
            sig.as_bytes(),
            SigningScheme::EcdsaP256Sha256,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_verify_scheme_mismatch() {
        let kp = KeyPair::generate_ecdsa_p384().unwrap();
        let raw = kp.public_key_bytes().to_vec();
        let data = b"test data";
        let sig = kp.sign(data).unwrap();

        let vk = VerificationKey::new(&raw, SigningScheme::EcdsaP256Sha256);
        assert!(vk.verify(data, sig.as_bytes()).is_err());
    }
}
