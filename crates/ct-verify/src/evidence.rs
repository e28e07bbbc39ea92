//! SCT evidence extraction
//!
//! SCTs reach a client in two ways: in the `signed_certificate_timestamp` TLS
//! extension, or inside the leaf certificate's SCT list extension. Both are
//! normalized to the TLS encoding of a single SCT.

use crate::chain::CertificateChain;
use crate::error::{Error, Result};
use std::fmt;
use const_oid::db::rfc6962::CT_PRECERT_SCTS;
use tls_codec::{DeserializeBytes, TlsByteVecU16};
use x509_cert::der::{asn1::OctetString, Decode};
use x509_cert::ext::pkix::SignedCertificateTimestamp;

/// Where an SCT came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvidenceSource {
    /// The TLS handshake extension
    Handshake,
    /// The leaf certificate's SCT list extension
    Embedded,
}

impl fmt::Display for EvidenceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvidenceSource::Handshake => write!(f, "TLS handshake"),
            EvidenceSource::Embedded => write!(f, "leaf certificate"),
        }
    }
}

/// TLS encoding of one SCT
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SctBytes(Vec<u8>);

impl SctBytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Decode, rejecting trailing bytes
    pub fn parse(&self) -> Result<SignedCertificateTimestamp> {
        let (sct, rest) = SignedCertificateTimestamp::tls_deserialize_bytes(&self.0)
            .map_err(|e| Error::MalformedSct(format!("{:?}", e)))?;
        if !rest.is_empty() {
            return Err(Error::MalformedSct(format!(
                "{} trailing bytes after SCT",
                rest.len()
            )));
        }
        Ok(sct)
    }
}

impl From<Vec<u8>> for SctBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for SctBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Collect the SCTs delivered in the TLS handshake
pub fn extract_handshake_scts(raw: &[Vec<u8>]) -> Result<Vec<SctBytes>> {
    if raw.is_empty() {
        return Err(Error::EmptyEvidence(EvidenceSource::Handshake));
    }
    Ok(raw.iter().cloned().map(SctBytes).collect())
}

/// Collect the SCTs embedded in the chain's leaf certificate
///
/// Entries are returned undecoded so that one malformed SCT only costs its
/// own candidate. Only a list that cannot be split into entries at all is
/// reported as [`Error::MalformedSct`]. Checking the entries later needs the
/// issuer, so a chain without one fails with [`Error::MissingIssuer`] once
/// SCTs are known to be present.
pub fn extract_embedded_scts(chain: &CertificateChain) -> Result<Vec<SctBytes>> {
    let leaf = chain
        .leaf()
        .ok_or(Error::EmptyEvidence(EvidenceSource::Embedded))?;

    let extension = leaf
        .certificate()
        .tbs_certificate
        .extensions
        .iter()
        .flatten()
        .find(|ext| ext.extn_id == CT_PRECERT_SCTS)
        .ok_or(Error::EmptyEvidence(EvidenceSource::Embedded))?;

    let scts = split_sct_list(extension.extn_value.as_bytes())?;
    if scts.is_empty() {
        return Err(Error::EmptyEvidence(EvidenceSource::Embedded));
    }

    if chain.issuer().is_none() {
        return Err(Error::MissingIssuer);
    }

    tracing::debug!("Found {} embedded SCTs", scts.len());
    Ok(scts)
}

/// Split the SCT list extension value into its serialized entries
///
/// The value is a DER OCTET STRING holding a TLS `opaque<0..2^16-1>` list
/// of `opaque<1..2^16-1>` entries.
fn split_sct_list(extn_value: &[u8]) -> Result<Vec<SctBytes>> {
    let malformed = |what: &str| Error::MalformedSct(format!("failed to decode SCT list: {}", what));

    let octets = OctetString::from_der(extn_value).map_err(|e| malformed(&e.to_string()))?;
    let (list, rest) = TlsByteVecU16::tls_deserialize_bytes(octets.as_bytes())
        .map_err(|e| malformed(&format!("{:?}", e)))?;
    if !rest.is_empty() {
        return Err(malformed("trailing bytes after list"));
    }

    let mut remaining = list.as_slice();
    let mut scts = Vec::new();
    while !remaining.is_empty() {
        let (entry, rest) = TlsByteVecU16::tls_deserialize_bytes(remaining)
            .map_err(|e| malformed(&format!("{:?}", e)))?;
        if entry.as_slice().is_empty() {
            return Err(malformed("empty entry"));
        }
        scts.push(SctBytes(entry.as_slice().to_vec()));
        remaining = rest;
    }
    Ok(scts)
}
