//! Peer certificate chains

use crate::error::{Error, Result};
use rustls_pki_types::CertificateDer;
use x509_cert::{der::Decode, Certificate};

/// One certificate as presented, together with its parsed form
#[derive(Debug, Clone)]
pub struct ChainCertificate {
    der: CertificateDer<'static>,
    certificate: Certificate,
}

impl ChainCertificate {
    /// The DER bytes exactly as the peer sent them
    pub fn der(&self) -> &CertificateDer<'static> {
        &self.der
    }

    pub fn certificate(&self) -> &Certificate {
        &self.certificate
    }
}

/// Peer certificates, leaf first
///
/// Order is the order of presentation; no path building or validation
/// happens here.
#[derive(Debug, Clone, Default)]
pub struct CertificateChain {
    certs: Vec<ChainCertificate>,
}

impl CertificateChain {
    /// The end-entity certificate
    pub fn leaf(&self) -> Option<&ChainCertificate> {
        self.certs.first()
    }

    /// The certificate presented right after the leaf
    pub fn issuer(&self) -> Option<&ChainCertificate> {
        self.certs.get(1)
    }

    pub fn len(&self) -> usize {
        self.certs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChainCertificate> {
        self.certs.iter()
    }
}

/// Parse every peer certificate, keeping order
pub fn build_certificate_chain(certs: &[CertificateDer<'_>]) -> Result<CertificateChain> {
    let certs = certs
        .iter()
        .enumerate()
        .map(|(i, der)| {
            let certificate = Certificate::from_der(der.as_ref())
                .map_err(|e| Error::Certificate(format!("certificate {}: {}", i, e)))?;
            Ok(ChainCertificate {
                der: der.clone().into_owned(),
                certificate,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(CertificateChain { certs })
}
