//! High-level SCT checking API
//!
//! A connection passes when at least one SCT, from any source, is valid.

use crate::chain::{build_certificate_chain, CertificateChain};
use crate::client::{HttpLogClientFactory, LogClientFactory, DEFAULT_USER_AGENT};
use crate::error::{Error, Result};
use crate::evidence::{extract_embedded_scts, extract_handshake_scts, EvidenceSource, SctBytes};
use crate::leaf::MerkleTreeLeaf;
use crate::validator::{InclusionStatus, SctValidator};
use ct_loglist::{LoaderConfig, LogList, LogRegistry};
use ct_types::LogKeyId;
use rustls_pki_types::CertificateDer;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

/// What the TLS layer knows about an established connection
#[derive(Debug, Clone, Default)]
pub struct ConnectionState {
    /// Certificates presented by the peer, leaf first
    pub peer_certificates: Vec<CertificateDer<'static>>,
    /// SCTs from the `signed_certificate_timestamp` extension
    pub signed_certificate_timestamps: Vec<Vec<u8>>,
}

/// Order in which SCT sources are tried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvidenceOrder {
    #[default]
    HandshakeFirst,
    EmbeddedFirst,
}

impl EvidenceOrder {
    fn sources(self) -> [EvidenceSource; 2] {
        match self {
            EvidenceOrder::HandshakeFirst => [EvidenceSource::Handshake, EvidenceSource::Embedded],
            EvidenceOrder::EmbeddedFirst => [EvidenceSource::Embedded, EvidenceSource::Handshake],
        }
    }
}

/// Policy for one check
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Fail early when the peer presented no certificates
    pub require_peer_certificates: bool,
    /// Also consider SCTs embedded in the leaf certificate
    pub check_embedded_scts: bool,
    /// Which source goes first
    pub order: EvidenceOrder,
    /// Accept SCTs whose inclusion cannot be proven yet, as long as they are
    /// younger than the log's maximum merge delay
    pub accept_unmerged: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self::strict()
    }
}

impl CheckOptions {
    /// Handshake SCTs only; tolerates a peer without certificates
    pub fn lenient() -> Self {
        Self {
            require_peer_certificates: false,
            check_embedded_scts: false,
            order: EvidenceOrder::HandshakeFirst,
            accept_unmerged: true,
        }
    }

    /// Handshake then embedded SCTs; requires peer certificates
    pub fn strict() -> Self {
        Self {
            require_peer_certificates: true,
            check_embedded_scts: true,
            order: EvidenceOrder::HandshakeFirst,
            accept_unmerged: true,
        }
    }

    /// Try embedded SCTs before handshake SCTs
    pub fn embedded_first(mut self) -> Self {
        self.order = EvidenceOrder::EmbeddedFirst;
        self
    }

    /// Ignore SCTs embedded in the certificate
    pub fn skip_embedded(mut self) -> Self {
        self.check_embedded_scts = false;
        self
    }

    /// Require proven inclusion for every accepted SCT
    pub fn require_inclusion(mut self) -> Self {
        self.accept_unmerged = false;
        self
    }
}

/// Settings that apply to every check of a [`Checker`]
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Bound on the inclusion round trip for a single SCT
    pub inclusion_timeout: Option<Duration>,
    /// User-Agent for CT log requests when the checker builds its own clients
    pub user_agent: String,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            inclusion_timeout: Some(Duration::from_secs(30)),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl CheckerConfig {
    /// Set the inclusion timeout
    pub fn with_inclusion_timeout(mut self, timeout: Duration) -> Self {
        self.inclusion_timeout = Some(timeout);
        self
    }

    /// Wait for CT logs as long as the HTTP layer does
    pub fn without_inclusion_timeout(mut self) -> Self {
        self.inclusion_timeout = None;
        self
    }

    /// Set the User-Agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// The SCT that made a check pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub source: EvidenceSource,
    /// Description of the log that issued the SCT
    pub log_description: String,
    pub status: InclusionStatus,
}

static DEFAULT_CHECKER: OnceCell<std::result::Result<Arc<Checker>, Arc<Error>>> =
    OnceCell::const_new();

/// Checks TLS connections for valid SCTs
pub struct Checker {
    registry: Arc<LogRegistry>,
    clients: Arc<dyn LogClientFactory>,
    config: CheckerConfig,
}

impl Checker {
    /// Create a checker over an explicit trust store and client factory
    pub fn new(
        registry: Arc<LogRegistry>,
        clients: Arc<dyn LogClientFactory>,
        config: CheckerConfig,
    ) -> Self {
        Self {
            registry,
            clients,
            config,
        }
    }

    /// Load a log list and talk to logs over HTTP
    pub async fn from_loader(loader: &LoaderConfig, config: CheckerConfig) -> Result<Self> {
        let list = LogList::load(loader).await?;
        let registry = Arc::new(LogRegistry::new(&list));
        let clients = Arc::new(HttpLogClientFactory::with_options(&config.user_agent, None)?);
        Ok(Self::new(registry, clients, config))
    }

    /// The process-wide checker over the published log list
    ///
    /// The first caller loads the list; concurrent callers wait for it. A
    /// failed load is remembered and reported to every later caller.
    pub async fn shared_default() -> Result<Arc<Checker>> {
        let cell = DEFAULT_CHECKER
            .get_or_init(|| async {
                Checker::from_loader(&LoaderConfig::default(), CheckerConfig::default())
                    .await
                    .map(Arc::new)
                    .map_err(Arc::new)
            })
            .await;
        match cell {
            Ok(checker) => Ok(Arc::clone(checker)),
            Err(e) => Err(Error::DefaultUnavailable(Arc::clone(e))),
        }
    }

    pub fn registry(&self) -> &LogRegistry {
        &self.registry
    }

    /// Check handshake SCTs, tolerating a peer without certificates
    pub async fn check_scts(&self, state: Option<&ConnectionState>) -> Result<CheckOutcome> {
        self.check(state, &CheckOptions::lenient()).await
    }

    /// Check handshake SCTs, then embedded SCTs
    pub async fn check_connection_state(
        &self,
        state: Option<&ConnectionState>,
    ) -> Result<CheckOutcome> {
        self.check(state, &CheckOptions::strict()).await
    }

    /// Check a connection under the given policy
    pub async fn check(
        &self,
        state: Option<&ConnectionState>,
        options: &CheckOptions,
    ) -> Result<CheckOutcome> {
        let state = state.ok_or(Error::NoConnectionState)?;

        tracing::debug!("Certificates: {}", state.peer_certificates.len());
        tracing::debug!("TLS SCTs: {}", state.signed_certificate_timestamps.len());

        if options.require_peer_certificates && state.peer_certificates.is_empty() {
            return Err(Error::NoPeerCertificates);
        }

        let chain = build_certificate_chain(&state.peer_certificates)?;
        let validator = SctValidator::new(Arc::clone(&self.registry), Arc::clone(&self.clients))
            .with_inclusion_timeout(self.config.inclusion_timeout)
            .with_accept_unmerged(options.accept_unmerged);

        let mut failures = Failures::default();
        for source in options.order.sources() {
            if source == EvidenceSource::Embedded && !options.check_embedded_scts {
                continue;
            }
            let outcome = match source {
                EvidenceSource::Handshake => {
                    self.check_handshake(state, &chain, &validator, &mut failures)
                        .await
                }
                EvidenceSource::Embedded => {
                    self.check_embedded(&chain, &validator, &mut failures)
                        .await
                }
            };
            if let Some(outcome) = outcome {
                return Ok(outcome);
            }
        }

        Err(failures.into_error())
    }

    async fn check_handshake(
        &self,
        state: &ConnectionState,
        chain: &CertificateChain,
        validator: &SctValidator,
        failures: &mut Failures,
    ) -> Option<CheckOutcome> {
        let scts = match extract_handshake_scts(&state.signed_certificate_timestamps) {
            Ok(scts) => scts,
            Err(e) => {
                failures.record(e);
                return None;
            }
        };
        failures.found_evidence = true;

        let Some(leaf) = chain.leaf() else {
            failures.record(Error::NoPeerCertificates);
            return None;
        };
        let entry = MerkleTreeLeaf::from_x509(leaf.der().as_ref());

        self.first_valid(EvidenceSource::Handshake, &scts, &entry, validator, failures)
            .await
    }

    async fn check_embedded(
        &self,
        chain: &CertificateChain,
        validator: &SctValidator,
        failures: &mut Failures,
    ) -> Option<CheckOutcome> {
        let scts = match extract_embedded_scts(chain) {
            Ok(scts) => scts,
            Err(e) => {
                // Anything but an empty source means SCTs were there
                if !matches!(e, Error::EmptyEvidence(_)) {
                    failures.found_evidence = true;
                }
                failures.record(e);
                return None;
            }
        };
        failures.found_evidence = true;

        let (Some(leaf), Some(issuer)) = (chain.leaf(), chain.issuer()) else {
            failures.record(Error::MissingIssuer);
            return None;
        };
        let entry = match MerkleTreeLeaf::from_precert(leaf.certificate(), issuer.certificate()) {
            Ok(entry) => entry,
            Err(e) => {
                failures.record(e);
                return None;
            }
        };

        self.first_valid(EvidenceSource::Embedded, &scts, &entry, validator, failures)
            .await
    }

    async fn first_valid(
        &self,
        source: EvidenceSource,
        scts: &[SctBytes],
        entry: &MerkleTreeLeaf,
        validator: &SctValidator,
        failures: &mut Failures,
    ) -> Option<CheckOutcome> {
        for sct in scts {
            match validator.validate_one(sct, entry).await {
                Ok(status) => {
                    let log_description = self.log_description(sct);
                    tracing::debug!(
                        "Accepted SCT from {} via log {:?}",
                        source,
                        log_description
                    );
                    return Some(CheckOutcome {
                        source,
                        log_description,
                        status,
                    });
                }
                Err(e) => {
                    tracing::debug!("Rejected SCT from {}: {}", source, e);
                    failures.record(e);
                }
            }
        }
        None
    }

    fn log_description(&self, sct: &SctBytes) -> String {
        sct.parse()
            .ok()
            .and_then(|sct| self.registry.find_by_key_id(&LogKeyId::new(sct.log_id.key_id)))
            .map(|log| log.description().to_string())
            .unwrap_or_default()
    }
}

/// Per-check bookkeeping of why candidates were rejected
#[derive(Default)]
struct Failures {
    found_evidence: bool,
    most_specific: Option<Error>,
}

impl Failures {
    /// Keep the most specific error; later errors win ties
    fn record(&mut self, error: Error) {
        let replace = match &self.most_specific {
            Some(current) => specificity(&error) >= specificity(current),
            None => true,
        };
        if replace {
            self.most_specific = Some(error);
        }
    }

    fn into_error(self) -> Error {
        match (self.found_evidence, self.most_specific) {
            (true, Some(cause)) => Error::NoValidSct(Box::new(cause)),
            _ => Error::NoEvidence,
        }
    }
}

fn specificity(error: &Error) -> u8 {
    match error {
        Error::InclusionFailed { .. } => 6,
        Error::SignatureInvalid { .. } => 5,
        Error::UnknownLog(_) => 4,
        Error::MalformedSct(_) => 3,
        Error::MissingIssuer => 2,
        Error::EmptyEvidence(_) => 1,
        _ => 0,
    }
}

/// Check handshake SCTs with the process-wide default checker
pub async fn check_scts(state: Option<&ConnectionState>) -> Result<CheckOutcome> {
    let state = state.ok_or(Error::NoConnectionState)?;
    Checker::shared_default()
        .await?
        .check_scts(Some(state))
        .await
}

/// Check handshake and embedded SCTs with the process-wide default checker
pub async fn check_connection_state(state: Option<&ConnectionState>) -> Result<CheckOutcome> {
    let state = state.ok_or(Error::NoConnectionState)?;
    Checker::shared_default()
        .await?
        .check_connection_state(Some(state))
        .await
}
