//! Log list types and parsing
//!
//! The JSON accepted here is the v3 log list schema published at
//! <https://www.gstatic.com/ct/log_list/v3/>. Only the fields needed to verify
//! SCTs are kept.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use ct_crypto::{parse_public_key_pem, sha256};
use ct_types::LogKeyId;
use serde::Deserialize;
use std::time::Duration;

/// Standing of a log in the list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogStatus {
    Pending,
    Qualified,
    Usable,
    ReadOnly,
    Retired,
    Rejected,
    /// No state, or a state this crate does not know
    Other,
}

impl LogStatus {
    /// Whether SCTs from a log in this state are acceptable
    pub fn is_trusted(&self) -> bool {
        matches!(
            self,
            LogStatus::Qualified | LogStatus::Usable | LogStatus::ReadOnly
        )
    }
}

/// A CT log as described by the log list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogDescriptor {
    description: String,
    url: String,
    operator: String,
    key: Vec<u8>,
    key_id: LogKeyId,
    status: LogStatus,
    max_merge_delay: Duration,
}

impl LogDescriptor {
    /// Describe a log directly
    ///
    /// The key ID is always derived from `key`, never taken on trust.
    pub fn new(
        description: impl Into<String>,
        url: impl Into<String>,
        key: Vec<u8>,
        status: LogStatus,
        max_merge_delay: Duration,
    ) -> Self {
        let key_id = LogKeyId::new(sha256(&key));
        Self {
            description: description.into(),
            url: url.into(),
            operator: String::new(),
            key,
            key_id,
            status,
            max_merge_delay,
        }
    }

    /// Set the operator name
    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = operator.into();
        self
    }

    /// Human-readable log name
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Base URL of the log's RFC 6962 API
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Name of the organization running the log
    pub fn operator(&self) -> &str {
        &self.operator
    }

    /// DER-encoded SubjectPublicKeyInfo of the log
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// SHA-256 of [`LogDescriptor::key`]
    pub fn key_id(&self) -> &LogKeyId {
        &self.key_id
    }

    pub fn status(&self) -> LogStatus {
        self.status
    }

    /// Longest time the log may take to incorporate an entry it has promised
    pub fn max_merge_delay(&self) -> Duration {
        self.max_merge_delay
    }
}

/// A verified, filtered list of CT logs
#[derive(Debug, Clone)]
pub struct LogList {
    version: Option<String>,
    log_list_timestamp: Option<DateTime<Utc>>,
    logs: Vec<LogDescriptor>,
}

impl LogList {
    /// Verify `signature` over `json` with the PEM public key, then parse
    ///
    /// Only qualified, usable and read-only logs are retained.
    pub fn from_signed_json(json: &[u8], signature: &[u8], public_key_pem: &[u8]) -> Result<Self> {
        let key =
            parse_public_key_pem(public_key_pem).map_err(|e| Error::KeyParse(e.to_string()))?;
        key.verify(json, signature)
            .map_err(|e| Error::Signature(e.to_string()))?;

        let mut list = parse_unverified(json)?;
        let total = list.logs.len();
        list.logs.retain(|log| log.status.is_trusted());
        tracing::debug!("Kept {} of {} logs in trusted states", list.logs.len(), total);
        Ok(list)
    }

    /// Version string of the list, if present
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// When the publisher produced the list
    pub fn log_list_timestamp(&self) -> Option<DateTime<Utc>> {
        self.log_list_timestamp
    }

    pub fn logs(&self) -> &[LogDescriptor] {
        &self.logs
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogDescriptor> {
        self.logs.iter()
    }
}

#[derive(Debug, Deserialize)]
struct RawLogList {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    log_list_timestamp: Option<DateTime<Utc>>,
    operators: Vec<RawOperator>,
}

#[derive(Debug, Deserialize)]
struct RawOperator {
    name: String,
    #[serde(default)]
    logs: Vec<RawLog>,
}

#[derive(Debug, Deserialize)]
struct RawLog {
    #[serde(default)]
    description: String,
    #[serde(with = "ct_types::encoding::base64_bytes")]
    key: Vec<u8>,
    url: String,
    /// Seconds
    mmd: u64,
    #[serde(default)]
    state: Option<RawState>,
}

/// The `state` object carries exactly one key naming the state
#[derive(Debug, Deserialize)]
struct RawState {
    pending: Option<serde::de::IgnoredAny>,
    qualified: Option<serde::de::IgnoredAny>,
    usable: Option<serde::de::IgnoredAny>,
    readonly: Option<serde::de::IgnoredAny>,
    retired: Option<serde::de::IgnoredAny>,
    rejected: Option<serde::de::IgnoredAny>,
}

impl RawState {
    fn status(&self) -> LogStatus {
        let states = [
            (self.pending.is_some(), LogStatus::Pending),
            (self.qualified.is_some(), LogStatus::Qualified),
            (self.usable.is_some(), LogStatus::Usable),
            (self.readonly.is_some(), LogStatus::ReadOnly),
            (self.retired.is_some(), LogStatus::Retired),
            (self.rejected.is_some(), LogStatus::Rejected),
        ];
        let mut present = states.iter().filter(|(set, _)| *set);
        match (present.next(), present.next()) {
            (Some((_, status)), None) => *status,
            _ => LogStatus::Other,
        }
    }
}

/// Parse log list JSON without checking any signature
pub(crate) fn parse_unverified(json: &[u8]) -> Result<LogList> {
    let raw: RawLogList = serde_json::from_slice(json)?;

    let logs = raw
        .operators
        .into_iter()
        .flat_map(|op| {
            let operator = op.name;
            op.logs.into_iter().map(move |log| {
                let status = log
                    .state
                    .as_ref()
                    .map(RawState::status)
                    .unwrap_or(LogStatus::Other);
                LogDescriptor::new(
                    log.description,
                    log.url,
                    log.key,
                    status,
                    Duration::from_secs(log.mmd),
                )
                .with_operator(operator.clone())
            })
        })
        .collect();

    Ok(LogList {
        version: raw.version,
        log_list_timestamp: raw.log_list_timestamp,
        logs,
    })
}
