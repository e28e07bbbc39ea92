//! Trust store loading
//!
//! A log list is only ever built from three inputs: the JSON list, its
//! detached signature, and the publisher's PEM public key.
//!
//! # Example
//!
//! ```no_run
//! use ct_loglist::{LoaderConfig, LogList};
//!
//! # async fn example() -> Result<(), ct_loglist::Error> {
//! // The list published by Google
//! let list = LogList::load_default().await?;
//!
//! // Or a local copy
//! let local = LogList::load(&LoaderConfig::from_dir("testdata")).await?;
//! # Ok(())
//! # }
//! ```

use crate::log_list::LogList;
use crate::source::{Fetcher, Source};
use crate::Result;
use std::path::Path;
use std::time::Duration;

/// Default log list URL
pub const DEFAULT_LOG_LIST_URL: &str = "https://www.gstatic.com/ct/log_list/v3/log_list.json";

/// Default detached signature URL for [`DEFAULT_LOG_LIST_URL`]
pub const DEFAULT_LOG_LIST_SIGNATURE_URL: &str =
    "https://www.gstatic.com/ct/log_list/v3/log_list.sig";

/// Default URL of the key that signs the log list
pub const DEFAULT_LOG_LIST_PUBLIC_KEY_URL: &str =
    "https://www.gstatic.com/ct/log_list/v3/log_list_pubkey.pem";

/// File names used by [`LoaderConfig::from_dir`]
pub const LOG_LIST_FILE: &str = "log_list.json";
pub const LOG_LIST_SIGNATURE_FILE: &str = "log_list.sig";
pub const LOG_LIST_PUBLIC_KEY_FILE: &str = "log_list_pubkey.pem";

/// Where to load the log list from
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Locator of the JSON list
    pub log_list: String,
    /// Locator of the detached signature
    pub signature: String,
    /// Locator of the PEM public key
    pub public_key: String,
    /// Per-request timeout for URL locators
    pub http_timeout: Option<Duration>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            log_list: DEFAULT_LOG_LIST_URL.to_string(),
            signature: DEFAULT_LOG_LIST_SIGNATURE_URL.to_string(),
            public_key: DEFAULT_LOG_LIST_PUBLIC_KEY_URL.to_string(),
            http_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl LoaderConfig {
    /// Use explicit locators for all three inputs
    pub fn new(
        log_list: impl Into<String>,
        signature: impl Into<String>,
        public_key: impl Into<String>,
    ) -> Self {
        Self {
            log_list: log_list.into(),
            signature: signature.into(),
            public_key: public_key.into(),
            ..Default::default()
        }
    }

    /// Use the three co-located files of a directory
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let locator = |name: &str| dir.join(name).to_string_lossy().into_owned();
        Self::new(
            locator(LOG_LIST_FILE),
            locator(LOG_LIST_SIGNATURE_FILE),
            locator(LOG_LIST_PUBLIC_KEY_FILE),
        )
    }

    /// Set the HTTP timeout
    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = Some(timeout);
        self
    }

    /// Disable the HTTP timeout
    pub fn without_http_timeout(mut self) -> Self {
        self.http_timeout = None;
        self
    }
}

impl LogList {
    /// Fetch, verify and filter a log list
    pub async fn load(config: &LoaderConfig) -> Result<Self> {
        let list_source = Source::parse(&config.log_list)?;
        let sig_source = Source::parse(&config.signature)?;
        let key_source = Source::parse(&config.public_key)?;

        let fetcher = Fetcher::new(config.http_timeout)?;
        let json = fetcher.fetch(&list_source).await?;
        let signature = fetcher.fetch(&sig_source).await?;
        let public_key = fetcher.fetch(&key_source).await?;

        let list = LogList::from_signed_json(&json, &signature, &public_key)?;
        tracing::info!(
            "Loaded CT log list from {} with {} usable logs",
            list_source,
            list.len()
        );
        Ok(list)
    }

    /// Load the list published by Google
    pub async fn load_default() -> Result<Self> {
        Self::load(&LoaderConfig::default()).await
    }
}

/// Load a log list from three locators
pub async fn load_log_list(list: &str, signature: &str, public_key: &str) -> Result<LogList> {
    LogList::load(&LoaderConfig::new(list, signature, public_key)).await
}
