//! Byte-fetch service
//!
//! Every input of the loader is a locator: either a local file path or an
//! `http://`/`https://` URL.

use crate::{Error, Result};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Where a blob comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    Url(Url),
}

impl Source {
    /// Interpret a locator string
    ///
    /// Anything with an `http` or `https` scheme is a URL; other schemes are
    /// rejected; everything else is a file path.
    pub fn parse(locator: &str) -> Result<Self> {
        if locator.is_empty() {
            return Err(Error::InvalidSource("empty locator".to_string()));
        }
        if locator.starts_with("http://") || locator.starts_with("https://") {
            let url = Url::parse(locator)
                .map_err(|e| Error::InvalidSource(format!("{}: {}", locator, e)))?;
            return Ok(Source::Url(url));
        }
        if locator.contains("://") {
            return Err(Error::InvalidSource(format!(
                "{}: unsupported scheme",
                locator
            )));
        }
        Ok(Source::Path(PathBuf::from(locator)))
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Path(path) => write!(f, "{}", path.display()),
            Source::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Reads sources from disk or over HTTP
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    /// Create a fetcher with an optional per-request timeout
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| Error::Fetch {
            locator: "<http client>".to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { client })
    }

    /// Read the whole blob behind `source`
    pub async fn fetch(&self, source: &Source) -> Result<Vec<u8>> {
        let fetch_err = |reason: String| Error::Fetch {
            locator: source.to_string(),
            reason,
        };

        match source {
            Source::Path(path) => tokio::fs::read(path)
                .await
                .map_err(|e| fetch_err(e.to_string())),
            Source::Url(url) => {
                let response = self
                    .client
                    .get(url.clone())
                    .send()
                    .await
                    .map_err(|e| fetch_err(e.to_string()))?;

                if !response.status().is_success() {
                    return Err(fetch_err(format!("HTTP {}", response.status())));
                }

                let body = response
                    .bytes()
                    .await
                    .map_err(|e| fetch_err(e.to_string()))?;
                Ok(body.to_vec())
            }
        }
    }
}
