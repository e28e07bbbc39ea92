//! Certificate Transparency log list handling
//!
//! This crate loads the signed list of known CT logs, verifies it against a
//! pinned publisher key, keeps the logs in good standing and indexes them by
//! the log ID that SCTs carry.
//!
//! # Example
//!
//! ```no_run
//! use ct_loglist::{LogList, LogRegistry};
//!
//! # async fn example() -> Result<(), ct_loglist::Error> {
//! let list = LogList::load_default().await?;
//! let registry = LogRegistry::new(&list);
//! println!("{} logs", registry.len());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;
pub mod log_list;
pub mod registry;
pub mod source;

pub use error::{Error, Result};
pub use loader::{load_log_list, LoaderConfig};
pub use log_list::{LogDescriptor, LogList, LogStatus};
pub use registry::LogRegistry;
pub use source::{Fetcher, Source};
