//! Lookup of logs by the identifier SCTs carry

use crate::log_list::{LogDescriptor, LogList};
use ct_types::LogKeyId;
use std::collections::HashMap;

/// Read-only index of trusted logs keyed by [`LogKeyId`]
#[derive(Debug, Clone, Default)]
pub struct LogRegistry {
    logs: HashMap<LogKeyId, LogDescriptor>,
}

impl LogRegistry {
    /// Index every log of a verified list
    pub fn new(list: &LogList) -> Self {
        Self::from_descriptors(list.iter().cloned())
    }

    /// Index logs obtained some other way
    ///
    /// The caller vouches for the descriptors. If two share a key the first
    /// one is kept.
    pub fn from_descriptors(descriptors: impl IntoIterator<Item = LogDescriptor>) -> Self {
        let mut logs = HashMap::new();
        for log in descriptors {
            if logs.contains_key(log.key_id()) {
                tracing::debug!(
                    "Ignoring duplicate log {} ({})",
                    log.key_id(),
                    log.description()
                );
                continue;
            }
            logs.insert(*log.key_id(), log);
        }
        Self { logs }
    }

    pub fn find_by_key_id(&self, key_id: &LogKeyId) -> Option<&LogDescriptor> {
        self.logs.get(key_id)
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogDescriptor> {
        self.logs.values()
    }
}
