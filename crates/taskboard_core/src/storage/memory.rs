//! In-process key-value storage with an optional byte quota.

use super::{KeyValueStorage, StorageError, StorageResult};
use std::collections::HashMap;

/// Volatile storage, used for tests and ephemeral sessions.
///
/// When a quota is set, a write whose total stored size (keys plus values)
/// would exceed it is rejected and the previous value is kept.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStorage {
    items: HashMap<String, String>,
    quota_bytes: Option<usize>,
}

impl MemoryKeyValueStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            items: HashMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }

    pub fn set_quota(&mut self, quota_bytes: Option<usize>) {
        self.quota_bytes = quota_bytes;
    }

    /// Total bytes currently stored across keys and values.
    pub fn used_bytes(&self) -> usize {
        self.items
            .iter()
            .map(|(key, value)| key.len() + value.len())
            .sum()
    }
}

impl KeyValueStorage for MemoryKeyValueStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()> {
        if let Some(quota_bytes) = self.quota_bytes {
            let replaced = self
                .items
                .get(key)
                .map_or(0, |previous| key.len() + previous.len());
            let required_bytes = self.used_bytes() - replaced + key.len() + value.len();
            if required_bytes > quota_bytes {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    required_bytes,
                    quota_bytes,
                });
            }
        }
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
