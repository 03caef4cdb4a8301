//! In-memory storage used by tests and ephemeral boards.

use super::{batch_keys, entry_size, KeyValueStorage, StorageError, StorageResult};
use std::collections::BTreeMap;

/// Map-backed storage with an optional byte quota.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
    quota_bytes: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Changes the byte budget for subsequent writes.
    ///
    /// Existing entries are kept even when they already exceed the new quota.
    pub fn set_quota(&mut self, quota_bytes: Option<usize>) {
        self.quota_bytes = quota_bytes;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn current_usage(&self) -> usize {
        self.entries
            .iter()
            .map(|(key, value)| entry_size(key, value))
            .sum()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set_many(&mut self, entries: &[(&str, &str)]) -> StorageResult<()> {
        // Last write per key decides the projected size.
        let mut staged: BTreeMap<&str, &str> = BTreeMap::new();
        for &(key, value) in entries {
            staged.insert(key, value);
        }

        if let Some(quota_bytes) = self.quota_bytes {
            let replaced: usize = staged
                .keys()
                .filter_map(|key| self.entries.get_key_value(*key))
                .map(|(key, value)| entry_size(key, value))
                .sum();
            let added: usize = staged
                .iter()
                .map(|(key, value)| entry_size(key, value))
                .sum();
            let required_bytes = self.current_usage() - replaced + added;

            if required_bytes > quota_bytes {
                return Err(StorageError::QuotaExceeded {
                    keys: batch_keys(entries),
                    required_bytes,
                    quota_bytes,
                });
            }
        }

        for (key, value) in staged {
            self.entries.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn usage_bytes(&self) -> StorageResult<usize> {
        Ok(self.current_usage())
    }
}
