//! JSON persistence adapter over a key-value backend.
//!
//! # Responsibility
//! - Encode collections as JSON text on save and decode them on load.
//! - Distinguish "never written" from "written but unreadable".
//!
//! # Invariants
//! - `load` returns `Ok(None)` only when the key is absent.
//! - `save_batch` inherits the backend's all-or-nothing guarantee.

use super::{KeyValueStorage, StorageError, StorageResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure to read a persisted value back.
#[derive(Debug)]
pub enum LoadError {
    Storage(StorageError),
    /// Stored text exists but does not decode to the expected shape.
    Corrupted {
        key: String,
        source: serde_json::Error,
    },
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Corrupted { key, source } => {
                write!(f, "corrupted value stored under `{key}`: {source}")
            }
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Corrupted { source, .. } => Some(source),
        }
    }
}

impl From<StorageError> for LoadError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Encoded entries written together by `PersistenceAdapter::save_batch`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    entries: Vec<(String, String)>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encodes `value` as JSON and stages it under `key`.
    pub fn put_json<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> StorageResult<()> {
        let text = encode(key, value)?;
        self.entries.push((key.to_string(), text));
        Ok(())
    }

    /// Stages a plain string under `key` without JSON encoding.
    pub fn put_raw(&mut self, key: &str, value: &str) {
        self.entries.push((key.to_string(), value.to_string()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Typed load/save facade used by the board.
#[derive(Debug)]
pub struct PersistenceAdapter<S: KeyValueStorage> {
    storage: S,
}

impl<S: KeyValueStorage> PersistenceAdapter<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_inner(self) -> S {
        self.storage
    }

    /// Loads and decodes a JSON value.
    ///
    /// # Errors
    /// - `LoadError::Corrupted` when stored text does not decode as `T`.
    /// - `LoadError::Storage` when the backend read fails.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, LoadError> {
        let Some(text) = self.storage.get(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| LoadError::Corrupted {
                key: key.to_string(),
                source,
            })
    }

    /// Encodes `value` as JSON and writes it under `key`.
    pub fn save<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> StorageResult<()> {
        let text = encode(key, value)?;
        self.storage.set(key, &text)
    }

    /// Reads a plain string value.
    pub fn load_raw(&self, key: &str) -> StorageResult<Option<String>> {
        self.storage.get(key)
    }

    /// Writes a plain string value.
    pub fn save_raw(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.storage.set(key, value)
    }

    /// Writes every staged entry or none of them.
    pub fn save_batch(&mut self, batch: &WriteBatch) -> StorageResult<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let entries: Vec<(&str, &str)> = batch
            .entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect();
        self.storage.set_many(&entries)
    }
}

fn encode<T: Serialize + ?Sized>(key: &str, value: &T) -> StorageResult<String> {
    serde_json::to_string(value).map_err(|source| StorageError::Serialize {
        key: key.to_string(),
        source,
    })
}
