//! Key-value persistence for board state.
//!
//! # Responsibility
//! - Define the `KeyValueStorage` contract the board writes through.
//! - Provide an in-memory fake and a durable SQLite backend.
//! - Layer JSON (de)serialization on top via `PersistenceAdapter`.
//!
//! # Invariants
//! - `set_many` is all-or-nothing: a rejected batch leaves every key as it was.
//! - Usage is counted as key bytes plus value bytes per entry.
//! - Quota rejections are ordinary errors, never panics.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod adapter;
pub mod memory;
pub mod sqlite;

pub use adapter::{LoadError, PersistenceAdapter, WriteBatch};
pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

pub type StorageResult<T> = Result<T, StorageError>;

/// Rejected or failed storage operation.
#[derive(Debug)]
pub enum StorageError {
    /// The write would push usage past the configured byte budget.
    QuotaExceeded {
        keys: Vec<String>,
        required_bytes: usize,
        quota_bytes: usize,
    },
    /// A value could not be encoded as JSON.
    Serialize {
        key: String,
        source: serde_json::Error,
    },
    Db(DbError),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QuotaExceeded {
                keys,
                required_bytes,
                quota_bytes,
            } => write!(
                f,
                "storage quota exceeded writing `{}`: {required_bytes} bytes required, {quota_bytes} allowed",
                keys.join(", ")
            ),
            Self::Serialize { key, source } => {
                write!(f, "failed to serialize value for `{key}`: {source}")
            }
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::QuotaExceeded { .. } => None,
            Self::Serialize { source, .. } => Some(source),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Flat string-to-string store, modelled on browser local storage.
pub trait KeyValueStorage {
    /// Returns the stored value, or `None` when the key was never written.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Writes every entry or none of them.
    ///
    /// Later entries win when the same key appears twice.
    fn set_many(&mut self, entries: &[(&str, &str)]) -> StorageResult<()>;

    fn remove(&mut self, key: &str) -> StorageResult<()>;

    /// Bytes currently occupied by all entries.
    fn usage_bytes(&self) -> StorageResult<usize>;

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.set_many(&[(key, value)])
    }
}

pub(crate) fn entry_size(key: &str, value: &str) -> usize {
    key.len() + value.len()
}

pub(crate) fn batch_keys(entries: &[(&str, &str)]) -> Vec<String> {
    let mut keys: Vec<String> = Vec::with_capacity(entries.len());
    for (key, _) in entries {
        if !keys.iter().any(|existing| existing == key) {
            keys.push((*key).to_string());
        }
    }
    keys
}
