//! Durable key-value storage on SQLite.
//!
//! # Responsibility
//! - Persist board entries in the `kv_entries` table.
//! - Enforce the optional byte quota inside the write transaction.
//!
//! # Invariants
//! - A batch that would exceed the quota is rolled back before commit.
//! - Byte usage is measured on UTF-8 blobs, not character counts.

use super::{batch_keys, KeyValueStorage, StorageError, StorageResult};
use crate::db::{open_db, open_db_in_memory};
use log::warn;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

const USAGE_SQL: &str = "SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0)
FROM kv_entries;";

/// SQLite-backed storage owning its connection.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
    quota_bytes: Option<usize>,
}

impl SqliteStorage {
    /// Opens (and migrates) a board database file.
    pub fn open(path: impl AsRef<Path>, quota_bytes: Option<usize>) -> StorageResult<Self> {
        Ok(Self {
            conn: open_db(path)?,
            quota_bytes,
        })
    }

    /// Opens a private in-memory database; contents vanish on drop.
    pub fn in_memory(quota_bytes: Option<usize>) -> StorageResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
            quota_bytes,
        })
    }

    /// Read access for diagnostics and tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn usage(conn: &Connection) -> rusqlite::Result<usize> {
    let bytes: i64 = conn.query_row(USAGE_SQL, [], |row| row.get(0))?;
    Ok(usize::try_from(bytes).unwrap_or(0))
}

impl KeyValueStorage for SqliteStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_many(&mut self, entries: &[(&str, &str)]) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        for (key, value) in entries {
            tx.execute(
                "INSERT INTO kv_entries (key, value, updated_at)
                 VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at;",
                params![key, value],
            )?;
        }

        if let Some(quota_bytes) = self.quota_bytes {
            let required_bytes = usage(&tx)?;
            if required_bytes > quota_bytes {
                tx.rollback()?;
                let keys = batch_keys(entries);
                warn!(
                    "event=storage_write module=storage status=error backend=sqlite error_code=quota_exceeded keys={} required_bytes={required_bytes} quota_bytes={quota_bytes}",
                    keys.join(",")
                );
                return Err(StorageError::QuotaExceeded {
                    keys,
                    required_bytes,
                    quota_bytes,
                });
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(())
    }

    fn usage_bytes(&self) -> StorageResult<usize> {
        Ok(usage(&self.conn)?)
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteStorage;
    use crate::storage::KeyValueStorage;

    #[test]
    fn set_overwrites_and_remove_frees_usage() {
        let mut storage = SqliteStorage::in_memory(None).unwrap();
        storage.set("users", "[]").unwrap();
        storage.set("users", "[1]").unwrap();
        storage.set("current", "1").unwrap();
        assert_eq!(storage.get("users").unwrap().as_deref(), Some("[1]"));
        assert_eq!(storage.usage_bytes().unwrap(), 8 + 8);

        storage.remove("users").unwrap();
        assert_eq!(storage.get("users").unwrap(), None);
        assert_eq!(storage.usage_bytes().unwrap(), 8);

        storage.remove("never-written").unwrap();
        assert_eq!(storage.get("current").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn usage_counts_utf8_bytes() {
        let mut storage = SqliteStorage::in_memory(Some(8)).unwrap();
        storage.set("k", "\u{e9}\u{e9}\u{e9}").unwrap();
        assert_eq!(storage.usage_bytes().unwrap(), 1 + 6);
        assert!(storage.set("k", "\u{e9}\u{e9}\u{e9}\u{e9}").is_err());
    }
}
