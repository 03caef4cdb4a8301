//! Core state layer for the family task board.
//! This crate owns every board invariant; presentation code only calls
//! `TaskBoard` operations and renders their results.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod storage;

pub use config::{BoardConfig, ConfigError, StorageKeys};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::id::{TaskId, UserId};
pub use model::progress::Progress;
pub use model::task::Task;
pub use model::user::User;
pub use model::validation::ValidationError;
pub use model::weekday::{ParseWeekdayError, Weekday};
pub use service::notice::{Notice, NoticeDuration, NoticeLevel};
pub use service::task_board::{Commit, StoreError, StoreResult, TaskBoard};
pub use storage::{
    KeyValueStorage, LoadError, MemoryStorage, PersistenceAdapter, SqliteStorage, StorageError,
    StorageResult, WriteBatch,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
