//! User-facing notices for failed or partially persisted operations.
//!
//! The presentation layer renders a `Notice` as a toast and hides it after
//! `dismiss_after`.

use crate::service::task_board::{Commit, StoreError};
use crate::storage::StorageError;
use serde::{Deserialize, Serialize};

/// Enumerated auto-dismiss delay for notices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeDuration {
    /// 3 seconds.
    #[default]
    Short,
    /// 6 seconds.
    Long,
    /// Stays until dismissed by the user.
    Sticky,
}

impl NoticeDuration {
    /// Delay in milliseconds, or `None` for sticky notices.
    pub fn as_millis(self) -> Option<u64> {
        match self {
            Self::Short => Some(3_000),
            Self::Long => Some(6_000),
            Self::Sticky => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// The operation was refused; state is unchanged.
    Error,
    /// The change is visible but was not saved.
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub dismiss_after: NoticeDuration,
}

impl Notice {
    /// Notice for a refused operation.
    pub fn for_error(err: &StoreError, dismiss_after: NoticeDuration) -> Self {
        let message = match err {
            StoreError::Storage(storage_err) => storage_message(storage_err),
            other => other.to_string(),
        };
        Self {
            level: NoticeLevel::Error,
            message,
            dismiss_after,
        }
    }

    /// Notice for a change that was applied in memory but not saved.
    pub fn for_storage_warning(err: &StorageError, dismiss_after: NoticeDuration) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: storage_message(err),
            dismiss_after,
        }
    }
}

fn storage_message(err: &StorageError) -> String {
    match err {
        StorageError::QuotaExceeded { .. } => {
            "Failed to save changes. Local storage may be full.".to_string()
        }
        other => format!("Failed to save changes: {other}"),
    }
}

impl<T> Commit<T> {
    /// Warning notice when this commit was not persisted.
    pub fn notice(&self, dismiss_after: NoticeDuration) -> Option<Notice> {
        self.warning()
            .map(|err| Notice::for_storage_warning(err, dismiss_after))
    }
}

#[cfg(test)]
mod tests {
    use super::{Notice, NoticeDuration, NoticeLevel};
    use crate::model::validation::ValidationError;
    use crate::service::task_board::StoreError;
    use crate::storage::StorageError;

    #[test]
    fn default_duration_is_three_seconds() {
        assert_eq!(NoticeDuration::default().as_millis(), Some(3_000));
        assert_eq!(NoticeDuration::Sticky.as_millis(), None);
    }

    #[test]
    fn error_notice_uses_error_text() {
        let notice = Notice::for_error(
            &StoreError::Validation(ValidationError::EmptyTaskTitle),
            NoticeDuration::Short,
        );
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "Task title cannot be empty");

        let notice = Notice::for_error(&StoreError::LastUser, NoticeDuration::Short);
        assert!(notice.message.contains("At least one user must remain"));
    }

    #[test]
    fn quota_warning_mentions_full_storage() {
        let notice = Notice::for_storage_warning(
            &StorageError::QuotaExceeded {
                keys: vec!["tasks".to_string()],
                required_bytes: 10,
                quota_bytes: 5,
            },
            NoticeDuration::Long,
        );
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert!(notice.message.contains("may be full"));
        assert_eq!(notice.dismiss_after, NoticeDuration::Long);
    }
}
