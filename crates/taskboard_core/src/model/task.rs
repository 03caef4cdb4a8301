//! Task record scheduled for one user on one weekday.
//!
//! # Invariants
//! - `title` is never empty after trimming.
//! - `user_id` and `completed` are not changed by `revise`.

use crate::model::id::{TaskId, UserId};
use crate::model::validation::ValidationError;
use crate::model::weekday::Weekday;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One chore on the board.
///
/// Serialized with camelCase names (`userId`, `createdAt`) to match the
/// persisted collection layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub user_id: UserId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub day: Weekday,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Creates an open task with a generated id.
    ///
    /// # Errors
    /// - `ValidationError::EmptyTaskTitle` when `title` is blank.
    pub fn new(
        user_id: UserId,
        title: &str,
        description: &str,
        day: Weekday,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let title = normalized_title(title)?;
        Ok(Self {
            id: TaskId::generate(),
            user_id,
            title,
            description: description.trim().to_string(),
            day,
            completed: false,
            created_at,
        })
    }

    /// Replaces title, description and day.
    ///
    /// Leaves the task untouched when validation fails.
    pub fn revise(
        &mut self,
        title: &str,
        description: &str,
        day: Weekday,
    ) -> Result<(), ValidationError> {
        self.title = normalized_title(title)?;
        self.description = description.trim().to_string();
        self.day = day;
        Ok(())
    }

    /// Flips completion and returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.completed = !self.completed;
        self.completed
    }
}

fn normalized_title(title: &str) -> Result<String, ValidationError> {
    match title.trim() {
        "" => Err(ValidationError::EmptyTaskTitle),
        trimmed => Ok(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::Task;
    use crate::model::id::UserId;
    use crate::model::validation::ValidationError;
    use crate::model::weekday::Weekday;
    use chrono::{TimeZone, Utc};

    fn sample() -> Task {
        Task::new(
            UserId::from("1"),
            "Feed the cat",
            "",
            Weekday::Monday,
            Utc.with_ymd_and_hms(2024, 3, 4, 8, 30, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn revise_rejects_blank_title_without_mutation() {
        let mut task = sample();
        let err = task.revise("   ", "new", Weekday::Friday).unwrap_err();
        assert_eq!(err, ValidationError::EmptyTaskTitle);
        assert_eq!(task.title, "Feed the cat");
        assert_eq!(task.day, Weekday::Monday);
        assert_eq!(task.description, "");
    }

    #[test]
    fn serialization_uses_persisted_field_names() {
        let task = sample();
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["userId"], "1");
        assert_eq!(json["day"], "monday");
        assert_eq!(json["completed"], false);
        assert!(json["createdAt"].as_str().unwrap().starts_with("2024-03-04T08:30:00"));
    }

    #[test]
    fn deserializes_records_without_description() {
        let json = r#"{
            "id": "lq2x9abcd",
            "userId": "2",
            "title": "Homework",
            "day": "tuesday",
            "completed": true,
            "createdAt": "2024-03-05T16:00:00.000Z"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.description, "");
        assert_eq!(task.day, Weekday::Tuesday);
        assert!(task.completed);
    }
}
