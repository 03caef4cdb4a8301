//! Family member profile.
//!
//! # Invariants
//! - `name` is never empty after trimming.
//! - `id` is stable for the lifetime of the profile.

use crate::config::{DEFAULT_REWARD, DEFAULT_USER_COLOR};
use crate::model::id::UserId;
use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};

/// One profile whose tasks can be shown on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// CSS color value used for the avatar swatch.
    pub color: String,
    /// Free-text reward promised for finishing the day's tasks.
    pub reward: String,
}

impl User {
    /// Creates a profile with a generated id.
    ///
    /// Name and reward are trimmed. A blank reward or color falls back to
    /// the board defaults.
    ///
    /// # Errors
    /// - `ValidationError::EmptyUserName` when `name` is blank.
    pub fn new(name: &str, color: &str, reward: &str) -> Result<Self, ValidationError> {
        Self::with_id(UserId::generate(), name, color, reward)
    }

    /// Creates a profile with a caller-provided id, used for seed data.
    pub fn with_id(
        id: UserId,
        name: &str,
        color: &str,
        reward: &str,
    ) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyUserName);
        }

        let color = match color.trim() {
            "" => DEFAULT_USER_COLOR,
            other => other,
        };
        let reward = match reward.trim() {
            "" => DEFAULT_REWARD,
            other => other,
        };

        Ok(Self {
            id,
            name: name.to_string(),
            color: color.to_string(),
            reward: reward.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::User;
    use crate::config::{DEFAULT_REWARD, DEFAULT_USER_COLOR};
    use crate::model::validation::ValidationError;

    #[test]
    fn new_trims_and_fills_defaults() {
        let user = User::new("  Sam ", " ", "").unwrap();
        assert_eq!(user.name, "Sam");
        assert_eq!(user.color, DEFAULT_USER_COLOR);
        assert_eq!(user.reward, DEFAULT_REWARD);
    }

    #[test]
    fn new_rejects_blank_name() {
        assert_eq!(
            User::new(" \t", "#000", "ice cream").unwrap_err(),
            ValidationError::EmptyUserName
        );
    }
}
