//! Board configuration and seed data.
//!
//! # Responsibility
//! - Hold compiled defaults: storage key names, seed profiles, notice timing.
//! - Apply partial overrides from a TOML document.
//!
//! # Invariants
//! - A resolved config always has at least one seed profile.
//! - Storage key names are non-empty and pairwise distinct.

use crate::model::id::UserId;
use crate::model::user::User;
use crate::service::notice::NoticeDuration;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Avatar color used when a profile is created without one.
pub const DEFAULT_USER_COLOR: &str = "#4CAF50";
/// Reward text used when a profile is created without one.
pub const DEFAULT_REWARD: &str = "No reward specified";
/// Byte budget matching the common browser local-storage limit.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

const DEFAULT_USERS_KEY: &str = "family_task_manager_users";
const DEFAULT_TASKS_KEY: &str = "family_task_manager_tasks";
const DEFAULT_CURRENT_USER_KEY: &str = "family_task_manager_current_user";

/// Errors raised while resolving configuration.
#[derive(Debug)]
pub enum ConfigError {
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseToml(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReadFile { path, source } => {
                write!(f, "failed to read config file {}: {source}", path.display())
            }
            Self::ParseToml(err) => write!(f, "failed to parse config file: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ReadFile { source, .. } => Some(source),
            Self::ParseToml(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::ParseToml(value)
    }
}

/// Key names of the three persisted entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub users: String,
    pub tasks: String,
    pub current_user: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            users: DEFAULT_USERS_KEY.to_string(),
            tasks: DEFAULT_TASKS_KEY.to_string(),
            current_user: DEFAULT_CURRENT_USER_KEY.to_string(),
        }
    }
}

/// Fully resolved board configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    pub storage_keys: StorageKeys,
    /// Profiles written on first run, in display order.
    pub default_users: Vec<User>,
    /// How long error and warning notices stay visible.
    pub notice_duration: NoticeDuration,
    /// Storage byte budget; `None` disables the check.
    pub quota_bytes: Option<usize>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            storage_keys: StorageKeys::default(),
            default_users: default_users(),
            notice_duration: NoticeDuration::default(),
            quota_bytes: Some(DEFAULT_QUOTA_BYTES),
        }
    }
}

fn default_users() -> Vec<User> {
    vec![
        User {
            id: UserId::from("1"),
            name: "Parent".to_string(),
            color: "#03A9F4".to_string(),
            reward: "Cup of coffee".to_string(),
        },
        User {
            id: UserId::from("2"),
            name: "Child".to_string(),
            color: "#FF4081".to_string(),
            reward: "30 minutes of video games".to_string(),
        },
    ]
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    storage: StorageFileConfig,
    notices: NoticeFileConfig,
    default_users: Option<Vec<UserFileConfig>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StorageFileConfig {
    users_key: Option<String>,
    tasks_key: Option<String>,
    current_user_key: Option<String>,
    /// `0` disables the quota.
    quota_bytes: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NoticeFileConfig {
    duration: Option<NoticeDuration>,
}

#[derive(Debug, Deserialize)]
struct UserFileConfig {
    id: String,
    name: String,
    #[serde(default)]
    color: String,
    #[serde(default)]
    reward: String,
}

impl BoardConfig {
    /// Reads and resolves a TOML config file.
    ///
    /// # Errors
    /// - `ConfigError::ReadFile` when the file cannot be read.
    /// - `ConfigError::ParseToml` / `ConfigError::Invalid` as in `from_toml_str`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Resolves a TOML document on top of compiled defaults.
    ///
    /// Missing sections and fields keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(text)?;
        let mut config = Self::default();

        if let Some(key) = file.storage.users_key {
            config.storage_keys.users = key;
        }
        if let Some(key) = file.storage.tasks_key {
            config.storage_keys.tasks = key;
        }
        if let Some(key) = file.storage.current_user_key {
            config.storage_keys.current_user = key;
        }
        if let Some(quota) = file.storage.quota_bytes {
            config.quota_bytes = (quota > 0).then_some(quota);
        }
        if let Some(duration) = file.notices.duration {
            config.notice_duration = duration;
        }
        if let Some(users) = file.default_users {
            config.default_users = users
                .into_iter()
                .map(|user| {
                    User::with_id(
                        UserId::from(user.id),
                        &user.name,
                        &user.color,
                        &user.reward,
                    )
                    .map_err(|err| ConfigError::Invalid(format!("default_users: {err}")))
                })
                .collect::<Result<Vec<_>, _>>()?;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_users.is_empty() {
            return Err(ConfigError::Invalid(
                "default_users must contain at least one profile".to_string(),
            ));
        }
        for (index, user) in self.default_users.iter().enumerate() {
            if self.default_users[..index]
                .iter()
                .any(|earlier| earlier.id == user.id)
            {
                return Err(ConfigError::Invalid(format!(
                    "default_users: id `{}` is used more than once",
                    user.id
                )));
            }
        }

        let keys = [
            &self.storage_keys.users,
            &self.storage_keys.tasks,
            &self.storage_keys.current_user,
        ];
        if keys.iter().any(|key| key.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "storage key names cannot be empty".to_string(),
            ));
        }
        if keys[0] == keys[1] || keys[0] == keys[2] || keys[1] == keys[2] {
            return Err(ConfigError::Invalid(
                "storage key names must be distinct".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{BoardConfig, ConfigError, DEFAULT_QUOTA_BYTES};
    use crate::service::notice::NoticeDuration;

    #[test]
    fn empty_document_keeps_defaults() {
        let config = BoardConfig::from_toml_str("").unwrap();
        assert_eq!(config, BoardConfig::default());
        assert_eq!(config.default_users.len(), 2);
        assert_eq!(config.default_users[0].name, "Parent");
        assert_eq!(config.quota_bytes, Some(DEFAULT_QUOTA_BYTES));
    }

    #[test]
    fn overrides_apply_per_field() {
        let config = BoardConfig::from_toml_str(
            r##"
            [storage]
            users_key = "board_users"
            quota_bytes = 0

            [notices]
            duration = "long"

            [[default_users]]
            id = "a"
            name = "Robin"
            color = "#123456"
            "##,
        )
        .unwrap();

        assert_eq!(config.storage_keys.users, "board_users");
        assert_eq!(config.storage_keys.tasks, "family_task_manager_tasks");
        assert_eq!(config.quota_bytes, None);
        assert_eq!(config.notice_duration, NoticeDuration::Long);
        assert_eq!(config.default_users.len(), 1);
        assert_eq!(config.default_users[0].reward, "No reward specified");
    }

    #[test]
    fn rejects_empty_seed_and_clashing_keys() {
        let err = BoardConfig::from_toml_str("default_users = []").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = BoardConfig::from_toml_str(
            r#"
            [storage]
            users_key = "same"
            tasks_key = "same"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("distinct"));
    }

    #[test]
    fn rejects_repeated_default_user_ids() {
        let err = BoardConfig::from_toml_str(
            r#"
            [[default_users]]
            id = "1"
            name = "Mum"

            [[default_users]]
            id = "1"
            name = "Dad"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = BoardConfig::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }
}
