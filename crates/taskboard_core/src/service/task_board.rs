//! Family task board state and use-case operations.
//!
//! # Responsibility
//! - Own users, tasks, current user and current day for one board.
//! - Validate every mutation and write the affected collections through
//!   `PersistenceAdapter` right after it.
//! - Derive the visible task list and progress on demand.
//!
//! # Invariants
//! - At least one user exists at all times.
//! - User ids and task ids are unique within the board.
//! - Every task in `tasks` references a live user; deleting a user cascades
//!   to its tasks. Stored tasks of unknown users are held back unchanged.
//! - `current_user_id` always names an existing user.
//! - A refused operation leaves in-memory state untouched.
//! - A failed write keeps the in-memory change and is reported via `Commit`.

use crate::config::{BoardConfig, StorageKeys};
use crate::model::id::{TaskId, UserId};
use crate::model::progress::Progress;
use crate::model::task::Task;
use crate::model::user::User;
use crate::model::validation::ValidationError;
use crate::model::weekday::Weekday;
use crate::storage::{KeyValueStorage, LoadError, PersistenceAdapter, StorageError, WriteBatch};
use chrono::Utc;
use log::{info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::hash::Hash;

pub type StoreResult<T> = Result<T, StoreError>;

/// Refused board operation.
#[derive(Debug)]
pub enum StoreError {
    Validation(ValidationError),
    UserNotFound(UserId),
    TaskNotFound(TaskId),
    /// Deleting the only remaining user is not allowed.
    LastUser,
    /// Persisted state could not be read during initialization.
    Storage(StorageError),
    /// Internal consistency mismatch that should be unreachable.
    InconsistentState(&'static str),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::UserNotFound(id) => write!(f, "User not found: {id}"),
            Self::TaskNotFound(id) => write!(f, "Task not found: {id}"),
            Self::LastUser => write!(
                f,
                "Cannot delete the last user. At least one user must remain."
            ),
            Self::Storage(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent board state: {details}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StorageError> for StoreError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Result of an applied mutation.
///
/// The in-memory change always happened; `warning` is set when writing it
/// to storage failed, so persisted state lags behind until the next
/// successful write.
#[derive(Debug)]
#[must_use]
pub struct Commit<T> {
    value: T,
    warning: Option<StorageError>,
}

impl<T> Commit<T> {
    fn new(value: T, written: Result<(), StorageError>) -> Self {
        Self {
            value,
            warning: written.err(),
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn warning(&self) -> Option<&StorageError> {
        self.warning.as_ref()
    }

    pub fn is_persisted(&self) -> bool {
        self.warning.is_none()
    }

    pub fn into_parts(self) -> (T, Option<StorageError>) {
        (self.value, self.warning)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Users,
    Tasks,
    CurrentUser,
}

impl Section {
    fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Tasks => "tasks",
            Self::CurrentUser => "current_user",
        }
    }
}

/// One family task board backed by a key-value store.
#[derive(Debug)]
pub struct TaskBoard<S: KeyValueStorage> {
    persistence: PersistenceAdapter<S>,
    keys: StorageKeys,
    users: Vec<User>,
    tasks: Vec<Task>,
    /// Stored tasks whose owner is not in `users`; written back untouched.
    detached_tasks: Vec<Task>,
    current_user_id: UserId,
    current_day: Weekday,
}

impl<S: KeyValueStorage> TaskBoard<S> {
    /// Loads the board from `storage`, seeding first-run defaults.
    ///
    /// The current day is taken from the local clock once, here.
    pub fn initialize(storage: S, config: &BoardConfig) -> StoreResult<Commit<Self>> {
        Self::initialize_on(storage, config, Weekday::today())
    }

    /// Same as `initialize`, with the current day pinned by the caller.
    ///
    /// # Side effects
    /// - Seeds and persists default users when none are stored, or when the
    ///   stored list is unreadable or has no usable profile.
    /// - Drops stored users with a blank name or a repeated id and persists
    ///   the repaired list.
    /// - Seeds an empty task list when none is stored or it is unreadable.
    /// - Drops tasks with a repeated id. Tasks of unknown users are hidden
    ///   from the board but stay in storage.
    /// - Persists the current-user selection when it was missing or dangling.
    ///
    /// # Errors
    /// - `StoreError::Storage` when the backend cannot be read at all.
    pub fn initialize_on(
        storage: S,
        config: &BoardConfig,
        day: Weekday,
    ) -> StoreResult<Commit<Self>> {
        let mut persistence = PersistenceAdapter::new(storage);
        let keys = config.storage_keys.clone();
        let mut seed = WriteBatch::new();

        let mut users =
            load_collection::<S, User>(&persistence, &keys.users)?.unwrap_or_default();
        let loaded_users = users.len();
        users.retain(|user| !user.name.trim().is_empty());
        drop_repeated_ids(&mut users, |user| &user.id);
        if users.is_empty() {
            users = config.default_users.clone();
            seed.put_json(&keys.users, &users)?;
        } else if users.len() != loaded_users {
            warn!(
                "event=board_init module=task_board status=repair dropped_users={}",
                loaded_users - users.len()
            );
            seed.put_json(&keys.users, &users)?;
        }

        let stored_tasks = load_collection::<S, Task>(&persistence, &keys.tasks)?;
        let tasks_missing = stored_tasks.is_none();
        let mut stored_tasks = stored_tasks.unwrap_or_default();
        let repeated_tasks = drop_repeated_ids(&mut stored_tasks, |task| &task.id);
        let (tasks, detached_tasks): (Vec<Task>, Vec<Task>) = stored_tasks
            .into_iter()
            .partition(|task| users.iter().any(|user| user.id == task.user_id));
        if repeated_tasks > 0 {
            warn!(
                "event=board_init module=task_board status=repair dropped_tasks={repeated_tasks}"
            );
        }
        if !detached_tasks.is_empty() {
            warn!(
                "event=board_init module=task_board status=repair detached_tasks={}",
                detached_tasks.len()
            );
        }
        if tasks_missing || repeated_tasks > 0 {
            seed.put_json(&keys.tasks, &task_records(&tasks, &detached_tasks))?;
        }

        let stored_current = persistence
            .load_raw(&keys.current_user)?
            .map(|raw| parse_current_user(&raw));
        let current_user_id = match stored_current {
            Some(id) if users.iter().any(|user| user.id == id) => id,
            _ => {
                let id = first_user_id(&users)?;
                seed.put_raw(&keys.current_user, id.as_str());
                id
            }
        };

        let written = persistence.save_batch(&seed);
        match &written {
            Ok(()) => info!(
                "event=board_init module=task_board status=ok users={} tasks={} seeded_entries={} day={day}",
                users.len(),
                tasks.len(),
                seed.len()
            ),
            Err(err) => warn!(
                "event=board_init module=task_board status=error error_code=seed_write_failed error={err}"
            ),
        }

        let board = Self {
            persistence,
            keys,
            users,
            tasks,
            detached_tasks,
            current_user_id,
            current_day: day,
        };
        Ok(Commit::new(board, written))
    }

    /// Creates a user and appends it to the display order.
    ///
    /// Duplicate names are allowed.
    pub fn add_user(&mut self, name: &str, color: &str, reward: &str) -> StoreResult<Commit<UserId>> {
        let user = User::new(name, color, reward)?;
        let id = user.id.clone();
        self.users.push(user);
        info!(
            "event=user_add module=task_board status=ok users={}",
            self.users.len()
        );
        let written = self.persist(&[Section::Users]);
        Ok(Commit::new(id, written))
    }

    /// Deletes a user together with all of their tasks.
    ///
    /// When the deleted user was selected, selection moves to the first
    /// remaining user. Users, tasks and selection are written in one batch.
    ///
    /// # Errors
    /// - `StoreError::LastUser` when only one user remains.
    /// - `StoreError::UserNotFound` when `id` is unknown.
    pub fn delete_user(&mut self, id: &UserId) -> StoreResult<Commit<User>> {
        if self.users.len() <= 1 {
            return Err(StoreError::LastUser);
        }
        let index = self
            .users
            .iter()
            .position(|user| &user.id == id)
            .ok_or_else(|| StoreError::UserNotFound(id.clone()))?;

        let removed = self.users.remove(index);
        let before = self.tasks.len();
        self.tasks.retain(|task| &task.user_id != id);
        if &self.current_user_id == id {
            self.current_user_id = first_user_id(&self.users)?;
        }

        info!(
            "event=user_delete module=task_board status=ok cascaded_tasks={} users={}",
            before - self.tasks.len(),
            self.users.len()
        );
        let written = self.persist(&[Section::Users, Section::Tasks, Section::CurrentUser]);
        Ok(Commit::new(removed, written))
    }

    /// Makes `id` the current user and persists the choice.
    pub fn select_user(&mut self, id: &UserId) -> StoreResult<Commit<()>> {
        if !self.has_user(id) {
            return Err(StoreError::UserNotFound(id.clone()));
        }
        self.current_user_id = id.clone();
        let written = self.persist(&[Section::CurrentUser]);
        Ok(Commit::new((), written))
    }

    /// Changes the day filter. Session only; nothing is written.
    pub fn select_day(&mut self, day: Weekday) {
        self.current_day = day;
    }

    /// Creates an open task for `user_id` on `day`.
    ///
    /// # Errors
    /// - `StoreError::Validation` when `title` is blank.
    /// - `StoreError::UserNotFound` when `user_id` is unknown.
    pub fn add_task(
        &mut self,
        title: &str,
        description: &str,
        day: Weekday,
        user_id: &UserId,
    ) -> StoreResult<Commit<TaskId>> {
        let task = Task::new(user_id.clone(), title, description, day, Utc::now())?;
        if !self.has_user(user_id) {
            return Err(StoreError::UserNotFound(user_id.clone()));
        }

        let id = task.id.clone();
        self.tasks.push(task);
        info!(
            "event=task_add module=task_board status=ok day={day} tasks={}",
            self.tasks.len()
        );
        let written = self.persist(&[Section::Tasks]);
        Ok(Commit::new(id, written))
    }

    /// Creates an open task for the current user.
    pub fn add_task_for_current_user(
        &mut self,
        title: &str,
        description: &str,
        day: Weekday,
    ) -> StoreResult<Commit<TaskId>> {
        let user_id = self.current_user_id.clone();
        self.add_task(title, description, day, &user_id)
    }

    /// Replaces title, description and day of an existing task.
    ///
    /// Owner and completion state are not changed.
    pub fn update_task(
        &mut self,
        id: &TaskId,
        title: &str,
        description: &str,
        day: Weekday,
    ) -> StoreResult<Commit<()>> {
        let task = self
            .tasks
            .iter_mut()
            .find(|task| &task.id == id)
            .ok_or_else(|| StoreError::TaskNotFound(id.clone()))?;
        task.revise(title, description, day)?;

        let written = self.persist(&[Section::Tasks]);
        Ok(Commit::new((), written))
    }

    /// Removes a task; unknown ids are a no-op.
    ///
    /// Returns whether a task was removed. The task list is written either way.
    pub fn delete_task(&mut self, id: &TaskId) -> Commit<bool> {
        let before = self.tasks.len();
        self.tasks.retain(|task| &task.id != id);
        let removed = self.tasks.len() != before;
        let written = self.persist(&[Section::Tasks]);
        Commit::new(removed, written)
    }

    /// Flips completion of a task and returns the new state.
    pub fn toggle_task_completion(&mut self, id: &TaskId) -> StoreResult<Commit<bool>> {
        let completed = self
            .tasks
            .iter_mut()
            .find(|task| &task.id == id)
            .ok_or_else(|| StoreError::TaskNotFound(id.clone()))?
            .toggle();

        let written = self.persist(&[Section::Tasks]);
        Ok(Commit::new(completed, written))
    }

    /// Tasks of the current user on the current day, in insertion order.
    pub fn visible_tasks(&self) -> impl Iterator<Item = &Task> + '_ {
        self.tasks_for(&self.current_user_id, self.current_day)
    }

    /// Tasks of `user_id` on `day`, in insertion order.
    pub fn tasks_for<'a>(
        &'a self,
        user_id: &'a UserId,
        day: Weekday,
    ) -> impl Iterator<Item = &'a Task> + 'a {
        self.tasks
            .iter()
            .filter(move |task| &task.user_id == user_id && task.day == day)
    }

    /// Completion tally over `visible_tasks`.
    pub fn progress(&self) -> Progress {
        Progress::from_tasks(self.visible_tasks())
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn user(&self, id: &UserId) -> Option<&User> {
        self.users.iter().find(|user| &user.id == id)
    }

    pub fn current_user_id(&self) -> &UserId {
        &self.current_user_id
    }

    pub fn current_user(&self) -> StoreResult<&User> {
        self.user(&self.current_user_id)
            .ok_or(StoreError::InconsistentState("current user is missing"))
    }

    pub fn current_day(&self) -> Weekday {
        self.current_day
    }

    /// Selectable days in display order.
    pub fn days(&self) -> &'static [Weekday] {
        &Weekday::ALL
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    /// False when only one user remains and deletion would be refused.
    pub fn can_delete_users(&self) -> bool {
        self.users.len() > 1
    }

    pub fn storage(&self) -> &S {
        self.persistence.storage()
    }

    pub fn storage_mut(&mut self) -> &mut S {
        self.persistence.storage_mut()
    }

    pub fn into_storage(self) -> S {
        self.persistence.into_inner()
    }

    fn has_user(&self, id: &UserId) -> bool {
        self.users.iter().any(|user| &user.id == id)
    }

    fn persist(&mut self, sections: &[Section]) -> Result<(), StorageError> {
        let mut batch = WriteBatch::new();
        for section in sections {
            match section {
                Section::Users => batch.put_json(&self.keys.users, &self.users)?,
                Section::Tasks => batch.put_json(
                    &self.keys.tasks,
                    &task_records(&self.tasks, &self.detached_tasks),
                )?,
                Section::CurrentUser => {
                    batch.put_raw(&self.keys.current_user, self.current_user_id.as_str())
                }
            }
        }

        let written = self.persistence.save_batch(&batch);
        if let Err(err) = &written {
            let names: Vec<&str> = sections.iter().map(|section| section.as_str()).collect();
            warn!(
                "event=board_persist module=task_board status=error sections={} error={err}",
                names.join(",")
            );
        }
        written
    }
}

/// Loads a JSON collection, treating undecodable data as absent.
fn load_collection<S, T>(
    persistence: &PersistenceAdapter<S>,
    key: &str,
) -> StoreResult<Option<Vec<T>>>
where
    S: KeyValueStorage,
    T: serde::de::DeserializeOwned,
{
    match persistence.load::<Vec<T>>(key) {
        Ok(value) => Ok(value),
        Err(LoadError::Corrupted { key, source }) => {
            warn!(
                "event=board_init module=task_board status=repair error_code=corrupted_entry key={key} error={source}"
            );
            Ok(None)
        }
        Err(LoadError::Storage(err)) => Err(StoreError::Storage(err)),
    }
}

/// Accepts both the plain id form and a JSON-quoted string.
fn parse_current_user(raw: &str) -> UserId {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') {
        if let Ok(id) = serde_json::from_str::<String>(trimmed) {
            return UserId::from(id);
        }
    }
    UserId::from(trimmed)
}

/// Task collection as written to storage: board tasks, then held-back ones.
fn task_records<'a>(tasks: &'a [Task], detached: &'a [Task]) -> Vec<&'a Task> {
    tasks.iter().chain(detached).collect()
}

/// Keeps the first entry per id and returns how many were dropped.
fn drop_repeated_ids<T, K>(items: &mut Vec<T>, id_of: impl Fn(&T) -> &K) -> usize
where
    K: Eq + Hash + Clone,
{
    let before = items.len();
    let mut seen = HashSet::new();
    items.retain(|item| seen.insert(id_of(item).clone()));
    before - items.len()
}

fn first_user_id(users: &[User]) -> StoreResult<UserId> {
    users
        .first()
        .map(|user| user.id.clone())
        .ok_or(StoreError::InconsistentState("user collection is empty"))
}
