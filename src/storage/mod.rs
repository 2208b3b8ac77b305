//! Data access for users and tasks.
//!
//! Handlers and middleware only ever see the [`UserStore`] and [`TaskStore`] traits, bundled
//! together in [`Storage`]. Two backends implement them: [`PgStore`] over a PostgreSQL pool,
//! and [`MemoryStore`] which keeps everything in process and backs the test suite.
//!
//! Each trait method is a single atomic statement against the store.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::{NewTask, Task, TaskChanges, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Unique constraint on `users.username`.
pub const USERNAME_UNIQUE_CONSTRAINT: &str = "uni_users_username";
/// Foreign key from `tasks.user_id` to `users.id`.
pub const TASK_OWNER_FK_CONSTRAINT: &str = "fk_tasks_user_id";

/// Failures surfaced by a store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No row matched the lookup.
    #[error("record not found")]
    NotFound,

    /// A unique or foreign key constraint rejected the write. Carries the constraint name.
    #[error("constraint violated: {0}")]
    Constraint(String),

    /// Anything else the database driver reported.
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl StoreError {
    /// Whether this is the username uniqueness violation raised on registration.
    pub fn is_username_conflict(&self) -> bool {
        matches!(self, StoreError::Constraint(name) if name == USERNAME_UNIQUE_CONSTRAINT)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(ref db_err)
                if db_err.is_unique_violation() || db_err.is_foreign_key_violation() =>
            {
                StoreError::Constraint(db_err.constraint().unwrap_or_default().to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

/// Persistence operations on users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new user. A taken username fails with
    /// `StoreError::Constraint(USERNAME_UNIQUE_CONSTRAINT)`.
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, StoreError>;

    /// Looks a user up by identifier.
    async fn get_user(&self, id: i64) -> Result<User, StoreError>;

    /// Looks a user up by username.
    async fn get_user_by_username(&self, username: &str) -> Result<User, StoreError>;
}

/// Persistence operations on tasks.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Inserts a task for `task.user_id`, which must reference an existing user.
    async fn create_task(&self, task: NewTask) -> Result<Task, StoreError>;

    /// Fetches task `id` only if it belongs to `user_id`. A task owned by someone else is
    /// reported exactly like a missing one.
    async fn get_owned_task(&self, id: i64, user_id: i64) -> Result<Task, StoreError>;

    /// Every task owned by `user_id`, oldest first.
    async fn list_tasks(&self, user_id: i64) -> Result<Vec<Task>, StoreError>;

    /// Writes `changes` to task `id` and returns the updated row.
    async fn update_task(&self, id: i64, changes: TaskChanges) -> Result<Task, StoreError>;

    /// Removes task `id`.
    async fn delete_task(&self, id: i64) -> Result<(), StoreError>;
}

/// The pair of stores shared by all request handlers.
#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn UserStore>,
    pub tasks: Arc<dyn TaskStore>,
}

impl Storage {
    pub fn new(users: Arc<dyn UserStore>, tasks: Arc<dyn TaskStore>) -> Self {
        Self { users, tasks }
    }

    /// Both stores backed by one PostgreSQL pool.
    pub fn postgres(pool: PgPool) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self {
            users: store.clone(),
            tasks: store,
        }
    }

    /// Both stores backed by one fresh in-process store.
    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            users: store.clone(),
            tasks: store,
        }
    }
}
