use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{StoreError, TaskStore, UserStore, TASK_OWNER_FK_CONSTRAINT, USERNAME_UNIQUE_CONSTRAINT};
use crate::models::{NewTask, Task, TaskChanges, User};

/// In-process implementation of both stores.
///
/// Enforces the same constraints as the SQL schema: unique usernames and tasks that
/// reference an existing user. Identifiers start at 1 and are never reused.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    tasks: BTreeMap<i64, Task>,
    last_user_id: i64,
    last_task_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        let mut tables = self.inner.write().await;
        if tables.users.values().any(|u| u.username == username) {
            return Err(StoreError::Constraint(USERNAME_UNIQUE_CONSTRAINT.to_string()));
        }

        tables.last_user_id += 1;
        let now = Utc::now();
        let user = User {
            id: tables.last_user_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: i64) -> Result<User, StoreError> {
        let tables = self.inner.read().await;
        tables.users.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<User, StoreError> {
        let tables = self.inner.read().await;
        tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn create_task(&self, task: NewTask) -> Result<Task, StoreError> {
        let mut tables = self.inner.write().await;
        if !tables.users.contains_key(&task.user_id) {
            return Err(StoreError::Constraint(TASK_OWNER_FK_CONSTRAINT.to_string()));
        }

        tables.last_task_id += 1;
        let now = Utc::now();
        let task = Task {
            id: tables.last_task_id,
            title: task.title,
            body: task.body,
            completed: false,
            user_id: task.user_id,
            created_at: now,
            updated_at: now,
        };
        tables.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn get_owned_task(&self, id: i64, user_id: i64) -> Result<Task, StoreError> {
        let tables = self.inner.read().await;
        tables
            .tasks
            .get(&id)
            .filter(|t| t.user_id == user_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list_tasks(&self, user_id: i64) -> Result<Vec<Task>, StoreError> {
        let tables = self.inner.read().await;
        Ok(tables
            .tasks
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_task(&self, id: i64, changes: TaskChanges) -> Result<Task, StoreError> {
        let mut tables = self.inner.write().await;
        let task = tables.tasks.get_mut(&id).ok_or(StoreError::NotFound)?;
        task.apply(changes);
        Ok(task.clone())
    }

    async fn delete_task(&self, id: i64) -> Result<(), StoreError> {
        let mut tables = self.inner.write().await;
        tables.tasks.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }
}
