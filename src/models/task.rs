use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Task {
    /// Store-assigned identifier.
    pub id: i64,
    /// The title of the task.
    pub title: String,
    /// Free-form task content.
    pub body: String,
    /// Whether the task has been completed.
    pub completed: bool,
    /// Identifier of the owning user. Never serialized.
    #[serde(skip_serializing)]
    pub user_id: i64,
    /// Timestamp of when the task was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last update to the task.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Applies a change set in place and bumps `updated_at`.
    pub fn apply(&mut self, changes: TaskChanges) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(body) = changes.body {
            self.body = body;
        }
        if let Some(completed) = changes.completed {
            self.completed = completed;
        }
        self.updated_at = Utc::now();
    }
}

/// Payload for `POST /tasks`.
///
/// Missing fields decode as empty strings so that they are reported by validation
/// alongside any other field problems, not as a body decoding failure.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateTaskRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "body is required"))]
    pub body: String,
}

/// A validated task ready to be inserted for its owner.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub body: String,
    pub user_id: i64,
}

impl NewTask {
    pub fn new(request: CreateTaskRequest, user_id: i64) -> Self {
        Self {
            title: request.title,
            body: request.body,
            user_id,
        }
    }
}

/// Payload for `PATCH /tasks/{id}`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub completed: Option<bool>,
}

impl UpdateTaskRequest {
    /// Works out which columns actually need writing for `current`.
    ///
    /// An empty `title` or `body` counts as not supplied. `completed` is kept only when
    /// it differs from the stored value.
    pub fn changes_for(self, current: &Task) -> TaskChanges {
        TaskChanges {
            title: self.title.filter(|title| !title.is_empty()),
            body: self.body.filter(|body| !body.is_empty()),
            completed: self.completed.filter(|completed| *completed != current.completed),
        }
    }
}

/// The set of columns an update will write. `None` leaves a column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub body: Option<String>,
    pub completed: Option<bool>,
}

impl TaskChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none() && self.completed.is_none()
    }
}
