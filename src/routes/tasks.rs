use crate::{
    auth::{AuthUser, OwnedTask},
    error::AppError,
    models::{CreateTaskRequest, NewTask, UpdateTaskRequest},
    response,
    state::AppState,
    storage::StoreError,
};
use actix_web::{delete, get, patch, post, web, Responder};
use validator::Validate;

/// Retrieves every task owned by the authenticated user.
///
/// ## Responses:
/// - `200 OK`: JSON array of tasks, possibly empty.
/// - `401 Unauthorized`: missing or invalid token.
/// - `500 Internal Server Error`: store failure.
#[get("")]
pub async fn list_tasks(
    state: web::Data<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl Responder, AppError> {
    let tasks = state
        .storage
        .tasks
        .list_tasks(user.id)
        .await
        .map_err(|err| AppError::internal("failed to get tasks", err))?;

    Ok(response::ok(tasks))
}

/// Creates a new task for the authenticated user.
///
/// ## Request Body:
/// - `title`: required, non-empty.
/// - `body`: required, non-empty.
///
/// ## Responses:
/// - `201 Created`: the new task, `completed` is `false`.
/// - `400 Bad Request`: undecodable body or validation failure.
/// - `401 Unauthorized`: missing or invalid token.
/// - `500 Internal Server Error`: store failure.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    AuthUser(user): AuthUser,
    task_data: web::Json<CreateTaskRequest>,
) -> Result<impl Responder, AppError> {
    let task_data = task_data.into_inner();
    task_data.validate()?;

    let task = state
        .storage
        .tasks
        .create_task(NewTask::new(task_data, user.id))
        .await
        .map_err(|err| AppError::internal("failed to create task", err))?;

    Ok(response::created(task))
}

/// Retrieves a task owned by the authenticated user.
///
/// Ownership has already been checked by `TaskOwnership`; another user's task is a 404.
#[get("")]
pub async fn get_task(OwnedTask(task): OwnedTask) -> impl Responder {
    response::ok(task)
}

/// Partially updates a task owned by the authenticated user.
///
/// ## Request Body:
/// Any of `title`, `body`, `completed`. Empty strings leave a field unchanged, and so
/// does a `completed` equal to the stored value. When nothing would change, the task is
/// returned as is without touching the store.
///
/// ## Responses:
/// - `200 OK`: the task after the update.
/// - `400 Bad Request`: undecodable body or bad task id.
/// - `401 Unauthorized`: missing or invalid token.
/// - `404 Not Found`: no such task for this user.
/// - `500 Internal Server Error`: store failure.
#[patch("")]
pub async fn update_task(
    state: web::Data<AppState>,
    OwnedTask(task): OwnedTask,
    task_data: web::Json<UpdateTaskRequest>,
) -> Result<impl Responder, AppError> {
    let changes = task_data.into_inner().changes_for(&task);
    if changes.is_empty() {
        return Ok(response::ok(task));
    }

    let updated = state
        .storage
        .tasks
        .update_task(task.id, changes)
        .await
        .map_err(|err| match err {
            StoreError::NotFound => AppError::NotFound("Task not found".into()),
            other => AppError::internal("failed to update task", other),
        })?;

    Ok(response::ok(updated))
}

/// Deletes a task owned by the authenticated user.
///
/// ## Responses:
/// - `204 No Content`: on successful deletion.
/// - `401 Unauthorized`: missing or invalid token.
/// - `404 Not Found`: no such task for this user.
/// - `500 Internal Server Error`: store failure.
#[delete("")]
pub async fn delete_task(
    state: web::Data<AppState>,
    OwnedTask(task): OwnedTask,
) -> Result<impl Responder, AppError> {
    state
        .storage
        .tasks
        .delete_task(task.id)
        .await
        .map_err(|err| match err {
            StoreError::NotFound => AppError::NotFound("Task not found".into()),
            other => AppError::internal("failed to delete task", other),
        })?;

    Ok(response::no_content())
}
