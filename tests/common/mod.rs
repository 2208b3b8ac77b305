#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::middleware::{Logger, NormalizePath};
use actix_web::{test, web, App};
use async_trait::async_trait;
use serde_json::{json, Value};

use taskmaster::models::{NewTask, Task, TaskChanges, User};
use taskmaster::routes;
use taskmaster::storage::{MemoryStore, Storage, StoreError, TaskStore, UserStore};
use taskmaster::AppState;

pub const JWT_SECRET: &str = "integration-test-secret";

pub fn test_state() -> AppState {
    AppState::new(Storage::memory(), JWT_SECRET)
}

/// Builds the full application around `state`, the same way `main` does.
pub async fn spawn_app(
    state: AppState,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    let _ = env_logger::builder().is_test(true).try_init();

    test::init_service(
        App::new()
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .app_data(web::Data::new(state))
            .configure(routes::config)
            .default_service(web::to(routes::not_found)),
    )
    .await
}

/// Sends `req` and returns the status with the decoded body (`Null` when empty).
pub async fn send<S, B>(app: &S, req: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| {
            panic!("non-JSON body: {:?}", String::from_utf8_lossy(&body))
        })
    };
    (status, json)
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

/// Registers `username` and returns its token.
pub async fn register<S, B>(app: &S, username: &str, password: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "registration failed: {}", body);
    body["data"]["token"]
        .as_str()
        .expect("token in register response")
        .to_string()
}

/// Logs `username` in and returns its token.
pub async fn login<S, B>(app: &S, username: &str, password: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["data"]["token"]
        .as_str()
        .expect("token in login response")
        .to_string()
}

/// Creates a task as the holder of `token` and returns the task JSON.
pub async fn create_task<S, B>(app: &S, token: &str, title: &str, body: &str) -> Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/tasks")
        .insert_header(bearer(token))
        .set_json(json!({ "title": title, "body": body }))
        .to_request();
    let (status, response) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "task creation failed: {}", response);
    response["data"].clone()
}

/// Memory store that counts every call it receives, and writes separately.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    pub calls: AtomicUsize,
    pub writes: AtomicUsize,
}

impl CountingStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn read(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn write(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserStore for CountingStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        self.write();
        self.inner.create_user(username, password_hash).await
    }

    async fn get_user(&self, id: i64) -> Result<User, StoreError> {
        self.read();
        self.inner.get_user(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<User, StoreError> {
        self.read();
        self.inner.get_user_by_username(username).await
    }
}

#[async_trait]
impl TaskStore for CountingStore {
    async fn create_task(&self, task: NewTask) -> Result<Task, StoreError> {
        self.write();
        self.inner.create_task(task).await
    }

    async fn get_owned_task(&self, id: i64, user_id: i64) -> Result<Task, StoreError> {
        self.read();
        self.inner.get_owned_task(id, user_id).await
    }

    async fn list_tasks(&self, user_id: i64) -> Result<Vec<Task>, StoreError> {
        self.read();
        self.inner.list_tasks(user_id).await
    }

    async fn update_task(&self, id: i64, changes: TaskChanges) -> Result<Task, StoreError> {
        self.write();
        self.inner.update_task(id, changes).await
    }

    async fn delete_task(&self, id: i64) -> Result<(), StoreError> {
        self.write();
        self.inner.delete_task(id).await
    }
}

/// Application state over a [`CountingStore`], returned alongside for inspection.
pub fn counting_state() -> (AppState, Arc<CountingStore>) {
    let store = Arc::new(CountingStore::default());
    let storage = Storage::new(store.clone(), store.clone());
    (AppState::new(storage, JWT_SECRET), store)
}

/// Store whose every call fails as if the database pool were exhausted.
pub struct BrokenStore;

fn pool_timed_out() -> StoreError {
    StoreError::Database(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl UserStore for BrokenStore {
    async fn create_user(&self, _username: &str, _password_hash: &str) -> Result<User, StoreError> {
        Err(pool_timed_out())
    }

    async fn get_user(&self, _id: i64) -> Result<User, StoreError> {
        Err(pool_timed_out())
    }

    async fn get_user_by_username(&self, _username: &str) -> Result<User, StoreError> {
        Err(pool_timed_out())
    }
}

#[async_trait]
impl TaskStore for BrokenStore {
    async fn create_task(&self, _task: NewTask) -> Result<Task, StoreError> {
        Err(pool_timed_out())
    }

    async fn get_owned_task(&self, _id: i64, _user_id: i64) -> Result<Task, StoreError> {
        Err(pool_timed_out())
    }

    async fn list_tasks(&self, _user_id: i64) -> Result<Vec<Task>, StoreError> {
        Err(pool_timed_out())
    }

    async fn update_task(&self, _id: i64, _changes: TaskChanges) -> Result<Task, StoreError> {
        Err(pool_timed_out())
    }

    async fn delete_task(&self, _id: i64) -> Result<(), StoreError> {
        Err(pool_timed_out())
    }
}

/// Working users over a task store that always fails.
pub fn broken_tasks_state() -> AppState {
    let storage = Storage::new(Arc::new(MemoryStore::new()), Arc::new(BrokenStore));
    AppState::new(storage, JWT_SECRET)
}

/// A user store that always fails, with working tasks.
pub fn broken_users_state() -> AppState {
    let storage = Storage::new(Arc::new(BrokenStore), Arc::new(MemoryStore::new()));
    AppState::new(storage, JWT_SECRET)
}

/// Asserts the generic 500 envelope, with no store detail leaking into it.
pub fn assert_internal_error(status: StatusCode, body: &Value) {
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{}", body);
    assert_eq!(
        body,
        &json!({ "success": false, "status": 500, "message": "Internal Server Error" })
    );
    assert!(!body.to_string().contains("pool timed out"));
}
