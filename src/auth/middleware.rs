//! The two request gates protecting user and task routes.
//!
//! [`Authenticate`] wraps every route group that needs a logged-in user. It turns the
//! bearer token into a [`User`] and stores it in the request extensions.
//!
//! [`TaskOwnership`] wraps `/tasks/{id}` inside an `Authenticate`d scope. It resolves the
//! path id to a [`Task`] owned by that user with a single compound lookup, so a task
//! belonging to someone else is indistinguishable from one that does not exist.
//!
//! Rejections are rendered in place as enveloped error responses; handlers behind the
//! gates pick up the resolved objects through the extractors in [`super::extractors`].

use std::rc::Rc;

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::token::verify_token;
use crate::error::AppError;
use crate::models::{Task, User};
use crate::state::AppState;
use crate::storage::StoreError;

/// Resolves `Authorization: Bearer <token>` to the owning [`User`].
pub struct Authenticate;

impl<S, B> Transform<S, ServiceRequest> for Authenticate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthenticateService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthenticateService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthenticateService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthenticateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let outcome = authenticate(&req).await;
            match outcome {
                Ok(user) => {
                    req.extensions_mut().insert(user);
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(err) => Ok(req.error_response(err).map_into_right_body()),
            }
        })
    }
}

/// Resolves the `{id}` path segment to a [`Task`] owned by the authenticated user.
///
/// Must be nested inside a scope wrapped by [`Authenticate`].
pub struct TaskOwnership;

impl<S, B> Transform<S, ServiceRequest> for TaskOwnership
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = TaskOwnershipService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TaskOwnershipService {
            service: Rc::new(service),
        }))
    }
}

pub struct TaskOwnershipService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for TaskOwnershipService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let outcome = resolve_owned_task(&req).await;
            match outcome {
                Ok(task) => {
                    req.extensions_mut().insert(task);
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(err) => Ok(req.error_response(err).map_into_right_body()),
            }
        })
    }
}

fn unauthorized() -> AppError {
    AppError::Unauthorized("Unauthorized".into())
}

/// Returns the token following `Bearer ` in the `Authorization` header, if any.
pub fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

async fn authenticate(req: &ServiceRequest) -> Result<User, AppError> {
    let token = bearer_token(req).ok_or_else(unauthorized)?;
    let state = AppState::from_app_data(req.app_data::<web::Data<AppState>>())?;
    let user_id = verify_token(token, &state.jwt_secret)?;

    match state.storage.users.get_user(user_id).await {
        Ok(user) => Ok(user),
        // the account behind a still-valid token is gone
        Err(StoreError::NotFound) => Err(unauthorized()),
        Err(err) => Err(AppError::internal("failed to load authenticated user", err)),
    }
}

/// Parses a task identifier from a path segment. Must be a non-negative integer.
pub fn parse_task_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id >= 0)
        .ok_or_else(|| AppError::BadRequest("Bad Request".into()))
}

async fn resolve_owned_task(req: &ServiceRequest) -> Result<Task, AppError> {
    let task_id = parse_task_id(req.match_info().get("id").unwrap_or_default())?;
    let user_id = req
        .extensions()
        .get::<User>()
        .map(|user| user.id)
        .ok_or_else(|| {
            AppError::internal("task ownership check failed", "no authenticated user on request")
        })?;
    let state = AppState::from_app_data(req.app_data::<web::Data<AppState>>())?;

    match state.storage.tasks.get_owned_task(task_id, user_id).await {
        Ok(task) => Ok(task),
        Err(StoreError::NotFound) => Err(AppError::NotFound("Task not found".into())),
        Err(err) => Err(AppError::internal("failed to load task", err)),
    }
}
