use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;
use crate::models::{Task, User};

/// The user resolved by `Authenticate`, handed to the handler as a parameter.
///
/// Only usable on routes wrapped by `Authenticate`. Elsewhere extraction fails with a 500,
/// since that is a routing mistake rather than a client error.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl FromRequest for AuthUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user = req.extensions().get::<User>().cloned();
        ready(user.map(AuthUser).ok_or_else(|| {
            AppError::internal(
                "authenticated user missing from request",
                "route is not wrapped by Authenticate",
            )
            .into()
        }))
    }
}

/// The task resolved by `TaskOwnership`; already known to belong to the caller.
#[derive(Debug, Clone)]
pub struct OwnedTask(pub Task);

impl FromRequest for OwnedTask {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let task = req.extensions().get::<Task>().cloned();
        ready(task.map(OwnedTask).ok_or_else(|| {
            AppError::internal(
                "owned task missing from request",
                "route is not wrapped by TaskOwnership",
            )
            .into()
        }))
    }
}
