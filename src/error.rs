//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every failure a handler or middleware can hit ends up as one of its variants, and
//! `AppError` implements `actix_web::error::ResponseError` so that it is rendered into the
//! uniform `{success, status, data?, message?}` envelope (see [`crate::response`]).
//!
//! `From` implementations exist for `validator::ValidationErrors`, `jsonwebtoken::errors::Error`,
//! `bcrypt::BcryptError` and [`StoreError`], allowing for easy conversion using the `?` operator.
//! Internal failures keep their detail for the log only; clients always see a generic message.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::ValidationErrors;

use crate::response;
use crate::storage::StoreError;

/// Message returned to clients for every 500 response.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

/// Validation failures for a single request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors {
    /// Name of the offending field as it appears in the JSON payload.
    pub field: String,
    /// Human readable messages, one per failed rule.
    pub errors: Vec<String>,
}

/// Represents all possible errors that can occur within the application.
///
/// Each variant maps to exactly one HTTP status code.
#[derive(Debug)]
pub enum AppError {
    /// Missing, malformed, expired or otherwise unacceptable credentials (HTTP 401).
    Unauthorized(String),
    /// A malformed request: undecodable body, bad path parameter (HTTP 400).
    BadRequest(String),
    /// The requested resource does not exist, or is not visible to the caller (HTTP 404).
    NotFound(String),
    /// A write rejected by a uniqueness constraint (HTTP 400).
    Conflict(String),
    /// Declarative field validation failed (HTTP 400 with a per-field error list).
    Validation(Vec<FieldErrors>),
    /// An unexpected server-side failure (HTTP 500).
    /// The payload is logged, never sent to the client.
    InternalServerError(String),
}

impl AppError {
    /// Wraps an unexpected failure, prefixing it with what the server was doing at the time.
    pub fn internal(context: &str, error: impl fmt::Display) -> Self {
        AppError::InternalServerError(format!("{}: {}", context, error))
    }

    /// The message placed in the response envelope.
    fn public_message(&self) -> &str {
        match self {
            AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => msg,
            AppError::Validation(_) => "Validation failed",
            AppError::InternalServerError(_) => INTERNAL_ERROR_MESSAGE,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Validation(fields) => {
                let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
                write!(f, "Validation Error: {}", names.join(", "))
            }
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts `AppError` variants into enveloped `HttpResponse` objects.
///
/// This is also the single place where request failures are logged: server errors at
/// `error` with their full detail, client errors at `debug`.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) | AppError::Conflict(_) | AppError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{}", self);
        } else {
            log::debug!("{}", self);
        }

        match self {
            AppError::Validation(fields) => {
                response::respond(status, Some(fields), Some(self.public_message()))
            }
            _ => response::respond::<()>(status, None, Some(self.public_message())),
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::Validation`.
///
/// Fields are sorted by name so the error list is stable across runs.
impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> AppError {
        let mut fields: Vec<FieldErrors> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| FieldErrors {
                field: field.to_string(),
                errors: errs
                    .iter()
                    .map(|e| match &e.message {
                        Some(message) => message.to_string(),
                        None => e.code.to_string(),
                    })
                    .collect(),
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        AppError::Validation(fields)
    }
}

/// Converts `jsonwebtoken::errors::Error` into `AppError::Unauthorized`.
///
/// The reason a token was rejected is not disclosed to the caller.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        log::debug!("token rejected: {}", error);
        AppError::Unauthorized("Unauthorized".into())
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::InternalServerError`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::internal("password hashing failed", error)
    }
}

/// Generic mapping for store failures.
///
/// Handlers that can give a more specific answer (a username conflict, a task that
/// vanished) match on [`StoreError`] themselves before falling back to this.
impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        match error {
            StoreError::NotFound => AppError::NotFound("Resource not found".into()),
            other => AppError::internal("store operation failed", other),
        }
    }
}
