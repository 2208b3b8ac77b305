//! The response envelope shared by every endpoint.
//!
//! Success and failure bodies alike look like
//! `{"success": bool, "status": u16, "data"?: any, "message"?: string}`.
//! `204 No Content` is the only response without a body.

use actix_web::{http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};

/// Uniform JSON wrapper for API responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// `true` for 1xx-3xx statuses, `false` for errors.
    pub success: bool,
    /// The HTTP status code, repeated in the body.
    pub status: u16,
    /// Payload of a successful response, or the field list of a validation failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human readable explanation, mostly for errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    pub fn new(status: StatusCode, data: Option<T>, message: Option<&str>) -> Self {
        Self {
            success: !(status.is_client_error() || status.is_server_error()),
            status: status.as_u16(),
            data,
            message: message.map(str::to_owned),
        }
    }
}

/// Builds a JSON response with the given status wrapped in an [`Envelope`].
pub fn respond<T: Serialize>(status: StatusCode, data: Option<T>, message: Option<&str>) -> HttpResponse {
    HttpResponse::build(status).json(Envelope::new(status, data, message))
}

/// `200 OK` carrying `data`.
pub fn ok<T: Serialize>(data: T) -> HttpResponse {
    respond(StatusCode::OK, Some(data), None)
}

/// `201 Created` carrying `data`.
pub fn created<T: Serialize>(data: T) -> HttpResponse {
    respond(StatusCode::CREATED, Some(data), None)
}

/// `204 No Content`, no body.
pub fn no_content() -> HttpResponse {
    HttpResponse::NoContent().finish()
}
