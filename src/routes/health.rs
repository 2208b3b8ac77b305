use actix_web::{get, Responder};
use chrono::Utc;
use serde_json::json;

use crate::response;

/// Health check endpoint
///
/// Returns the current status of the API and timestamp.
#[get("/health")]
pub async fn health() -> impl Responder {
    response::ok(json!({
        "status": "ok",
        "timestamp": Utc::now()
    }))
}
