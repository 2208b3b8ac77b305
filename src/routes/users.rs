use actix_web::{get, HttpResponse};

use crate::{auth::AuthUser, response};

/// Returns the authenticated user.
#[get("")]
pub async fn get_user(AuthUser(user): AuthUser) -> HttpResponse {
    response::ok(user)
}
