pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;

use actix_web::{http::StatusCode, web, HttpResponse};

use crate::auth::{Authenticate, TaskOwnership};
use crate::error::AppError;
use crate::response;

/// Registers every route of the API.
///
/// The default service is not part of this config; apps mount [`not_found`] themselves
/// with `App::default_service`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(health::health)
        .service(auth::register)
        .service(auth::login)
        .service(
            web::scope("/user")
                .wrap(Authenticate)
                .service(users::get_user),
        )
        .service(
            web::scope("/tasks")
                .wrap(Authenticate)
                .service(tasks::list_tasks)
                .service(tasks::create_task)
                .service(
                    web::scope("/{id}")
                        .wrap(TaskOwnership)
                        .service(tasks::get_task)
                        .service(tasks::update_task)
                        .service(tasks::delete_task),
                ),
        );
}

/// Rejects undecodable JSON bodies with the enveloped `400 Bad Request`.
///
/// A body sent without any `Content-Type` is still decoded as JSON.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .content_type_required(false)
        .error_handler(|err, _req| {
            log::debug!("rejected request body: {}", err);
            AppError::BadRequest("Bad Request".into()).into()
        })
}

/// Fallback for unmatched routes.
pub async fn not_found() -> HttpResponse {
    response::respond::<()>(StatusCode::NOT_FOUND, None, Some("Not Found"))
}
