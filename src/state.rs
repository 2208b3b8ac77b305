use actix_web::web;

use crate::error::AppError;
use crate::storage::Storage;

/// Shared, read-only state handed to every request through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub storage: Storage,
    pub jwt_secret: String,
}

impl AppState {
    pub fn new(storage: Storage, jwt_secret: impl Into<String>) -> Self {
        Self {
            storage,
            jwt_secret: jwt_secret.into(),
        }
    }

    /// Fetches the registered state from a request's app data.
    pub fn from_app_data(data: Option<&web::Data<AppState>>) -> Result<web::Data<AppState>, AppError> {
        data.cloned().ok_or_else(|| {
            AppError::internal("application state unavailable", "AppState was not registered")
        })
    }
}
