#![doc = "The `taskmaster` library crate."]
#![doc = ""]
#![doc = "This crate contains the domain models, storage backends, authentication gates,"]
#![doc = "routing configuration and error handling for the Taskmaster API."]
#![doc = "It is used by the main binary (`main.rs`) to construct and run the application,"]
#![doc = "and by the integration tests to drive the same routes against an in-memory store."]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logger;
pub mod models;
pub mod response;
pub mod routes;
pub mod state;
pub mod storage;

pub use crate::error::AppError;
pub use crate::state::AppState;
