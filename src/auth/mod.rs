pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

// Re-export necessary items
pub use extractors::{AuthUser, OwnedTask};
pub use middleware::{Authenticate, TaskOwnership};
pub use password::{hash_password, verify_password};
pub use token::{sign_token, verify_token, Claims};

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    /// Desired username for the new account. Must be unique.
    #[serde(default)]
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    /// Password for the new account.
    /// Must be at least 8 characters long.
    #[serde(default)]
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

/// Response structure after successful authentication (login or registration).
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The JWT (JSON Web Token) to send as `Authorization: Bearer <token>`.
    pub token: String,
}
