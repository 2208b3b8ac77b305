use crate::{
    auth::{hash_password, sign_token, verify_password, AuthResponse, LoginRequest, RegisterRequest},
    error::AppError,
    response,
    state::AppState,
    storage::StoreError,
};
use actix_web::{post, web, Responder};
use validator::Validate;

/// Register a new user
///
/// Creates a new user account and returns an authentication token.
///
/// ## Responses:
/// - `201 Created`: `{ "token": ... }`.
/// - `400 Bad Request`: undecodable body, validation failure, or the username is taken.
/// - `500 Internal Server Error`: hashing, signing or store failure.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let register_data = register_data.into_inner();
    register_data.validate()?;

    let password_hash = hash_password(&register_data.password)?;

    let user = state
        .storage
        .users
        .create_user(&register_data.username, &password_hash)
        .await
        .map_err(|err| {
            if err.is_username_conflict() {
                AppError::Conflict("Username already exists".into())
            } else {
                AppError::internal("failed to create user", err)
            }
        })?;

    let token = sign_token(user.id, &state.jwt_secret)?;
    log::info!("registered user {} ({})", user.id, user.username);

    Ok(response::created(AuthResponse { token }))
}

/// Login user
///
/// Authenticates a user and returns an authentication token.
///
/// ## Responses:
/// - `200 OK`: `{ "token": ... }`.
/// - `400 Bad Request`: undecodable body or validation failure.
/// - `401 Unauthorized`: the password does not match.
/// - `404 Not Found`: no user with that username.
/// - `500 Internal Server Error`: store, hash or signing failure.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let login_data = login_data.into_inner();
    login_data.validate()?;

    // Unknown usernames answer 404 rather than 401, which tells a caller whether an
    // account exists.
    let user = match state
        .storage
        .users
        .get_user_by_username(&login_data.username)
        .await
    {
        Ok(user) => user,
        Err(StoreError::NotFound) => return Err(AppError::NotFound("User not found".into())),
        Err(err) => return Err(AppError::internal("failed to get user", err)),
    };

    if !verify_password(&login_data.password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Unauthorized".into()));
    }

    let token = sign_token(user.id, &state.jwt_secret)?;
    Ok(response::ok(AuthResponse { token }))
}
