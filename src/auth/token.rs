use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Value of the `iss` claim on every token this service issues.
pub const TOKEN_ISSUER: &str = "taskmaster";
/// Value of the `sub` claim on every token this service issues.
pub const TOKEN_SUBJECT: &str = "user";
/// How long a token stays valid after issuance.
pub const TOKEN_LIFETIME_HOURS: i64 = 24;

/// The only algorithm accepted when signing or verifying.
const ALGORITHM: Algorithm = Algorithm::HS256;

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Identifier of the authenticated user.
    pub user_id: i64,
    /// Issuer, always [`TOKEN_ISSUER`].
    pub iss: String,
    /// Subject, always [`TOKEN_SUBJECT`].
    pub sub: String,
    /// Issued at (seconds since epoch).
    pub iat: i64,
    /// Not valid before (seconds since epoch).
    pub nbf: i64,
    /// Expiration (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    /// Claims for `user_id` issued right now.
    pub fn new(user_id: i64) -> Self {
        Self::issued_at(user_id, Utc::now())
    }

    /// Claims for `user_id` as if issued at `now`; valid from `now` for
    /// [`TOKEN_LIFETIME_HOURS`].
    pub fn issued_at(user_id: i64, now: DateTime<Utc>) -> Self {
        let expiration = now + Duration::hours(TOKEN_LIFETIME_HOURS);
        Self {
            user_id,
            iss: TOKEN_ISSUER.to_string(),
            sub: TOKEN_SUBJECT.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expiration.timestamp(),
        }
    }
}

/// Signs arbitrary claims with HS256.
pub fn encode_claims(claims: &Claims, secret: &str) -> Result<String, AppError> {
    encode(
        &Header::new(ALGORITHM),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::internal("failed to sign token", e))
}

/// Issues a 24 hour token for `user_id` signed with `secret`.
pub fn sign_token(user_id: i64, secret: &str) -> Result<String, AppError> {
    encode_claims(&Claims::new(user_id), secret)
}

/// Verifies a token and returns the user identifier it was issued for.
///
/// Rejects with `AppError::Unauthorized` anything malformed, signed with a different
/// secret or algorithm, expired, not yet valid, or carrying the wrong issuer/subject.
pub fn verify_token(token: &str, secret: &str) -> Result<i64, AppError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation(),
    )?;
    Ok(data.claims.user_id)
}

fn validation() -> Validation {
    // Validation::new pins the accepted algorithm list to exactly one entry
    let mut validation = Validation::new(ALGORITHM);
    validation.leeway = 0;
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.set_issuer(&[TOKEN_ISSUER]);
    validation.sub = Some(TOKEN_SUBJECT.to_string());
    validation.set_required_spec_claims(&["exp", "nbf", "iss", "sub"]);
    validation
}
