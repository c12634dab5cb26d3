//! Signed access tokens for wikidocs sessions.
//!
//! A token carries the user id and role so handlers can authorize without a
//! store lookup. Tokens are short-lived HS256 JWTs and there is no refresh
//! flow: an expired session logs in again.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wikidocs_core::types::DbId;

const SECRET_VAR: &str = "JWT_SECRET";
const EXPIRY_VAR: &str = "JWT_ACCESS_EXPIRY_MINS";
const DEFAULT_EXPIRY_MINS: i64 = 60;

/// Payload of a wikidocs access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Id of the user the token was issued to. This is the actor.
    pub sub: DbId,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
    /// Random per-token id, so two logins in the same second differ.
    pub jti: String,
}

/// Signing secret and session length.
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_mins: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("access_token_expiry_mins", &self.access_token_expiry_mins)
            .finish_non_exhaustive()
    }
}

impl JwtConfig {
    /// Read `JWT_SECRET` (required, non-empty) and `JWT_ACCESS_EXPIRY_MINS`
    /// (minutes, default 60).
    ///
    /// # Panics
    ///
    /// On a missing or empty secret, or an expiry that is not a positive
    /// integer. Called once at startup.
    pub fn from_env() -> Self {
        let secret = std::env::var(SECRET_VAR)
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| panic!("{SECRET_VAR} must be set to a non-empty value"));

        let access_token_expiry_mins = match std::env::var(EXPIRY_VAR) {
            Ok(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|mins| *mins > 0)
                .unwrap_or_else(|| panic!("{EXPIRY_VAR} must be a positive number of minutes")),
            Err(_) => DEFAULT_EXPIRY_MINS,
        };

        Self {
            secret,
            access_token_expiry_mins,
        }
    }

    /// Session length in seconds, as reported to clients on login.
    pub fn lifetime_secs(&self) -> i64 {
        self.access_token_expiry_mins * 60
    }
}

/// Issue a token for `user_id` acting with `role`.
pub fn generate_access_token(
    user_id: DbId,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let issued_at = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        exp: issued_at + config.lifetime_secs(),
        iat: issued_at,
        jti: Uuid::new_v4().to_string(),
    };
    let key = EncodingKey::from_secret(config.secret.as_bytes());
    encode(&Header::default(), &claims, &key)
}

/// Check the signature and expiry of a presented token.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let key = DecodingKey::from_secret(config.secret.as_bytes());
    Ok(decode::<Claims>(token, &key, &Validation::default())?.claims)
}
