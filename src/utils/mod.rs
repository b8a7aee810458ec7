use axum::Json;
use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{Config, DEFAULT_JWT_EXPIRATION_SECS};
use crate::result::ApiResponse;

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password.as_bytes(), DEFAULT_COST)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password.as_bytes(), hash)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn user_id(&self) -> Option<Uuid> {
        self.sub.parse().ok()
    }
}

/// Signs a session token for `user_id`. Returns the token and its expiry as
/// a unix timestamp.
pub fn generate_token(
    user_id: Uuid,
    config: &Config,
) -> Result<(String, i64), jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let expiration = i64::try_from(config.jwt_expiration().as_secs())
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or_else(|| {
            tracing::warn!(
                secs = config.jwt_expiration_secs,
                "token lifetime out of range, using the default"
            );
            now + Duration::seconds(DEFAULT_JWT_EXPIRATION_SECS as i64)
        })
        .timestamp();

    let claims = Claims {
        sub: user_id.to_string(),
        exp: expiration,
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )?;

    Ok((token, expiration))
}

pub fn verify_token(token: &str, config: &Config) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

pub fn success_to_api_response<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}

pub fn error_to_api_response<T>(code: i32, msg: String) -> Json<ApiResponse<T>> {
    Json(ApiResponse::error(code, msg))
}

pub mod error_codes {
    pub const VALIDATION_ERROR: i32 = 1000;
    pub const AUTH_FAILED: i32 = 1002;
    pub const PERMISSION_DENIED: i32 = 1003;
    pub const NOT_FOUND: i32 = 1004;
    pub const CONFLICT: i32 = 1006;
    pub const PAYMENT_FAILED: i32 = 1007;
    pub const INTERNAL_ERROR: i32 = 5000;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::from_lookup(|name| (name == "JWT_SECRET").then(|| "test-secret".to_string()))
            .unwrap()
    }

    #[test]
    fn token_round_trips_user_id() {
        let config = config();
        let id = Uuid::new_v4();
        let (token, exp) = generate_token(id, &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.user_id(), Some(id));
        assert_eq!(claims.exp, exp);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let config = config();
        let mut other = config.clone();
        other.jwt_secret = "another-secret".to_string();
        let (token, _) = generate_token(Uuid::new_v4(), &other).unwrap();
        assert!(verify_token(&token, &config).is_err());
    }

    #[test]
    fn oversized_lifetime_falls_back_to_default() {
        let mut config = config();
        config.jwt_expiration_secs = u64::MAX;
        let (token, exp) = generate_token(Uuid::new_v4(), &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.exp, exp);
        assert!(exp - claims.iat <= DEFAULT_JWT_EXPIRATION_SECS as i64 + 1);
    }

    #[test]
    fn password_hash_verifies_only_the_original() {
        let hashed = hash_password("hunter22").unwrap();
        assert!(verify_password("hunter22", &hashed).unwrap());
        assert!(!verify_password("hunter23", &hashed).unwrap());
    }
}
