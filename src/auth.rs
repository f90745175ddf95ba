//! Bearer-token authentication and role checks.
//!
//! Password hashing and signed tokens are delegated to argon2 and
//! jsonwebtoken; this module wires them to the user store and exposes the
//! `CurrentUser` extractor that protected routes take as an argument.

use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::domain::user::{Role, User};
use crate::error::{ApiError, Result};
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
}

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

pub fn sign_token(config: &Config, user_id: Uuid) -> Result<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        iat: now.timestamp(),
        exp: (now + Duration::days(config.jwt_expires_in_days)).timestamp(),
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))
}

pub fn verify_token(config: &Config, token: &str) -> Result<Claims> {
    jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::Unauthorized("Invalid or expired token, please login again".into()))
}

/// The authenticated principal behind the request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                ApiError::Unauthorized("Please login to access this resource".into())
            })?;
        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError::Unauthorized("Please login to access this resource".into())
        })?;

        let claims = verify_token(&state.config, token)?;

        let user = state
            .users
            .get(claims.sub)
            .await
            .ok_or_else(|| ApiError::Unauthorized("This user no longer exists".into()))?;

        if !user.active {
            return Err(ApiError::Unauthorized("This account is deactivated".into()));
        }

        // Tokens issued before the last password change are stale.
        if let Some(changed_at) = user.password_changed_at {
            if changed_at.timestamp() > claims.iat {
                return Err(ApiError::Unauthorized(
                    "Password changed recently, please login again".into(),
                ));
            }
        }

        Ok(CurrentUser(user))
    }
}

/// Role gate used by privileged handlers.
pub fn require_role(user: &User, allowed: &[Role]) -> Result<()> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "You are not allowed to access this resource".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("secret123").unwrap();
        assert!(verify_password("secret123", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn test_token_roundtrip() {
        let config = Config::default();
        let user_id = Uuid::new_v4();
        let token = sign_token(&config, user_id).unwrap();
        let claims = verify_token(&config, &token).unwrap();
        assert_eq!(claims.sub, user_id);
    }

    #[test]
    fn test_token_wrong_secret_rejected() {
        let config = Config::default();
        let token = sign_token(&config, Uuid::new_v4()).unwrap();
        let other = Config {
            jwt_secret: "other-secret".into(),
            ..Config::default()
        };
        assert!(verify_token(&other, &token).is_err());
    }

    #[test]
    fn test_require_role() {
        let user = User::new("Ann", "ann@example.com", "h".into(), Role::User);
        assert!(require_role(&user, &[Role::User]).is_ok());
        assert!(require_role(&user, &[Role::Admin, Role::Manager]).is_err());
    }
}
