//! Signup and login.

use serde::Deserialize;
use validator::Validate;

use crate::auth::{hash_password, sign_token, verify_password};
use crate::domain::user::{Role, User};
use crate::error::{ApiError, Result};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[validate(length(min = 2, max = 50, message = "name must be 2-50 characters"))]
    pub name: String,
    #[validate(email(message = "invalid e-mail address"))]
    pub email: String,
    #[validate(length(min = 6, message = "password too short"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email(message = "invalid e-mail address"))]
    pub email: String,
    pub password: String,
}

pub async fn signup(state: &AppState, payload: SignupRequest) -> Result<(User, String)> {
    payload.validate()?;

    let email = payload.email.to_lowercase();
    if state.users.find(|u| u.email == email).await.is_some() {
        return Err(ApiError::BadRequest("E-mail already in use".into()));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = User::new(&payload.name, &email, password_hash, Role::User);
    let user = state.users.insert(user).await;
    let token = sign_token(&state.config, user.id)?;
    Ok((user, token))
}

pub async fn login(state: &AppState, payload: LoginRequest) -> Result<(User, String)> {
    payload.validate()?;

    let email = payload.email.to_lowercase();
    let user = state
        .users
        .find(|u| u.email == email)
        .await
        .ok_or_else(|| ApiError::Unauthorized("Email or Password Incorrect".into()))?;

    if !verify_password(&payload.password, &user.password_hash) {
        return Err(ApiError::Unauthorized("Email or Password Incorrect".into()));
    }

    let token = sign_token(&state.config, user.id)?;
    Ok((user, token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn test_signup_then_login() {
        let state = AppState::new(Config::default(), Default::default());
        let (user, token) = signup(
            &state,
            SignupRequest {
                name: "Ann Example".into(),
                email: "Ann@Example.com".into(),
                password: "secret123".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(user.email, "ann@example.com");
        assert_eq!(user.role, Role::User);
        assert!(!token.is_empty());

        let (logged_in, _) = login(
            &state,
            LoginRequest {
                email: "ann@example.com".into(),
                password: "secret123".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let state = AppState::new(Config::default(), Default::default());
        let request = || SignupRequest {
            name: "Ann Example".into(),
            email: "ann@example.com".into(),
            password: "secret123".into(),
        };
        signup(&state, request()).await.unwrap();
        let err = signup(&state, request()).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let state = AppState::new(Config::default(), Default::default());
        signup(
            &state,
            SignupRequest {
                name: "Ann Example".into(),
                email: "ann@example.com".into(),
                password: "secret123".into(),
            },
        )
        .await
        .unwrap();

        let err = login(
            &state,
            LoginRequest {
                email: "ann@example.com".into(),
                password: "wrong-password".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }
}
