//! Signup and login endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;

use crate::error::Result;
use crate::services::auth::{self, LoginRequest, SignupRequest};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
}

async fn signup(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse> {
    let (user, token) = auth::signup(&state, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({"data": user, "token": token})),
    ))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let (user, token) = auth::login(&state, payload).await?;
    Ok(Json(json!({"data": user, "token": token})))
}
