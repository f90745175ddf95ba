//! User administration plus the logged-user "me" surface.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, put};
use axum::{Json, Router};
use serde_json::json;
use uuid::Uuid;

use crate::auth::{require_role, CurrentUser};
use crate::domain::user::{CreateUser, Role, UpdateUser, User};
use crate::error::Result;
use crate::services::factory;
use crate::services::user::{self as user_service, ChangePassword, UpdateMe};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/me", get(get_me))
        .route("/updateMe", put(update_me))
        .route("/changeMyPassword", put(change_my_password))
        .route("/deleteMe", delete(delete_me))
        .route("/changePassword/:id", put(change_user_password))
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
}

async fn get_me(CurrentUser(user): CurrentUser) -> Result<impl IntoResponse> {
    Ok(Json(json!({"data": user})))
}

async fn update_me(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<UpdateMe>,
) -> Result<impl IntoResponse> {
    let user = user_service::update_me(&state, user.id, payload).await?;
    Ok(Json(json!({"data": user})))
}

async fn change_my_password(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<ChangePassword>,
) -> Result<impl IntoResponse> {
    let (user, token) = user_service::change_my_password(&state, user.id, payload).await?;
    Ok(Json(json!({"data": user, "token": token})))
}

async fn delete_me(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse> {
    user_service::deactivate_me(&state, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn change_user_password(
    State(state): State<Arc<AppState>>,
    CurrentUser(admin): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChangePassword>,
) -> Result<impl IntoResponse> {
    require_role(&admin, &[Role::Admin])?;
    let user = user_service::change_user_password(&state, id, payload).await?;
    Ok(Json(json!({"data": user})))
}

async fn list_users(
    State(state): State<Arc<AppState>>,
    CurrentUser(admin): CurrentUser,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse> {
    require_role(&admin, &[Role::Admin])?;
    let response = factory::get_all::<User>(&state, params, vec![]).await?;
    Ok(Json(response))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    CurrentUser(admin): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    require_role(&admin, &[Role::Admin])?;
    let user = factory::get_one::<User>(&state, id).await?;
    Ok(Json(json!({"data": user})))
}

async fn create_user(
    State(state): State<Arc<AppState>>,
    CurrentUser(admin): CurrentUser,
    Json(payload): Json<CreateUser>,
) -> Result<impl IntoResponse> {
    require_role(&admin, &[Role::Admin])?;
    let user = factory::create_one::<User>(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(json!({"data": user}))))
}

async fn update_user(
    State(state): State<Arc<AppState>>,
    CurrentUser(admin): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUser>,
) -> Result<impl IntoResponse> {
    require_role(&admin, &[Role::Admin])?;
    let user = factory::update_one::<User>(&state, id, payload).await?;
    Ok((StatusCode::CREATED, Json(json!({"data": user}))))
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    CurrentUser(admin): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    require_role(&admin, &[Role::Admin])?;
    factory::delete_one::<User>(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
