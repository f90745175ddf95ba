use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use uuid::Uuid;

use crate::auth::{require_role, CurrentUser};
use crate::domain::catalog::{Brand, CreateBrand, UpdateBrand};
use crate::domain::user::Role;
use crate::error::Result;
use crate::services::factory;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_brands).post(create_brand))
        .route(
            "/:id",
            get(get_brand).put(update_brand).delete(delete_brand),
        )
}

async fn list_brands(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse> {
    let response = factory::get_all::<Brand>(&state, params, vec![]).await?;
    Ok(Json(response))
}

async fn get_brand(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let brand = factory::get_one::<Brand>(&state, id).await?;
    Ok(Json(json!({"data": brand})))
}

async fn create_brand(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateBrand>,
) -> Result<impl IntoResponse> {
    require_role(&user, &[Role::Admin, Role::Manager])?;
    let brand = factory::create_one::<Brand>(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(json!({"data": brand}))))
}

async fn update_brand(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBrand>,
) -> Result<impl IntoResponse> {
    require_role(&user, &[Role::Admin, Role::Manager])?;
    let brand = factory::update_one::<Brand>(&state, id, payload).await?;
    Ok((StatusCode::CREATED, Json(json!({"data": brand}))))
}

async fn delete_brand(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    require_role(&user, &[Role::Admin])?;
    factory::delete_one::<Brand>(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
