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
use crate::domain::catalog::{CreateSubCategory, SubCategory, UpdateSubCategory};
use crate::domain::user::Role;
use crate::error::Result;
use crate::services::factory;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_subcategories).post(create_subcategory))
        .route(
            "/:id",
            get(get_subcategory)
                .put(update_subcategory)
                .delete(delete_subcategory),
        )
}

async fn list_subcategories(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse> {
    let response = factory::get_all::<SubCategory>(&state, params, vec![]).await?;
    Ok(Json(response))
}

async fn get_subcategory(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let subcategory = factory::get_one::<SubCategory>(&state, id).await?;
    Ok(Json(json!({"data": subcategory})))
}

async fn create_subcategory(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateSubCategory>,
) -> Result<impl IntoResponse> {
    require_role(&user, &[Role::Admin, Role::Manager])?;
    let subcategory = factory::create_one::<SubCategory>(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(json!({"data": subcategory}))))
}

async fn update_subcategory(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSubCategory>,
) -> Result<impl IntoResponse> {
    require_role(&user, &[Role::Admin, Role::Manager])?;
    let subcategory = factory::update_one::<SubCategory>(&state, id, payload).await?;
    Ok((StatusCode::CREATED, Json(json!({"data": subcategory}))))
}

async fn delete_subcategory(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    require_role(&user, &[Role::Admin])?;
    factory::delete_one::<SubCategory>(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
