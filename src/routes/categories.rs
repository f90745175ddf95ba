//! Category endpoints, including the nested category-subcategories route.

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
use crate::domain::catalog::{
    Category, CreateCategory, CreateSubCategory, SubCategory, UpdateCategory,
};
use crate::domain::user::Role;
use crate::error::Result;
use crate::services::factory;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/:id",
            get(get_category)
                .put(update_category)
                .delete(delete_category),
        )
        .route(
            "/:id/subcategories",
            get(list_category_subcategories).post(create_category_subcategory),
        )
}

async fn list_categories(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse> {
    let response = factory::get_all::<Category>(&state, params, vec![]).await?;
    Ok(Json(response))
}

async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let category = factory::get_one::<Category>(&state, id).await?;
    Ok(Json(json!({"data": category})))
}

async fn create_category(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateCategory>,
) -> Result<impl IntoResponse> {
    require_role(&user, &[Role::Admin, Role::Manager])?;
    let category = factory::create_one::<Category>(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(json!({"data": category}))))
}

async fn update_category(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategory>,
) -> Result<impl IntoResponse> {
    require_role(&user, &[Role::Admin, Role::Manager])?;
    let category = factory::update_one::<Category>(&state, id, payload).await?;
    Ok((StatusCode::CREATED, Json(json!({"data": category}))))
}

async fn delete_category(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    require_role(&user, &[Role::Admin])?;
    factory::delete_one::<Category>(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_category_subcategories(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<Uuid>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse> {
    let base = vec![("category".to_string(), category_id.to_string())];
    let response = factory::get_all::<SubCategory>(&state, params, base).await?;
    Ok(Json(response))
}

async fn create_category_subcategory(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(category_id): Path<Uuid>,
    Json(mut payload): Json<CreateSubCategory>,
) -> Result<impl IntoResponse> {
    require_role(&user, &[Role::Admin, Role::Manager])?;
    payload.category = payload.category.or(Some(category_id));
    let subcategory = factory::create_one::<SubCategory>(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(json!({"data": subcategory}))))
}
