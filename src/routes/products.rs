//! Product endpoints, including the nested product-reviews route.

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
use crate::domain::product::{CreateProduct, Product, UpdateProduct};
use crate::domain::review::{CreateReview, Review};
use crate::domain::user::Role;
use crate::error::Result;
use crate::services::factory;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route(
            "/:id/reviews",
            get(list_product_reviews).post(create_product_review),
        )
}

async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse> {
    let response = factory::get_all::<Product>(&state, params, vec![]).await?;
    Ok(Json(response))
}

async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let product = factory::get_one::<Product>(&state, id).await?;
    Ok(Json(json!({"data": product})))
}

async fn create_product(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateProduct>,
) -> Result<impl IntoResponse> {
    require_role(&user, &[Role::Admin, Role::Manager])?;
    let product = factory::create_one::<Product>(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(json!({"data": product}))))
}

async fn update_product(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProduct>,
) -> Result<impl IntoResponse> {
    require_role(&user, &[Role::Admin, Role::Manager])?;
    let product = factory::update_one::<Product>(&state, id, payload).await?;
    Ok((StatusCode::CREATED, Json(json!({"data": product}))))
}

async fn delete_product(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    require_role(&user, &[Role::Admin])?;
    factory::delete_one::<Product>(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_product_reviews(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<Uuid>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse> {
    let base = vec![("product".to_string(), product_id.to_string())];
    let response = factory::get_all::<Review>(&state, params, base).await?;
    Ok(Json(response))
}

async fn create_product_review(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(product_id): Path<Uuid>,
    Json(mut payload): Json<CreateReview>,
) -> Result<impl IntoResponse> {
    require_role(&user, &[Role::User])?;
    payload.product = payload.product.or(Some(product_id));
    payload.user = Some(user.id);
    let review = factory::create_one::<Review>(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(json!({"data": review}))))
}
