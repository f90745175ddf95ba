//! Logged-user wishlist endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{require_role, CurrentUser};
use crate::domain::user::Role;
use crate::error::Result;
use crate::services::user as user_service;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_wishlist).post(add_to_wishlist))
        .route("/:productId", delete(remove_from_wishlist))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistRequest {
    pub product_id: Uuid,
}

async fn add_to_wishlist(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<WishlistRequest>,
) -> Result<impl IntoResponse> {
    require_role(&user, &[Role::User])?;
    let wishlist = user_service::add_to_wishlist(&state, user.id, payload.product_id).await?;
    Ok(Json(json!({
        "status": "Success",
        "message": "Product added successfully to your wishlist",
        "data": wishlist,
    })))
}

async fn remove_from_wishlist(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    require_role(&user, &[Role::User])?;
    let wishlist = user_service::remove_from_wishlist(&state, user.id, product_id).await?;
    Ok(Json(json!({
        "status": "Success",
        "message": "Product removed successfully from your wishlist",
        "data": wishlist,
    })))
}

async fn get_wishlist(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse> {
    require_role(&user, &[Role::User])?;
    let products = user_service::get_wishlist(&state, &user).await?;
    Ok(Json(json!({
        "status": "Success",
        "results": products.len(),
        "data": products,
    })))
}
