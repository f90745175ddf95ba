//! Logged-user shopping cart endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{require_role, CurrentUser};
use crate::domain::cart::Cart;
use crate::domain::user::Role;
use crate::error::Result;
use crate::services::cart as cart_service;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_cart).post(add_to_cart).delete(clear_cart))
        .route("/applyCoupon", put(apply_coupon))
        .route("/:itemId", put(update_item_quantity).delete(remove_item))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    pub color: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuantityRequest {
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyCouponRequest {
    pub coupon: String,
}

fn cart_envelope(msg: &str, cart: &Cart) -> serde_json::Value {
    json!({
        "status": "Success",
        "msg": msg,
        "numberOfCartItems": cart.item_count(),
        "data": cart,
    })
}

async fn add_to_cart(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<AddToCartRequest>,
) -> Result<impl IntoResponse> {
    require_role(&user, &[Role::User])?;
    let cart =
        cart_service::add_product_to_cart(&state, user.id, payload.product_id, payload.color)
            .await?;
    Ok(Json(cart_envelope("Product added to cart successfully", &cart)))
}

async fn get_cart(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse> {
    require_role(&user, &[Role::User])?;
    let cart = cart_service::get_logged_user_cart(&state, user.id).await?;
    Ok(Json(json!({
        "status": "Success",
        "numberOfCartItems": cart.item_count(),
        "data": cart,
    })))
}

async fn clear_cart(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse> {
    require_role(&user, &[Role::User])?;
    cart_service::clear_cart(&state, user.id).await;
    Ok(StatusCode::NO_CONTENT)
}

async fn apply_coupon(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<ApplyCouponRequest>,
) -> Result<impl IntoResponse> {
    require_role(&user, &[Role::User])?;
    let cart = cart_service::apply_coupon(&state, user.id, payload.coupon.trim()).await?;
    Ok(Json(cart_envelope("Coupon applied successfully", &cart)))
}

async fn update_item_quantity(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> Result<impl IntoResponse> {
    require_role(&user, &[Role::User])?;
    payload.validate()?;
    let cart =
        cart_service::update_cart_item_quantity(&state, user.id, item_id, payload.quantity)
            .await?;
    Ok(Json(cart_envelope("Cart item quantity updated", &cart)))
}

async fn remove_item(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(item_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    require_role(&user, &[Role::User])?;
    let cart = cart_service::remove_cart_item(&state, user.id, item_id).await?;
    Ok(Json(cart_envelope("Item removed from cart", &cart)))
}
