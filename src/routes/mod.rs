//! Route wiring.

use std::sync::Arc;

use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::AppState;

mod addresses;
mod auth;
mod brands;
mod cart;
mod categories;
mod coupons;
mod orders;
mod products;
mod reviews;
mod subcategories;
mod users;
mod wishlist;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1/auth", auth::router())
        .nest("/api/v1/products", products::router())
        .nest("/api/v1/categories", categories::router())
        .nest("/api/v1/subcategories", subcategories::router())
        .nest("/api/v1/brands", brands::router())
        .nest("/api/v1/reviews", reviews::router())
        .nest("/api/v1/coupons", coupons::router())
        .nest("/api/v1/users", users::router())
        .nest("/api/v1/cart", cart::router())
        .nest("/api/v1/orders", orders::router())
        .nest("/api/v1/wishlist", wishlist::router())
        .nest("/api/v1/addresses", addresses::router())
        // The provider posts the raw, signed event body here.
        .route("/api/v1/checkout-webhook", post(orders::checkout_webhook))
        .fallback(route_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({"status": "healthy", "service": "eshop-api"}))
}

async fn route_not_found(uri: axum::http::Uri) -> ApiError {
    ApiError::BadRequest(format!("Can't find this route: {uri}"))
}
