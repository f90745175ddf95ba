//! Order endpoints: cash checkout, hosted-session checkout, the payment
//! webhook, and staff fulfilment updates.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{require_role, CurrentUser};
use crate::domain::order::{Order, ShippingAddress};
use crate::domain::user::Role;
use crate::error::{ApiError, Result};
use crate::services::factory;
use crate::services::order as order_service;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_orders))
        .route("/checkout-session/:id", get(checkout_session))
        .route("/:id", get(get_order).post(create_cash_order))
        .route("/:id/paid", put(update_to_paid))
        .route("/:id/delivered", put(update_to_delivered))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub shipping_address: ShippingAddress,
}

async fn create_cash_order(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(cart_id): Path<Uuid>,
    payload: Option<Json<CheckoutRequest>>,
) -> Result<impl IntoResponse> {
    require_role(&user, &[Role::User])?;
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let order =
        order_service::create_cash_order(&state, &user, cart_id, payload.shipping_address).await?;
    Ok((StatusCode::CREATED, Json(json!({"data": order}))))
}

async fn checkout_session(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(cart_id): Path<Uuid>,
    payload: Option<Json<CheckoutRequest>>,
) -> Result<impl IntoResponse> {
    require_role(&user, &[Role::User])?;
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let session =
        order_service::checkout_session(&state, &user, cart_id, payload.shipping_address).await?;
    Ok(Json(json!({"status": "Success", "session": session})))
}

/// Plain users only ever see their own orders; staff see everything.
async fn list_orders(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse> {
    let base = match user.role {
        Role::User => vec![("user".to_string(), user.id.to_string())],
        Role::Admin | Role::Manager => vec![],
    };
    let response = factory::get_all::<Order>(&state, params, base).await?;
    Ok(Json(response))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let order = factory::get_one::<Order>(&state, id).await?;
    if user.role == Role::User && order.user != user.id {
        return Err(ApiError::Forbidden(
            "You are not allowed to perform this action".into(),
        ));
    }
    Ok(Json(json!({"data": order})))
}

async fn update_to_paid(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    require_role(&user, &[Role::Admin, Role::Manager])?;
    let order = order_service::update_order_to_paid(&state, id).await?;
    Ok(Json(json!({"data": order})))
}

async fn update_to_delivered(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    require_role(&user, &[Role::Admin, Role::Manager])?;
    let order = order_service::update_order_to_delivered(&state, id).await?;
    Ok(Json(json!({"data": order})))
}

/// Raw-body webhook endpoint; lives outside the authenticated order router
/// because the provider authenticates with a signature, not a token.
pub async fn checkout_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse> {
    order_service::handle_webhook(&state, &headers, &body).await?;
    Ok(Json(json!({"received": true})))
}
