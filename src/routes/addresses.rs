//! Logged-user address book endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde_json::json;
use uuid::Uuid;

use crate::auth::{require_role, CurrentUser};
use crate::domain::user::{AddressInput, Role};
use crate::error::Result;
use crate::services::user as user_service;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_addresses).post(add_address))
        .route("/:addressId", delete(remove_address))
}

async fn add_address(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<AddressInput>,
) -> Result<impl IntoResponse> {
    require_role(&user, &[Role::User])?;
    let addresses = user_service::add_address(&state, user.id, payload).await?;
    Ok(Json(json!({
        "status": "Success",
        "message": "Address added successfully",
        "data": addresses,
    })))
}

async fn remove_address(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(address_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    require_role(&user, &[Role::User])?;
    let addresses = user_service::remove_address(&state, user.id, address_id).await?;
    Ok(Json(json!({
        "status": "Success",
        "message": "Address removed successfully",
        "data": addresses,
    })))
}

async fn get_addresses(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse> {
    require_role(&user, &[Role::User])?;
    Ok(Json(json!({
        "status": "Success",
        "results": user.addresses.len(),
        "data": user.addresses,
    })))
}
