//! Coupon endpoints. The whole surface is staff-only.

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
use crate::domain::coupon::{Coupon, CreateCoupon, UpdateCoupon};
use crate::domain::user::Role;
use crate::error::{ApiError, Result};
use crate::services::factory;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_coupons).post(create_coupon))
        .route(
            "/:id",
            get(get_coupon).put(update_coupon).delete(delete_coupon),
        )
}

async fn list_coupons(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse> {
    require_role(&user, &[Role::Admin, Role::Manager])?;
    let response = factory::get_all::<Coupon>(&state, params, vec![]).await?;
    Ok(Json(response))
}

async fn get_coupon(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    require_role(&user, &[Role::Admin, Role::Manager])?;
    let coupon = factory::get_one::<Coupon>(&state, id).await?;
    Ok(Json(json!({"data": coupon})))
}

async fn create_coupon(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateCoupon>,
) -> Result<impl IntoResponse> {
    require_role(&user, &[Role::Admin, Role::Manager])?;
    let name = payload.name.trim().to_string();
    let duplicate = state
        .coupons
        .find(|c| c.name.eq_ignore_ascii_case(&name))
        .await;
    if duplicate.is_some() {
        return Err(ApiError::BadRequest("Coupon name already in use".into()));
    }
    let coupon = factory::create_one::<Coupon>(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(json!({"data": coupon}))))
}

async fn update_coupon(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCoupon>,
) -> Result<impl IntoResponse> {
    require_role(&user, &[Role::Admin, Role::Manager])?;
    let coupon = factory::update_one::<Coupon>(&state, id, payload).await?;
    Ok((StatusCode::CREATED, Json(json!({"data": coupon}))))
}

async fn delete_coupon(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    require_role(&user, &[Role::Admin, Role::Manager])?;
    factory::delete_one::<Coupon>(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
