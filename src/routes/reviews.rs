//! Review endpoints. Plain users may only touch their own reviews.

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
use crate::domain::review::{CreateReview, Review, UpdateReview};
use crate::domain::user::Role;
use crate::error::{ApiError, Result};
use crate::services::factory;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_reviews).post(create_review))
        .route(
            "/:id",
            get(get_review).put(update_review).delete(delete_review),
        )
}

async fn list_reviews(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse> {
    let response = factory::get_all::<Review>(&state, params, vec![]).await?;
    Ok(Json(response))
}

async fn get_review(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let review = factory::get_one::<Review>(&state, id).await?;
    Ok(Json(json!({"data": review})))
}

async fn create_review(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(mut payload): Json<CreateReview>,
) -> Result<impl IntoResponse> {
    require_role(&user, &[Role::User])?;
    payload.user = Some(user.id);
    let review = factory::create_one::<Review>(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(json!({"data": review}))))
}

async fn update_review(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateReview>,
) -> Result<impl IntoResponse> {
    require_role(&user, &[Role::User])?;
    ensure_owner(&state, id, user.id).await?;
    let review = factory::update_one::<Review>(&state, id, payload).await?;
    Ok((StatusCode::CREATED, Json(json!({"data": review}))))
}

async fn delete_review(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    require_role(&user, &[Role::User, Role::Admin, Role::Manager])?;
    if user.role == Role::User {
        ensure_owner(&state, id, user.id).await?;
    }
    factory::delete_one::<Review>(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn ensure_owner(state: &AppState, review_id: Uuid, user_id: Uuid) -> Result<()> {
    let review = factory::get_one::<Review>(state, review_id).await?;
    if review.user != user_id {
        return Err(ApiError::Forbidden(
            "You are not allowed to perform this action".into(),
        ));
    }
    Ok(())
}
