//! Product reviews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{ApiError, Result};
use crate::services::factory::{Listable, Resource, ResourceKind};
use crate::store::{Collection, Document};
use crate::AppState;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub ratings: f64,
    pub user: Uuid,
    pub product: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Review {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReview {
    pub title: Option<String>,
    #[validate(range(min = 1.0, max = 5.0, message = "ratings must be between 1 and 5"))]
    pub ratings: f64,
    /// Injected from the nested route or taken from the body.
    pub product: Option<Uuid>,
    /// Always overwritten with the authenticated user.
    pub user: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReview {
    pub title: Option<String>,
    #[validate(range(min = 1.0, max = 5.0, message = "ratings must be between 1 and 5"))]
    pub ratings: Option<f64>,
}

impl Listable for Review {
    const KIND: ResourceKind = ResourceKind::Review;

    fn collection(state: &AppState) -> &Collection<Self> {
        &state.reviews
    }
}

impl Resource for Review {
    type Create = CreateReview;
    type Update = UpdateReview;

    fn from_create(create: Self::Create) -> Result<Self> {
        let product = create
            .product
            .ok_or_else(|| ApiError::Validation("product: review must belong to a product".into()))?;
        let user = create
            .user
            .ok_or_else(|| ApiError::Validation("user: review must belong to a user".into()))?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            title: create.title,
            ratings: create.ratings,
            user,
            product,
            created_at: now,
            updated_at: now,
        })
    }

    fn apply_update(&mut self, update: Self::Update) {
        if update.title.is_some() {
            self.title = update.title;
        }
        if let Some(ratings) = update.ratings {
            self.ratings = ratings;
        }
        self.updated_at = Utc::now();
    }

    fn product_ref(&self) -> Option<Uuid> {
        Some(self.product)
    }
}
