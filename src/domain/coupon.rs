//! Discount coupons.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::error::Result;
use crate::services::factory::{Listable, Resource, ResourceKind};
use crate::store::{Collection, Document};
use crate::AppState;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: Uuid,
    /// Unique coupon code, matched exactly on apply.
    pub name: String,
    /// Discount percentage, 0-100.
    pub discount: Decimal,
    pub expire: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Coupon {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expire <= now
    }
}

impl Document for Coupon {
    fn id(&self) -> Uuid {
        self.id
    }
}

fn validate_discount(discount: &Decimal) -> std::result::Result<(), ValidationError> {
    if *discount <= Decimal::ZERO || *discount > Decimal::from(100u32) {
        return Err(ValidationError::new("discount out of range"));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCoupon {
    #[validate(length(min = 2, max = 32, message = "name must be 2-32 characters"))]
    pub name: String,
    #[validate(custom = "validate_discount")]
    pub discount: Decimal,
    pub expire: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCoupon {
    #[validate(length(min = 2, max = 32, message = "name must be 2-32 characters"))]
    pub name: Option<String>,
    #[validate(custom = "validate_discount")]
    pub discount: Option<Decimal>,
    pub expire: Option<DateTime<Utc>>,
}

impl Listable for Coupon {
    const KIND: ResourceKind = ResourceKind::Coupon;

    fn collection(state: &AppState) -> &Collection<Self> {
        &state.coupons
    }
}

impl Resource for Coupon {
    type Create = CreateCoupon;
    type Update = UpdateCoupon;

    fn from_create(create: Self::Create) -> Result<Self> {
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            name: create.name.trim().to_string(),
            discount: create.discount,
            expire: create.expire,
            created_at: now,
            updated_at: now,
        })
    }

    fn apply_update(&mut self, update: Self::Update) {
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(discount) = update.discount {
            self.discount = discount;
        }
        if let Some(expire) = update.expire {
            self.expire = expire;
        }
        self.updated_at = Utc::now();
    }
}
