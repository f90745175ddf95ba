//! Catalog products, inventory counters included.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::domain::slugify;
use crate::error::Result;
use crate::services::factory::{Listable, Resource, ResourceKind};
use crate::store::{Collection, Document};
use crate::AppState;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    /// Quantity on hand; decremented when an order is created.
    pub quantity: u32,
    /// Units sold; incremented when an order is created.
    pub sold: u32,
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_after_discount: Option<Decimal>,
    pub colors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_cover: Option<String>,
    pub images: Vec<String>,
    pub category: Uuid,
    pub subcategories: Vec<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratings_average: Option<f64>,
    pub ratings_quantity: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Product {
    fn id(&self) -> Uuid {
        self.id
    }
}

fn validate_price(price: &Decimal) -> std::result::Result<(), ValidationError> {
    if *price <= Decimal::ZERO || *price > Decimal::from(200_000u32) {
        return Err(ValidationError::new("price out of range"));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    #[validate(length(min = 3, max = 100, message = "title must be 3-100 characters"))]
    pub title: String,
    #[validate(length(min = 20, message = "description too short"))]
    pub description: String,
    pub quantity: u32,
    #[validate(custom = "validate_price")]
    pub price: Decimal,
    #[serde(default)]
    pub colors: Vec<String>,
    pub image_cover: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub category: Uuid,
    #[serde(default)]
    pub subcategories: Vec<Uuid>,
    pub brand: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
    #[validate(length(min = 3, max = 100, message = "title must be 3-100 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 20, message = "description too short"))]
    pub description: Option<String>,
    pub quantity: Option<u32>,
    #[validate(custom = "validate_price")]
    pub price: Option<Decimal>,
    pub colors: Option<Vec<String>>,
    pub image_cover: Option<String>,
    pub images: Option<Vec<String>>,
    pub category: Option<Uuid>,
    pub subcategories: Option<Vec<Uuid>>,
    pub brand: Option<Uuid>,
}

impl Listable for Product {
    const KIND: ResourceKind = ResourceKind::Product;

    fn collection(state: &AppState) -> &Collection<Self> {
        &state.products
    }
}

impl Resource for Product {
    type Create = CreateProduct;
    type Update = UpdateProduct;

    fn from_create(create: Self::Create) -> Result<Self> {
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            slug: slugify(&create.title),
            title: create.title,
            description: create.description,
            quantity: create.quantity,
            sold: 0,
            price: create.price,
            price_after_discount: None,
            colors: create.colors,
            image_cover: create.image_cover,
            images: create.images,
            category: create.category,
            subcategories: create.subcategories,
            brand: create.brand,
            ratings_average: None,
            ratings_quantity: 0,
            created_at: now,
            updated_at: now,
        })
    }

    fn apply_update(&mut self, update: Self::Update) {
        if let Some(title) = update.title {
            self.slug = slugify(&title);
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(quantity) = update.quantity {
            self.quantity = quantity;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(colors) = update.colors {
            self.colors = colors;
        }
        if update.image_cover.is_some() {
            self.image_cover = update.image_cover;
        }
        if let Some(images) = update.images {
            self.images = images;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(subcategories) = update.subcategories {
            self.subcategories = subcategories;
        }
        if update.brand.is_some() {
            self.brand = update.brand;
        }
        self.updated_at = Utc::now();
    }
}
