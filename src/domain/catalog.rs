//! Categories, subcategories, and brands.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::slugify;
use crate::error::{ApiError, Result};
use crate::services::factory::{Listable, Resource, ResourceKind};
use crate::store::{Collection, Document};
use crate::AppState;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Category {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategory {
    #[validate(length(min = 3, max = 32, message = "name must be 3-32 characters"))]
    pub name: String,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategory {
    #[validate(length(min = 3, max = 32, message = "name must be 3-32 characters"))]
    pub name: Option<String>,
    pub image: Option<String>,
}

impl Listable for Category {
    const KIND: ResourceKind = ResourceKind::Category;

    fn collection(state: &AppState) -> &Collection<Self> {
        &state.categories
    }
}

impl Resource for Category {
    type Create = CreateCategory;
    type Update = UpdateCategory;

    fn from_create(create: Self::Create) -> Result<Self> {
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            slug: slugify(&create.name),
            name: create.name,
            image: create.image,
            created_at: now,
            updated_at: now,
        })
    }

    fn apply_update(&mut self, update: Self::Update) {
        if let Some(name) = update.name {
            self.slug = slugify(&name);
            self.name = name;
        }
        if update.image.is_some() {
            self.image = update.image;
        }
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubCategory {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    /// Parent category.
    pub category: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for SubCategory {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubCategory {
    #[validate(length(min = 2, max = 32, message = "name must be 2-32 characters"))]
    pub name: String,
    /// Absent on the nested route, where the handler injects the parent id.
    pub category: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubCategory {
    #[validate(length(min = 2, max = 32, message = "name must be 2-32 characters"))]
    pub name: Option<String>,
    pub category: Option<Uuid>,
}

impl Listable for SubCategory {
    const KIND: ResourceKind = ResourceKind::SubCategory;

    fn collection(state: &AppState) -> &Collection<Self> {
        &state.subcategories
    }
}

impl Resource for SubCategory {
    type Create = CreateSubCategory;
    type Update = UpdateSubCategory;

    fn from_create(create: Self::Create) -> Result<Self> {
        let category = create.category.ok_or_else(|| {
            ApiError::Validation("category: subcategory must belong to a category".into())
        })?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            slug: slugify(&create.name),
            name: create.name,
            category,
            created_at: now,
            updated_at: now,
        })
    }

    fn apply_update(&mut self, update: Self::Update) {
        if let Some(name) = update.name {
            self.slug = slugify(&name);
            self.name = name;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Brand {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBrand {
    #[validate(length(min = 2, max = 32, message = "name must be 2-32 characters"))]
    pub name: String,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBrand {
    #[validate(length(min = 2, max = 32, message = "name must be 2-32 characters"))]
    pub name: Option<String>,
    pub image: Option<String>,
}

impl Listable for Brand {
    const KIND: ResourceKind = ResourceKind::Brand;

    fn collection(state: &AppState) -> &Collection<Self> {
        &state.brands
    }
}

impl Resource for Brand {
    type Create = CreateBrand;
    type Update = UpdateBrand;

    fn from_create(create: Self::Create) -> Result<Self> {
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            slug: slugify(&create.name),
            name: create.name,
            image: create.image,
            created_at: now,
            updated_at: now,
        })
    }

    fn apply_update(&mut self, update: Self::Update) {
        if let Some(name) = update.name {
            self.slug = slugify(&name);
            self.name = name;
        }
        if update.image.is_some() {
            self.image = update.image;
        }
        self.updated_at = Utc::now();
    }
}
