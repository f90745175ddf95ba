//! Users, roles, and address book entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::slugify;
use crate::error::Result;
use crate::services::factory::{Listable, Resource, ResourceKind};
use crate::store::{Collection, Document};
use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    Manager,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: Uuid,
    pub alias: String,
    pub details: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: Role,
    pub active: bool,
    pub wishlist: Vec<Uuid>,
    pub addresses: Vec<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_changed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: &str, email: &str, password_hash: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: slugify(name),
            email: email.to_lowercase(),
            password_hash,
            profile_image: None,
            phone: None,
            role,
            active: true,
            wishlist: Vec::new(),
            addresses: Vec::new(),
            password_changed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Document for User {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    #[validate(length(min = 2, max = 50, message = "name must be 2-50 characters"))]
    pub name: String,
    #[validate(email(message = "invalid e-mail address"))]
    pub email: String,
    #[validate(length(min = 6, message = "password too short"))]
    pub password: String,
    pub role: Option<Role>,
    pub phone: Option<String>,
    pub profile_image: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[validate(length(min = 2, max = 50, message = "name must be 2-50 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "invalid e-mail address"))]
    pub email: Option<String>,
    pub role: Option<Role>,
    pub phone: Option<String>,
    pub profile_image: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    #[validate(length(min = 2, max = 32, message = "alias must be 2-32 characters"))]
    pub alias: String,
    #[validate(length(min = 5, message = "address details too short"))]
    pub details: String,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
}

impl AddressInput {
    pub fn into_address(self) -> Address {
        Address {
            id: Uuid::new_v4(),
            alias: self.alias,
            details: self.details,
            phone: self.phone,
            city: self.city,
            postal_code: self.postal_code,
        }
    }
}

impl Listable for User {
    const KIND: ResourceKind = ResourceKind::User;

    fn collection(state: &AppState) -> &Collection<Self> {
        &state.users
    }
}

impl Resource for User {
    type Create = CreateUser;
    type Update = UpdateUser;

    fn from_create(create: Self::Create) -> Result<Self> {
        let password_hash = crate::auth::hash_password(&create.password)?;
        let mut user = User::new(
            &create.name,
            &create.email,
            password_hash,
            create.role.unwrap_or(Role::User),
        );
        user.phone = create.phone;
        user.profile_image = create.profile_image;
        Ok(user)
    }

    fn apply_update(&mut self, update: Self::Update) {
        if let Some(name) = update.name {
            self.slug = slugify(&name);
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = email.to_lowercase();
        }
        if let Some(role) = update.role {
            self.role = role;
        }
        if let Some(active) = update.active {
            self.active = active;
        }
        if update.phone.is_some() {
            self.phone = update.phone;
        }
        if update.profile_image.is_some() {
            self.profile_image = update.profile_image;
        }
        self.touch();
    }
}
