//! eshop-api
//!
//! E-commerce REST backend.
//!
//! ## Features
//! - Product catalog: products, categories, subcategories, brands
//! - Generic list queries: filter, sort, search, field limiting, pagination
//! - Cart with price snapshots and coupon discounts
//! - Cash and card (payment-webhook) order pipeline with inventory adjustment
//! - Reviews with product rating aggregation, wishlists, address book
//! - JWT authentication with user/admin/manager roles

use std::sync::Arc;

pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod query;
pub mod routes;
pub mod services;
pub mod store;

use config::Config;
use domain::catalog::{Brand, Category, SubCategory};
use domain::coupon::Coupon;
use domain::order::Order;
use domain::product::Product;
use domain::review::Review;
use domain::user::User;
use events::EventBus;
use store::{CartStore, Collection, ProcessedEvents};

/// Shared application state: configuration, the keyed document store, and the
/// event publisher.
pub struct AppState {
    pub config: Config,
    pub events: EventBus,
    pub users: Collection<User>,
    pub products: Collection<Product>,
    pub categories: Collection<Category>,
    pub subcategories: Collection<SubCategory>,
    pub brands: Collection<Brand>,
    pub reviews: Collection<Review>,
    pub coupons: Collection<Coupon>,
    pub orders: Collection<Order>,
    pub carts: CartStore,
    pub processed_events: ProcessedEvents,
}

impl AppState {
    pub fn new(config: Config, events: EventBus) -> Arc<Self> {
        Arc::new(Self {
            config,
            events,
            users: Collection::default(),
            products: Collection::default(),
            categories: Collection::default(),
            subcategories: Collection::default(),
            brands: Collection::default(),
            reviews: Collection::default(),
            coupons: Collection::default(),
            orders: Collection::default(),
            carts: CartStore::default(),
            processed_events: ProcessedEvents::default(),
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use crate::domain::coupon::Coupon;
    use crate::domain::product::Product;
    use crate::domain::slugify;
    use crate::domain::user::{Role, User};
    use crate::AppState;

    pub async fn seed_product(state: &AppState, title: &str, quantity: u32, price: i64) -> Product {
        let now = Utc::now();
        state
            .products
            .insert(Product {
                id: Uuid::new_v4(),
                slug: slugify(title),
                title: title.to_string(),
                description: "A product description long enough to validate".to_string(),
                quantity,
                sold: 0,
                price: Decimal::new(price, 0),
                price_after_discount: None,
                colors: vec![],
                image_cover: None,
                images: vec![],
                category: Uuid::new_v4(),
                subcategories: vec![],
                brand: None,
                ratings_average: None,
                ratings_quantity: 0,
                created_at: now,
                updated_at: now,
            })
            .await
    }

    /// Coupon expiring `expires_in_days` from now; negative means already
    /// expired.
    pub async fn seed_coupon(
        state: &AppState,
        name: &str,
        discount: i64,
        expires_in_days: i64,
    ) -> Coupon {
        let now = Utc::now();
        state
            .coupons
            .insert(Coupon {
                id: Uuid::new_v4(),
                name: name.to_string(),
                discount: Decimal::new(discount, 0),
                expire: now + Duration::days(expires_in_days),
                created_at: now,
                updated_at: now,
            })
            .await
    }

    pub async fn seed_user(state: &AppState, email: &str, role: Role) -> User {
        state
            .users
            .insert(User::new(
                "Test User",
                email,
                crate::auth::hash_password("secret123").unwrap(),
                role,
            ))
            .await
    }
}
