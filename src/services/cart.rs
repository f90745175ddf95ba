//! Cart pricing engine.
//!
//! All operations are scoped to the authenticated user's single active cart.
//! Each mutation runs inside one store lock acquisition, so concurrent
//! requests on the same cart cannot lose each other's writes.

use chrono::Utc;
use uuid::Uuid;

use crate::domain::cart::Cart;
use crate::error::{ApiError, Result};
use crate::AppState;

/// Add one unit of (product, color) to the user's cart, creating the cart if
/// none exists. The product's current catalog price is snapshotted onto the
/// line item.
pub async fn add_product_to_cart(
    state: &AppState,
    user_id: Uuid,
    product_id: Uuid,
    color: Option<String>,
) -> Result<Cart> {
    let product = state
        .products
        .get(product_id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("No product for this id: {product_id}")))?;

    let cart = state
        .carts
        .upsert_with(user_id, |cart| {
            cart.add_line(product.id, color, product.price);
        })
        .await;
    Ok(cart)
}

pub async fn get_logged_user_cart(state: &AppState, user_id: Uuid) -> Result<Cart> {
    state
        .carts
        .get(user_id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("There is no cart for this id: {user_id}")))
}

/// Pull a line item by id; an unknown id leaves the cart unchanged.
pub async fn remove_cart_item(state: &AppState, user_id: Uuid, item_id: Uuid) -> Result<Cart> {
    state
        .carts
        .update_with(user_id, |cart| cart.remove_line(item_id))
        .await
        .map(|(cart, _)| cart)
        .ok_or_else(|| ApiError::not_found(format!("There is no cart for this id: {user_id}")))
}

/// Delete the user's cart document entirely.
pub async fn clear_cart(state: &AppState, user_id: Uuid) {
    state.carts.remove(user_id).await;
}

pub async fn update_cart_item_quantity(
    state: &AppState,
    user_id: Uuid,
    item_id: Uuid,
    quantity: u32,
) -> Result<Cart> {
    let (cart, found) = state
        .carts
        .update_with(user_id, |cart| cart.set_quantity(item_id, quantity))
        .await
        .ok_or_else(|| ApiError::not_found(format!("There is no cart for this id: {user_id}")))?;

    if !found {
        return Err(ApiError::not_found("There is no cart item for this id"));
    }
    Ok(cart)
}

/// Apply a named, non-expired coupon to the cart's total. The discounted
/// total sits beside the unchanged pre-discount total.
pub async fn apply_coupon(state: &AppState, user_id: Uuid, coupon_name: &str) -> Result<Cart> {
    let now = Utc::now();
    let coupon = state
        .coupons
        .find(|c| c.name == coupon_name && !c.is_expired(now))
        .await
        .ok_or_else(|| ApiError::not_found("Invalid Coupon name or expired coupon"))?;

    state
        .carts
        .update_with(user_id, |cart| cart.apply_discount(coupon.discount))
        .await
        .map(|(cart, _)| cart)
        .ok_or_else(|| ApiError::not_found(format!("There is no cart for this id: {user_id}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::test_support::{seed_coupon, seed_product};
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_add_creates_then_merges() {
        let state = AppState::new(Config::default(), Default::default());
        let product = seed_product(&state, "Widget", 10, 20).await;
        let user = Uuid::new_v4();

        let cart = add_product_to_cart(&state, user, product.id, Some("red".into()))
            .await
            .unwrap();
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_cart_price, Decimal::new(20, 0));

        let cart = add_product_to_cart(&state, user, product.id, Some("red".into()))
            .await
            .unwrap();
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.cart_items[0].quantity, 2);
        assert_eq!(cart.total_cart_price, Decimal::new(40, 0));
    }

    #[tokio::test]
    async fn test_add_unknown_product_fails() {
        let state = AppState::new(Config::default(), Default::default());
        let err = add_product_to_cart(&state, Uuid::new_v4(), Uuid::new_v4(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_get_cart_requires_existing_cart() {
        let state = AppState::new(Config::default(), Default::default());
        assert!(get_logged_user_cart(&state, Uuid::new_v4()).await.is_err());
    }

    #[tokio::test]
    async fn test_update_quantity_and_remove() {
        let state = AppState::new(Config::default(), Default::default());
        let product = seed_product(&state, "Widget", 10, 15).await;
        let user = Uuid::new_v4();
        let cart = add_product_to_cart(&state, user, product.id, None).await.unwrap();
        let item_id = cart.cart_items[0].id;

        let cart = update_cart_item_quantity(&state, user, item_id, 4).await.unwrap();
        assert_eq!(cart.total_cart_price, Decimal::new(60, 0));

        let err = update_cart_item_quantity(&state, user, Uuid::new_v4(), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        let cart = remove_cart_item(&state, user, item_id).await.unwrap();
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.total_cart_price, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_clear_cart_deletes_document() {
        let state = AppState::new(Config::default(), Default::default());
        let product = seed_product(&state, "Widget", 10, 15).await;
        let user = Uuid::new_v4();
        add_product_to_cart(&state, user, product.id, None).await.unwrap();

        clear_cart(&state, user).await;
        assert!(state.carts.get(user).await.is_none());
    }

    #[tokio::test]
    async fn test_apply_coupon_and_expiry() {
        let state = AppState::new(Config::default(), Default::default());
        let product = seed_product(&state, "Widget", 10, 200).await;
        let user = Uuid::new_v4();
        add_product_to_cart(&state, user, product.id, None).await.unwrap();

        seed_coupon(&state, "SAVE10", 10, 1).await;
        let cart = apply_coupon(&state, user, "SAVE10").await.unwrap();
        assert_eq!(cart.total_price_after_discount, Some(Decimal::new(180, 0)));
        assert_eq!(cart.total_cart_price, Decimal::new(200, 0));

        // Expired coupon fails and leaves the discounted total untouched.
        seed_coupon(&state, "OLD", 50, -1).await;
        let err = apply_coupon(&state, user, "OLD").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        let cart = get_logged_user_cart(&state, user).await.unwrap();
        assert_eq!(cart.total_price_after_discount, Some(Decimal::new(180, 0)));

        // Unknown name fails the same way.
        assert!(apply_coupon(&state, user, "NOPE").await.is_err());
    }

    #[tokio::test]
    async fn test_mutation_clears_applied_coupon() {
        let state = AppState::new(Config::default(), Default::default());
        let product = seed_product(&state, "Widget", 10, 100).await;
        let user = Uuid::new_v4();
        add_product_to_cart(&state, user, product.id, None).await.unwrap();
        seed_coupon(&state, "SAVE20", 20, 1).await;
        apply_coupon(&state, user, "SAVE20").await.unwrap();

        let cart = add_product_to_cart(&state, user, product.id, None).await.unwrap();
        assert!(cart.total_price_after_discount.is_none());
        assert_eq!(cart.total_cart_price, Decimal::new(200, 0));
    }
}
