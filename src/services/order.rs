//! Order pipeline.
//!
//! Two creation paths converge on the same effects: the synchronous cash
//! order and the asynchronous card order driven by a signed payment
//! confirmation event. Both snapshot the cart, adjust inventory in one pass
//! under the products lock, and delete the source cart.

use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use crate::domain::cart::CartItem;
use crate::domain::order::{Order, PaymentMethod, ShippingAddress};
use crate::domain::user::User;
use crate::error::{ApiError, Result};
use crate::events::OrderEvent;
use crate::AppState;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_HEADER: &str = "webhook-signature";
const CHECKOUT_COMPLETED: &str = "checkout.session.completed";

// Fixed pricing policy for now; extension points for future rules.
const TAX_PRICE: Decimal = Decimal::ZERO;
const SHIPPING_PRICE: Decimal = Decimal::ZERO;

/// Create an order from the cart with payment on delivery.
pub async fn create_cash_order(
    state: &AppState,
    user: &User,
    cart_id: Uuid,
    shipping_address: ShippingAddress,
) -> Result<Order> {
    let cart = state
        .carts
        .find_by_id(cart_id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("There is no cart for this id: {cart_id}")))?;

    let total_order_price = cart.effective_price() + TAX_PRICE + SHIPPING_PRICE;
    let order = Order::from_cart(
        user.id,
        &cart,
        shipping_address,
        total_order_price,
        PaymentMethod::Cash,
    );
    let order = state.orders.insert(order).await;

    adjust_inventory(state, &order.cart_items).await;
    state.carts.remove_by_id(cart_id).await;

    state
        .events
        .publish(OrderEvent::Created {
            order_id: order.id,
            user: order.user,
            total: order.total_order_price,
            payment_method: order.payment_method_type,
        })
        .await;
    Ok(order)
}

/// Decrement quantity-on-hand and increment sold for every ordered product,
/// in a single pass under the products write lock.
async fn adjust_inventory(state: &AppState, items: &[CartItem]) {
    state
        .products
        .bulk_update(|product| {
            let ordered: u32 = items
                .iter()
                .filter(|i| i.product == product.id)
                .map(|i| i.quantity)
                .sum();
            if ordered > 0 {
                product.quantity = product.quantity.saturating_sub(ordered);
                product.sold += ordered;
                product.updated_at = chrono::Utc::now();
            }
        })
        .await;
}

/// Provider-hosted payment page reference, returned to the client to complete
/// payment out-of-band. Field names follow the provider's wire format.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSession {
    pub id: String,
    /// Order total in minor currency units.
    pub amount_total: i64,
    pub currency: String,
    pub customer_email: String,
    pub client_reference_id: Uuid,
    pub metadata: ShippingAddress,
    pub success_url: String,
    pub cancel_url: String,
}

pub async fn checkout_session(
    state: &AppState,
    user: &User,
    cart_id: Uuid,
    shipping_address: ShippingAddress,
) -> Result<CheckoutSession> {
    let cart = state
        .carts
        .find_by_id(cart_id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("There is no cart for this id: {cart_id}")))?;

    let total_order_price = cart.effective_price() + TAX_PRICE + SHIPPING_PRICE;
    let amount_total = (total_order_price * Decimal::from(100u32))
        .round()
        .to_i64()
        .ok_or_else(|| ApiError::Internal("order total out of range".into()))?;

    Ok(CheckoutSession {
        id: format!("cs_{}", Uuid::new_v4().simple()),
        amount_total,
        currency: "usd".to_string(),
        customer_email: user.email.clone(),
        client_reference_id: cart_id,
        metadata: shipping_address,
        success_url: format!("{}/api/v1/orders", state.config.base_url),
        cancel_url: format!("{}/api/v1/cart", state.config.base_url),
    })
}

/// Payment confirmation event as delivered by the provider.
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: WebhookData,
}

#[derive(Debug, Deserialize)]
pub struct WebhookData {
    pub object: SessionPayload,
}

#[derive(Debug, Deserialize)]
pub struct SessionPayload {
    pub client_reference_id: Uuid,
    pub customer_email: String,
    /// Confirmed amount in minor currency units; authoritative for the order
    /// total.
    pub amount_total: i64,
    #[serde(default)]
    pub metadata: ShippingAddress,
}

/// Build the `t=...,v1=...` signature header for a payload. Matches what the
/// payment provider attaches; also used to sign fixtures in tests.
pub fn signature_header(secret: &str, timestamp: i64, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);
    format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
}

/// Verify the event signature against the shared webhook secret. Rejected
/// requests must cause no state change.
pub fn verify_signature(secret: &str, header: &str, body: &[u8]) -> Result<()> {
    let (timestamp, signature) = parse_signature_header(header)
        .ok_or_else(|| ApiError::BadRequest("Malformed webhook signature header".into()))?;

    let signature = hex::decode(signature)
        .map_err(|_| ApiError::BadRequest("Malformed webhook signature header".into()))?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| ApiError::Internal("invalid webhook secret".into()))?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(body);
    mac.verify_slice(&signature)
        .map_err(|_| ApiError::BadRequest("Webhook signature verification failed".into()))
}

fn parse_signature_header(header: &str) -> Option<(&str, &str)> {
    let mut timestamp = None;
    let mut signature = None;
    for part in header.split(',') {
        let (key, value) = part.trim().split_once('=')?;
        match key {
            "t" => timestamp = Some(value),
            "v1" => signature = Some(value),
            _ => {}
        }
    }
    Some((timestamp?, signature?))
}

/// Handle a raw provider event: verify the signature, drop duplicates via the
/// processed-event ledger, and create the paid card order for completed
/// checkout sessions. Returns the created order, if any.
pub async fn handle_webhook(
    state: &AppState,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Option<Order>> {
    let header = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest("Missing webhook signature".into()))?;

    verify_signature(&state.config.webhook_secret, header, body)?;

    let event: WebhookEvent = serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Malformed webhook payload: {e}")))?;

    if !state.processed_events.mark(&event.id).await {
        tracing::info!(event_id = %event.id, "duplicate webhook event ignored");
        return Ok(None);
    }

    if event.kind != CHECKOUT_COMPLETED {
        tracing::debug!(kind = %event.kind, "ignoring webhook event type");
        return Ok(None);
    }

    create_card_order(state, event.data.object).await.map(Some)
}

/// Create an order for a confirmed online payment. The confirmed amount is
/// authoritative over anything the client supplied.
async fn create_card_order(state: &AppState, session: SessionPayload) -> Result<Order> {
    let cart = state
        .carts
        .find_by_id(session.client_reference_id)
        .await
        .ok_or_else(|| {
            ApiError::not_found(format!(
                "There is no cart for this id: {}",
                session.client_reference_id
            ))
        })?;

    let email = session.customer_email.to_lowercase();
    let user = state
        .users
        .find(|u| u.email == email)
        .await
        .ok_or_else(|| ApiError::not_found(format!("No user for this email: {email}")))?;

    let total_order_price = Decimal::from(session.amount_total) / Decimal::from(100u32);
    let mut order = Order::from_cart(
        user.id,
        &cart,
        session.metadata,
        total_order_price,
        PaymentMethod::Card,
    );
    order.mark_paid();
    let order = state.orders.insert(order).await;

    adjust_inventory(state, &order.cart_items).await;
    state.carts.remove_by_id(cart.id).await;

    state
        .events
        .publish(OrderEvent::Created {
            order_id: order.id,
            user: order.user,
            total: order.total_order_price,
            payment_method: order.payment_method_type,
        })
        .await;
    state.events.publish(OrderEvent::Paid { order_id: order.id }).await;
    Ok(order)
}

pub async fn update_order_to_paid(state: &AppState, order_id: Uuid) -> Result<Order> {
    let order = state
        .orders
        .update(order_id, Order::mark_paid)
        .await
        .ok_or_else(|| ApiError::not_found(format!("There is no order for this id: {order_id}")))?;
    state.events.publish(OrderEvent::Paid { order_id }).await;
    Ok(order)
}

pub async fn update_order_to_delivered(state: &AppState, order_id: Uuid) -> Result<Order> {
    let order = state
        .orders
        .update(order_id, Order::mark_delivered)
        .await
        .ok_or_else(|| ApiError::not_found(format!("There is no order for this id: {order_id}")))?;
    state.events.publish(OrderEvent::Delivered { order_id }).await;
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::domain::user::Role;
    use crate::services::cart as cart_service;
    use crate::test_support::{seed_coupon, seed_product, seed_user};
    use chrono::Utc;
    use serde_json::json;

    #[tokio::test]
    async fn test_cash_order_adjusts_inventory_and_deletes_cart() {
        let state = AppState::new(Config::default(), Default::default());
        let user = seed_user(&state, "buyer@example.com", Role::User).await;
        let p1 = seed_product(&state, "First Widget", 10, 20).await;
        let p2 = seed_product(&state, "Second Widget", 10, 30).await;

        // Cart with quantities {1, 3}.
        cart_service::add_product_to_cart(&state, user.id, p1.id, None).await.unwrap();
        let cart = cart_service::add_product_to_cart(&state, user.id, p2.id, None)
            .await
            .unwrap();
        let p2_item = cart
            .cart_items
            .iter()
            .find(|i| i.product == p2.id)
            .unwrap()
            .id;
        let cart = cart_service::update_cart_item_quantity(&state, user.id, p2_item, 3)
            .await
            .unwrap();

        let order = create_cash_order(&state, &user, cart.id, ShippingAddress::default())
            .await
            .unwrap();

        assert_eq!(order.payment_method_type, PaymentMethod::Cash);
        assert!(!order.is_paid);
        assert_eq!(order.total_order_price, Decimal::new(110, 0)); // 20 + 3*30

        assert_eq!(state.products.get(p1.id).await.unwrap().quantity, 9);
        assert_eq!(state.products.get(p1.id).await.unwrap().sold, 1);
        assert_eq!(state.products.get(p2.id).await.unwrap().quantity, 7);
        assert_eq!(state.products.get(p2.id).await.unwrap().sold, 3);
        assert!(state.carts.get(user.id).await.is_none());
    }

    #[tokio::test]
    async fn test_cash_order_prefers_discounted_total() {
        let state = AppState::new(Config::default(), Default::default());
        let user = seed_user(&state, "buyer@example.com", Role::User).await;
        let product = seed_product(&state, "Priced Widget", 10, 100).await;
        let cart = cart_service::add_product_to_cart(&state, user.id, product.id, None)
            .await
            .unwrap();

        seed_coupon(&state, "SAVE25", 25, 1).await;
        cart_service::apply_coupon(&state, user.id, "SAVE25").await.unwrap();

        let order = create_cash_order(&state, &user, cart.id, ShippingAddress::default())
            .await
            .unwrap();
        assert_eq!(order.total_order_price, Decimal::new(75, 0));
    }

    #[tokio::test]
    async fn test_cash_order_unknown_cart_fails() {
        let state = AppState::new(Config::default(), Default::default());
        let user = seed_user(&state, "buyer@example.com", Role::User).await;
        let err = create_cash_order(&state, &user, Uuid::new_v4(), ShippingAddress::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_status_flips() {
        let state = AppState::new(Config::default(), Default::default());
        let user = seed_user(&state, "buyer@example.com", Role::User).await;
        let product = seed_product(&state, "Flip Widget", 5, 10).await;
        let cart = cart_service::add_product_to_cart(&state, user.id, product.id, None)
            .await
            .unwrap();
        let order = create_cash_order(&state, &user, cart.id, ShippingAddress::default())
            .await
            .unwrap();

        let order = update_order_to_paid(&state, order.id).await.unwrap();
        assert!(order.is_paid && order.paid_at.is_some());
        let order = update_order_to_delivered(&state, order.id).await.unwrap();
        assert!(order.is_delivered && order.delivered_at.is_some());

        assert!(update_order_to_paid(&state, Uuid::new_v4()).await.is_err());
    }

    fn event_body(event_id: &str, cart_id: Uuid, email: &str, amount_total: i64) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "id": event_id,
            "type": "checkout.session.completed",
            "data": {
                "object": {
                    "client_reference_id": cart_id,
                    "customer_email": email,
                    "amount_total": amount_total,
                    "metadata": {"city": "Cairo"}
                }
            }
        }))
        .unwrap()
    }

    fn signed_headers(secret: &str, body: &[u8]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let header = signature_header(secret, Utc::now().timestamp(), body);
        headers.insert(SIGNATURE_HEADER, header.parse().unwrap());
        headers
    }

    #[tokio::test]
    async fn test_webhook_creates_paid_order() {
        let state = AppState::new(Config::default(), Default::default());
        let user = seed_user(&state, "card@example.com", Role::User).await;
        let product = seed_product(&state, "Card Widget", 10, 50).await;
        let cart = cart_service::add_product_to_cart(&state, user.id, product.id, None)
            .await
            .unwrap();

        let body = event_body("evt_1", cart.id, "card@example.com", 5000);
        let headers = signed_headers(&state.config.webhook_secret, &body);

        let order = handle_webhook(&state, &headers, &body)
            .await
            .unwrap()
            .expect("order created");
        assert_eq!(order.payment_method_type, PaymentMethod::Card);
        assert!(order.is_paid);
        assert_eq!(order.total_order_price, Decimal::new(50, 0));
        assert_eq!(state.products.get(product.id).await.unwrap().quantity, 9);
        assert!(state.carts.get(user.id).await.is_none());
    }

    #[tokio::test]
    async fn test_webhook_invalid_signature_no_state_change() {
        let state = AppState::new(Config::default(), Default::default());
        let user = seed_user(&state, "card@example.com", Role::User).await;
        let product = seed_product(&state, "Card Widget", 10, 50).await;
        let cart = cart_service::add_product_to_cart(&state, user.id, product.id, None)
            .await
            .unwrap();

        let body = event_body("evt_1", cart.id, "card@example.com", 5000);
        let headers = signed_headers("not-the-secret", &body);

        let err = handle_webhook(&state, &headers, &body).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert_eq!(state.orders.count().await, 0);
        assert_eq!(state.products.get(product.id).await.unwrap().quantity, 10);
        assert!(state.carts.get(user.id).await.is_some());

        // Missing header is rejected the same way.
        let err = handle_webhook(&state, &HeaderMap::new(), &body).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_webhook_duplicate_event_is_ignored() {
        let state = AppState::new(Config::default(), Default::default());
        let user = seed_user(&state, "card@example.com", Role::User).await;
        let product = seed_product(&state, "Card Widget", 10, 50).await;
        let cart = cart_service::add_product_to_cart(&state, user.id, product.id, None)
            .await
            .unwrap();

        let body = event_body("evt_dup", cart.id, "card@example.com", 5000);
        let headers = signed_headers(&state.config.webhook_secret, &body);

        assert!(handle_webhook(&state, &headers, &body).await.unwrap().is_some());
        assert!(handle_webhook(&state, &headers, &body).await.unwrap().is_none());
        assert_eq!(state.orders.count().await, 1);
        assert_eq!(state.products.get(product.id).await.unwrap().quantity, 9);
    }

    #[test]
    fn test_signature_roundtrip() {
        let body = b"payload";
        let header = signature_header("secret", 1700000000, body);
        assert!(verify_signature("secret", &header, body).is_ok());
        assert!(verify_signature("other", &header, body).is_err());
        assert!(verify_signature("secret", &header, b"tampered").is_err());
        assert!(verify_signature("secret", "garbage", body).is_err());
    }
}
