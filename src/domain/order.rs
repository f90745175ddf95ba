//! Order aggregate.
//!
//! An order is a snapshot of a cart's line items at creation time. Only the
//! paid/delivered flags and their timestamps change afterwards, and both are
//! one-way flips.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::cart::{Cart, CartItem};
use crate::services::factory::{Listable, ResourceKind};
use crate::store::{Collection, Document};
use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub user: Uuid,
    pub cart_items: Vec<CartItem>,
    pub shipping_address: ShippingAddress,
    pub tax_price: Decimal,
    pub shipping_price: Decimal,
    pub total_order_price: Decimal,
    pub payment_method_type: PaymentMethod,
    pub is_paid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    pub is_delivered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn from_cart(
        user: Uuid,
        cart: &Cart,
        shipping_address: ShippingAddress,
        total_order_price: Decimal,
        payment_method_type: PaymentMethod,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user,
            cart_items: cart.cart_items.clone(),
            shipping_address,
            tax_price: Decimal::ZERO,
            shipping_price: Decimal::ZERO,
            total_order_price,
            payment_method_type,
            is_paid: false,
            paid_at: None,
            is_delivered: false,
            delivered_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn mark_paid(&mut self) {
        self.is_paid = true;
        self.paid_at = Some(Utc::now());
        self.updated_at = Utc::now();
    }

    pub fn mark_delivered(&mut self) {
        self.is_delivered = true;
        self.delivered_at = Some(Utc::now());
        self.updated_at = Utc::now();
    }
}

impl Document for Order {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Listable for Order {
    const KIND: ResourceKind = ResourceKind::Order;

    fn collection(state: &AppState) -> &Collection<Self> {
        &state.orders
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_snapshots_cart_items() {
        let user = Uuid::new_v4();
        let mut cart = Cart::new(user);
        cart.add_line(Uuid::new_v4(), None, Decimal::new(20, 0));

        let order = Order::from_cart(
            user,
            &cart,
            ShippingAddress::default(),
            cart.effective_price(),
            PaymentMethod::Cash,
        );

        // Later cart mutations must not alter the order's items.
        cart.add_line(Uuid::new_v4(), None, Decimal::new(5, 0));
        assert_eq!(order.cart_items.len(), 1);
        assert_eq!(order.total_order_price, Decimal::new(20, 0));
        assert!(!order.is_paid);
        assert!(!order.is_delivered);
    }

    #[test]
    fn test_flags_are_one_way_with_timestamps() {
        let user = Uuid::new_v4();
        let cart = Cart::new(user);
        let mut order = Order::from_cart(
            user,
            &cart,
            ShippingAddress::default(),
            Decimal::ZERO,
            PaymentMethod::Cash,
        );

        order.mark_paid();
        assert!(order.is_paid);
        assert!(order.paid_at.is_some());

        order.mark_delivered();
        assert!(order.is_delivered);
        assert!(order.delivered_at.is_some());
    }
}
