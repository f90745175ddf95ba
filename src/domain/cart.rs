//! Cart aggregate.
//!
//! One active cart per user. Line items carry a price snapshot taken at
//! add-to-cart time; the total is recomputed on every mutation, and any
//! applied coupon discount is cleared by the recompute since a stale discount
//! on a changed total would misrepresent the order price.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: Uuid,
    pub product: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub quantity: u32,
    /// Price snapshot, immune to later catalog price changes.
    pub price: Decimal,
}

impl CartItem {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: Uuid,
    pub user: Uuid,
    pub cart_items: Vec<CartItem>,
    pub total_cart_price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_price_after_discount: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn new(user: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user,
            cart_items: Vec::new(),
            total_cart_price: Decimal::ZERO,
            total_price_after_discount: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn item_count(&self) -> usize {
        self.cart_items.len()
    }

    /// Add one unit of (product, color). An existing line item for the same
    /// pair has its quantity incremented by exactly 1; otherwise a new line
    /// item is appended with quantity 1 and the given price snapshot.
    pub fn add_line(&mut self, product: Uuid, color: Option<String>, price: Decimal) {
        if let Some(item) = self
            .cart_items
            .iter_mut()
            .find(|i| i.product == product && i.color == color)
        {
            item.quantity += 1;
        } else {
            self.cart_items.push(CartItem {
                id: Uuid::new_v4(),
                product,
                color,
                quantity: 1,
                price,
            });
        }
        self.recompute();
    }

    /// Pull a line item by id. Absent items are a no-op; the recompute still
    /// runs.
    pub fn remove_line(&mut self, item_id: Uuid) {
        self.cart_items.retain(|i| i.id != item_id);
        self.recompute();
    }

    /// Overwrite a line item's quantity verbatim. Returns `false` if no line
    /// item has the given id.
    pub fn set_quantity(&mut self, item_id: Uuid, quantity: u32) -> bool {
        match self.cart_items.iter_mut().find(|i| i.id == item_id) {
            Some(item) => {
                item.quantity = quantity;
                self.recompute();
                true
            }
            None => false,
        }
    }

    /// `totalPriceAfterDiscount = round2(total - total*discount/100)`. The
    /// pre-discount total stays visible.
    pub fn apply_discount(&mut self, discount_percent: Decimal) {
        let total = self.total_cart_price;
        let discounted = (total - total * discount_percent / Decimal::from(100u32))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        self.total_price_after_discount = Some(discounted);
        self.updated_at = Utc::now();
    }

    /// The order price: discounted total when a coupon is applied, else the
    /// plain total.
    pub fn effective_price(&self) -> Decimal {
        self.total_price_after_discount
            .unwrap_or(self.total_cart_price)
    }

    fn recompute(&mut self) {
        self.total_cart_price = self
            .cart_items
            .iter()
            .map(CartItem::line_total)
            .sum::<Decimal>();
        self.total_price_after_discount = None;
        self.updated_at = Utc::now();
    }
}
