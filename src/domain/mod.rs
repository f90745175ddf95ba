//! Domain model: users, catalog, reviews, coupons, carts, orders.

pub mod cart;
pub mod catalog;
pub mod coupon;
pub mod order;
pub mod product;
pub mod review;
pub mod user;

/// URL-friendly slug derived from a display name.
pub fn slugify(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Summer Collection"), "summer-collection");
        assert_eq!(slugify("  Hats "), "hats");
    }
}
