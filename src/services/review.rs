//! Rating aggregation.

use chrono::Utc;
use uuid::Uuid;

use crate::AppState;

/// Recompute a product's average rating and rating count from all of its
/// reviews. Runs after every review create/update/delete; a product with no
/// reviews left goes back to unrated.
pub async fn recalc_ratings(state: &AppState, product_id: Uuid) {
    let reviews = state.reviews.filter(|r| r.product == product_id).await;

    let (average, quantity) = if reviews.is_empty() {
        (None, 0)
    } else {
        let sum: f64 = reviews.iter().map(|r| r.ratings).sum();
        (Some(sum / reviews.len() as f64), reviews.len() as u32)
    };

    state
        .products
        .update(product_id, |product| {
            product.ratings_average = average;
            product.ratings_quantity = quantity;
            product.updated_at = Utc::now();
        })
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::domain::review::{CreateReview, Review};
    use crate::services::factory;
    use crate::test_support::seed_product;
    use crate::AppState;

    #[tokio::test]
    async fn test_aggregation_after_create_and_delete() {
        let state = AppState::new(Config::default(), Default::default());
        let product = seed_product(&state, "Test Product", 10, 10).await;
        let user = Uuid::new_v4();

        let first: Review = factory::create_one(
            &state,
            CreateReview {
                title: None,
                ratings: 4.0,
                product: Some(product.id),
                user: Some(user),
            },
        )
        .await
        .unwrap();
        factory::create_one::<Review>(
            &state,
            CreateReview {
                title: None,
                ratings: 5.0,
                product: Some(product.id),
                user: Some(Uuid::new_v4()),
            },
        )
        .await
        .unwrap();

        let product_doc = state.products.get(product.id).await.unwrap();
        assert_eq!(product_doc.ratings_average, Some(4.5));
        assert_eq!(product_doc.ratings_quantity, 2);

        factory::delete_one::<Review>(&state, first.id).await.unwrap();
        let product_doc = state.products.get(product.id).await.unwrap();
        assert_eq!(product_doc.ratings_average, Some(5.0));
        assert_eq!(product_doc.ratings_quantity, 1);
    }

    #[tokio::test]
    async fn test_last_review_deleted_resets_rating() {
        let state = AppState::new(Config::default(), Default::default());
        let product = seed_product(&state, "Solo Review", 5, 10).await;

        let review: Review = factory::create_one(
            &state,
            CreateReview {
                title: Some("Nice".into()),
                ratings: 3.0,
                product: Some(product.id),
                user: Some(Uuid::new_v4()),
            },
        )
        .await
        .unwrap();

        factory::delete_one::<Review>(&state, review.id).await.unwrap();
        let product_doc = state.products.get(product.id).await.unwrap();
        assert_eq!(product_doc.ratings_average, None);
        assert_eq!(product_doc.ratings_quantity, 0);
    }
}
