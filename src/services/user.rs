//! Logged-user profile, wishlist, and address book.

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{hash_password, sign_token};
use crate::domain::product::Product;
use crate::domain::slugify;
use crate::domain::user::{Address, AddressInput, User};
use crate::error::{ApiError, Result};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMe {
    #[validate(length(min = 2, max = 50, message = "name must be 2-50 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "invalid e-mail address"))]
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePassword {
    #[validate(length(min = 6, message = "password too short"))]
    pub password: String,
}

fn no_user(user_id: Uuid) -> ApiError {
    ApiError::not_found(format!("No user for this id: {user_id}"))
}

pub async fn update_me(state: &AppState, user_id: Uuid, payload: UpdateMe) -> Result<User> {
    payload.validate()?;
    state
        .users
        .update(user_id, |user| {
            if let Some(name) = payload.name {
                user.slug = slugify(&name);
                user.name = name;
            }
            if let Some(email) = payload.email {
                user.email = email.to_lowercase();
            }
            if payload.phone.is_some() {
                user.phone = payload.phone;
            }
            user.touch();
        })
        .await
        .ok_or_else(|| no_user(user_id))
}

/// Change the caller's password, stamping `passwordChangedAt` so previously
/// issued tokens become stale, and hand back a fresh token.
pub async fn change_my_password(
    state: &AppState,
    user_id: Uuid,
    payload: ChangePassword,
) -> Result<(User, String)> {
    payload.validate()?;
    let password_hash = hash_password(&payload.password)?;
    let user = state
        .users
        .update(user_id, |user| {
            user.password_hash = password_hash;
            user.password_changed_at = Some(chrono::Utc::now());
            user.touch();
        })
        .await
        .ok_or_else(|| no_user(user_id))?;
    let token = sign_token(&state.config, user.id)?;
    Ok((user, token))
}

/// Admin-side password reset for any user.
pub async fn change_user_password(
    state: &AppState,
    user_id: Uuid,
    payload: ChangePassword,
) -> Result<User> {
    payload.validate()?;
    let password_hash = hash_password(&payload.password)?;
    state
        .users
        .update(user_id, |user| {
            user.password_hash = password_hash;
            user.password_changed_at = Some(chrono::Utc::now());
            user.touch();
        })
        .await
        .ok_or_else(|| no_user(user_id))
}

/// Soft-delete: the account stays but can no longer authenticate.
pub async fn deactivate_me(state: &AppState, user_id: Uuid) -> Result<()> {
    state
        .users
        .update(user_id, |user| {
            user.active = false;
            user.touch();
        })
        .await
        .ok_or_else(|| no_user(user_id))?;
    Ok(())
}

/// Add a product to the wishlist with set semantics.
pub async fn add_to_wishlist(
    state: &AppState,
    user_id: Uuid,
    product_id: Uuid,
) -> Result<Vec<Uuid>> {
    state
        .products
        .get(product_id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("No product for this id: {product_id}")))?;

    let user = state
        .users
        .update(user_id, |user| {
            if !user.wishlist.contains(&product_id) {
                user.wishlist.push(product_id);
            }
            user.touch();
        })
        .await
        .ok_or_else(|| no_user(user_id))?;
    Ok(user.wishlist)
}

pub async fn remove_from_wishlist(
    state: &AppState,
    user_id: Uuid,
    product_id: Uuid,
) -> Result<Vec<Uuid>> {
    let user = state
        .users
        .update(user_id, |user| {
            user.wishlist.retain(|p| *p != product_id);
            user.touch();
        })
        .await
        .ok_or_else(|| no_user(user_id))?;
    Ok(user.wishlist)
}

/// The wishlist resolved to product documents; ids whose product has since
/// been deleted are skipped.
pub async fn get_wishlist(state: &AppState, user: &User) -> Result<Vec<Product>> {
    let mut products = Vec::with_capacity(user.wishlist.len());
    for product_id in &user.wishlist {
        if let Some(product) = state.products.get(*product_id).await {
            products.push(product);
        }
    }
    Ok(products)
}

pub async fn add_address(
    state: &AppState,
    user_id: Uuid,
    payload: AddressInput,
) -> Result<Vec<Address>> {
    payload.validate()?;
    let address = payload.into_address();
    let user = state
        .users
        .update(user_id, |user| {
            user.addresses.push(address);
            user.touch();
        })
        .await
        .ok_or_else(|| no_user(user_id))?;
    Ok(user.addresses)
}

pub async fn remove_address(
    state: &AppState,
    user_id: Uuid,
    address_id: Uuid,
) -> Result<Vec<Address>> {
    let user = state
        .users
        .update(user_id, |user| {
            user.addresses.retain(|a| a.id != address_id);
            user.touch();
        })
        .await
        .ok_or_else(|| no_user(user_id))?;
    Ok(user.addresses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::domain::user::Role;
    use crate::test_support::{seed_product, seed_user};

    #[tokio::test]
    async fn test_wishlist_set_semantics() {
        let state = AppState::new(Config::default(), Default::default());
        let user = seed_user(&state, "w@example.com", Role::User).await;
        let product = seed_product(&state, "Wished Widget", 3, 10).await;

        let wishlist = add_to_wishlist(&state, user.id, product.id).await.unwrap();
        assert_eq!(wishlist.len(), 1);
        let wishlist = add_to_wishlist(&state, user.id, product.id).await.unwrap();
        assert_eq!(wishlist.len(), 1);

        let resolved = get_wishlist(&state, &state.users.get(user.id).await.unwrap())
            .await
            .unwrap();
        assert_eq!(resolved[0].id, product.id);

        let wishlist = remove_from_wishlist(&state, user.id, product.id).await.unwrap();
        assert!(wishlist.is_empty());
    }

    #[tokio::test]
    async fn test_address_book() {
        let state = AppState::new(Config::default(), Default::default());
        let user = seed_user(&state, "a@example.com", Role::User).await;

        let addresses = add_address(
            &state,
            user.id,
            AddressInput {
                alias: "Home".into(),
                details: "12 Long Street".into(),
                phone: None,
                city: Some("Cairo".into()),
                postal_code: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(addresses.len(), 1);

        let addresses = remove_address(&state, user.id, addresses[0].id).await.unwrap();
        assert!(addresses.is_empty());
    }

    #[tokio::test]
    async fn test_password_change_stamps_changed_at() {
        let state = AppState::new(Config::default(), Default::default());
        let user = seed_user(&state, "p@example.com", Role::User).await;

        let (updated, token) = change_my_password(
            &state,
            user.id,
            ChangePassword {
                password: "new-secret".into(),
            },
        )
        .await
        .unwrap();
        assert!(updated.password_changed_at.is_some());
        assert!(!token.is_empty());
        assert!(crate::auth::verify_password(
            "new-secret",
            &updated.password_hash
        ));
    }

    #[tokio::test]
    async fn test_deactivate_me() {
        let state = AppState::new(Config::default(), Default::default());
        let user = seed_user(&state, "d@example.com", Role::User).await;
        deactivate_me(&state, user.id).await.unwrap();
        assert!(!state.users.get(user.id).await.unwrap().active);
    }
}
