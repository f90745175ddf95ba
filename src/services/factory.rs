//! Generic resource operations.
//!
//! Create/read/list/update/delete parameterized over the entity type, so the
//! per-resource route modules stay thin. Listing always routes through the
//! query feature builder. Review writes carry the one entity-specific side
//! effect: rating aggregation on the parent product.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ApiError, Result};
use crate::query::{ApiFeatures, Pagination, SearchFields};
use crate::store::{Collection, Document};
use crate::AppState;

/// The closed set of resource kinds; per-kind branching is an explicit match
/// on this tag rather than a type-name comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Product,
    Category,
    SubCategory,
    Brand,
    Review,
    Coupon,
    User,
    Order,
}

impl ResourceKind {
    pub fn search_fields(self) -> SearchFields {
        match self {
            ResourceKind::Product => SearchFields::TitleAndDescription,
            _ => SearchFields::Name,
        }
    }
}

/// A resource that can be fetched and listed.
pub trait Listable: Document + Serialize + Sized {
    const KIND: ResourceKind;

    fn collection(state: &AppState) -> &Collection<Self>;
}

/// A resource with full CRUD through the generic handlers.
pub trait Resource: Listable {
    type Create: DeserializeOwned + Validate + Send + 'static;
    type Update: DeserializeOwned + Validate + Send + 'static;

    fn from_create(create: Self::Create) -> Result<Self>;
    fn apply_update(&mut self, update: Self::Update);

    /// Parent product for resources that feed rating aggregation.
    fn product_ref(&self) -> Option<Uuid> {
        None
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub results: usize,
    pub pagination_result: Pagination,
    pub data: Vec<Value>,
}

pub async fn create_one<T: Resource>(state: &AppState, payload: T::Create) -> Result<T> {
    payload.validate()?;
    let doc = T::from_create(payload)?;
    let doc = T::collection(state).insert(doc).await;
    after_write::<T>(state, &doc).await;
    Ok(doc)
}

pub async fn get_one<T: Listable>(state: &AppState, id: Uuid) -> Result<T> {
    T::collection(state)
        .get(id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("No document for this id: {id}")))
}

/// List a collection through filter/sort/search/fields/paginate. The base
/// filter holds handler-injected equality conditions (user scoping, nested
/// routes). `numberOfPages` derives from the unfiltered collection count.
pub async fn get_all<T: Listable>(
    state: &AppState,
    params: HashMap<String, String>,
    base_filter: Vec<(String, String)>,
) -> Result<ListResponse> {
    let collection = T::collection(state);
    let documents_count = collection.count().await;

    let mut values = Vec::with_capacity(documents_count);
    for doc in collection.all().await {
        let value = serde_json::to_value(&doc)
            .map_err(|e| ApiError::Internal(format!("serialization failed: {e}")))?;
        values.push(value);
    }

    let (data, pagination_result) = ApiFeatures::new(values, params)
        .base_filter(base_filter)
        .filter()
        .sort()
        .search(T::KIND.search_fields())
        .limit_fields()
        .paginate(documents_count)
        .into_parts();

    Ok(ListResponse {
        results: data.len(),
        pagination_result,
        data,
    })
}

pub async fn update_one<T: Resource>(
    state: &AppState,
    id: Uuid,
    payload: T::Update,
) -> Result<T> {
    payload.validate()?;
    let doc = T::collection(state)
        .update(id, |doc| doc.apply_update(payload))
        .await
        .ok_or_else(|| ApiError::not_found(format!("No document for this id: {id}")))?;
    after_write::<T>(state, &doc).await;
    Ok(doc)
}

pub async fn delete_one<T: Resource>(state: &AppState, id: Uuid) -> Result<()> {
    let doc = T::collection(state)
        .remove(id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("No document for this id: {id}")))?;
    after_write::<T>(state, &doc).await;
    Ok(())
}

async fn after_write<T: Resource>(state: &AppState, doc: &T) {
    match T::KIND {
        ResourceKind::Review => {
            if let Some(product) = doc.product_ref() {
                crate::services::review::recalc_ratings(state, product).await;
            }
        }
        _ => {}
    }
}
