//! In-process keyed document store.
//!
//! The persistence engine is an external collaborator; this store stands in
//! for it with the same dynamic-filter semantics. Collections keep documents
//! in insertion order. Every mutation runs inside a single lock acquisition,
//! so a read-modify-write sequence cannot lose updates to a concurrent caller.

use std::collections::{HashMap, HashSet};

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::cart::Cart;

/// A stored document addressable by id.
pub trait Document: Clone + Send + Sync + 'static {
    fn id(&self) -> Uuid;
}

/// One collection of documents, insertion-ordered.
pub struct Collection<T: Document> {
    docs: RwLock<Vec<T>>,
}

impl<T: Document> Default for Collection<T> {
    fn default() -> Self {
        Self {
            docs: RwLock::new(Vec::new()),
        }
    }
}

impl<T: Document> Collection<T> {
    pub async fn insert(&self, doc: T) -> T {
        let mut docs = self.docs.write().await;
        docs.push(doc.clone());
        doc
    }

    pub async fn get(&self, id: Uuid) -> Option<T> {
        let docs = self.docs.read().await;
        docs.iter().find(|d| d.id() == id).cloned()
    }

    pub async fn find<P>(&self, predicate: P) -> Option<T>
    where
        P: Fn(&T) -> bool,
    {
        let docs = self.docs.read().await;
        docs.iter().find(|d| predicate(d)).cloned()
    }

    pub async fn filter<P>(&self, predicate: P) -> Vec<T>
    where
        P: Fn(&T) -> bool,
    {
        let docs = self.docs.read().await;
        docs.iter().filter(|d| predicate(d)).cloned().collect()
    }

    pub async fn all(&self) -> Vec<T> {
        self.docs.read().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.docs.read().await.len()
    }

    /// Mutate the document with the given id in place. Returns the updated
    /// document, or `None` if it does not exist.
    pub async fn update<F>(&self, id: Uuid, f: F) -> Option<T>
    where
        F: FnOnce(&mut T),
    {
        let mut docs = self.docs.write().await;
        let doc = docs.iter_mut().find(|d| d.id() == id)?;
        f(doc);
        Some(doc.clone())
    }

    /// Apply a mutation to every document under one write lock. Used for the
    /// order pipeline's inventory adjustment, which must be one atomic pass.
    pub async fn bulk_update<F>(&self, mut f: F)
    where
        F: FnMut(&mut T),
    {
        let mut docs = self.docs.write().await;
        for doc in docs.iter_mut() {
            f(doc);
        }
    }

    pub async fn remove(&self, id: Uuid) -> Option<T> {
        let mut docs = self.docs.write().await;
        let index = docs.iter().position(|d| d.id() == id)?;
        Some(docs.remove(index))
    }
}

/// Carts keyed by owning user: one active cart per user, enforced here at the
/// access layer rather than by a database uniqueness constraint.
#[derive(Default)]
pub struct CartStore {
    carts: RwLock<HashMap<Uuid, Cart>>,
}

impl CartStore {
    pub async fn get(&self, user_id: Uuid) -> Option<Cart> {
        self.carts.read().await.get(&user_id).cloned()
    }

    pub async fn find_by_id(&self, cart_id: Uuid) -> Option<Cart> {
        let carts = self.carts.read().await;
        carts.values().find(|c| c.id == cart_id).cloned()
    }

    /// Fetch-or-create the user's cart and mutate it under the write lock.
    pub async fn upsert_with<F>(&self, user_id: Uuid, f: F) -> Cart
    where
        F: FnOnce(&mut Cart),
    {
        let mut carts = self.carts.write().await;
        let cart = carts.entry(user_id).or_insert_with(|| Cart::new(user_id));
        f(cart);
        cart.clone()
    }

    /// Mutate the user's cart if it exists; the closure's result is returned
    /// alongside the updated cart.
    pub async fn update_with<F, R>(&self, user_id: Uuid, f: F) -> Option<(Cart, R)>
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut carts = self.carts.write().await;
        let cart = carts.get_mut(&user_id)?;
        let out = f(cart);
        Some((cart.clone(), out))
    }

    pub async fn remove(&self, user_id: Uuid) -> Option<Cart> {
        self.carts.write().await.remove(&user_id)
    }

    pub async fn remove_by_id(&self, cart_id: Uuid) -> Option<Cart> {
        let mut carts = self.carts.write().await;
        let user_id = carts
            .iter()
            .find(|(_, c)| c.id == cart_id)
            .map(|(u, _)| *u)?;
        carts.remove(&user_id)
    }
}

/// Ledger of payment-provider event ids that already took effect. Guards the
/// webhook against duplicate delivery of the same confirmation event.
#[derive(Default)]
pub struct ProcessedEvents {
    seen: RwLock<HashSet<String>>,
}

impl ProcessedEvents {
    /// Record an event id. Returns `false` if it was already processed.
    pub async fn mark(&self, event_id: &str) -> bool {
        self.seen.write().await.insert(event_id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Doc {
        id: Uuid,
        n: i32,
    }

    impl Document for Doc {
        fn id(&self) -> Uuid {
            self.id
        }
    }

    #[tokio::test]
    async fn test_collection_crud() {
        let coll = Collection::<Doc>::default();
        let doc = coll.insert(Doc { id: Uuid::new_v4(), n: 1 }).await;
        assert_eq!(coll.count().await, 1);

        coll.update(doc.id, |d| d.n = 2).await.unwrap();
        assert_eq!(coll.get(doc.id).await.unwrap().n, 2);

        assert!(coll.remove(doc.id).await.is_some());
        assert!(coll.get(doc.id).await.is_none());
    }

    #[tokio::test]
    async fn test_cart_store_one_cart_per_user() {
        let store = CartStore::default();
        let user = Uuid::new_v4();
        let first = store.upsert_with(user, |_| {}).await;
        let second = store.upsert_with(user, |_| {}).await;
        assert_eq!(first.id, second.id);
        assert!(store.find_by_id(first.id).await.is_some());

        store.remove_by_id(first.id).await.unwrap();
        assert!(store.get(user).await.is_none());
    }

    #[tokio::test]
    async fn test_processed_events_dedup() {
        let ledger = ProcessedEvents::default();
        assert!(ledger.mark("evt_1").await);
        assert!(!ledger.mark("evt_1").await);
        assert!(ledger.mark("evt_2").await);
    }
}
