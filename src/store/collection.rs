//! A typed, in-memory document collection.

use crate::store::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

/// A document that lives in exactly one collection and is keyed by its id.
pub trait Document: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection name, used in errors and logs.
    const COLLECTION: &'static str;

    fn id(&self) -> Uuid;
}

/// Documents of one type. Every method takes the lock once, so a single call is atomic
/// with respect to the collection; nothing spans several calls or collections.
#[derive(Debug)]
pub struct Collection<T: Document> {
    docs: RwLock<BTreeMap<Uuid, T>>,
}

impl<T: Document> Default for Collection<T> {
    fn default() -> Self {
        Self {
            docs: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<T: Document> Collection<T> {
    pub fn from_docs(docs: Vec<T>) -> Self {
        Self {
            docs: RwLock::new(docs.into_iter().map(|d| (d.id(), d)).collect()),
        }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Option<T> {
        self.docs.read().await.get(&id).cloned()
    }

    /// Like `find_by_id`, but a missing document is an error.
    pub async fn get(&self, id: Uuid) -> Result<T, StoreError> {
        self.find_by_id(id).await.ok_or(StoreError::NotFound {
            collection: T::COLLECTION,
            id,
        })
    }

    pub async fn exists(&self, id: Uuid) -> bool {
        self.docs.read().await.contains_key(&id)
    }

    pub async fn find<F>(&self, filter: F) -> Vec<T>
    where
        F: Fn(&T) -> bool,
    {
        self.docs
            .read()
            .await
            .values()
            .filter(|d| filter(d))
            .cloned()
            .collect()
    }

    pub async fn find_one<F>(&self, filter: F) -> Option<T>
    where
        F: Fn(&T) -> bool,
    {
        self.docs.read().await.values().find(|d| filter(d)).cloned()
    }

    pub async fn all(&self) -> Vec<T> {
        self.docs.read().await.values().cloned().collect()
    }

    pub async fn ids(&self) -> HashSet<Uuid> {
        self.docs.read().await.keys().copied().collect()
    }

    pub async fn count(&self) -> usize {
        self.docs.read().await.len()
    }

    pub async fn create(&self, doc: T) -> Result<T, StoreError> {
        let mut docs = self.docs.write().await;
        let id = doc.id();
        if docs.contains_key(&id) {
            return Err(StoreError::Duplicate {
                collection: T::COLLECTION,
                id,
            });
        }
        docs.insert(id, doc.clone());
        Ok(doc)
    }

    pub async fn create_many(&self, new_docs: Vec<T>) -> Result<usize, StoreError> {
        let mut docs = self.docs.write().await;
        if let Some(dup) = new_docs.iter().find(|d| docs.contains_key(&d.id())) {
            return Err(StoreError::Duplicate {
                collection: T::COLLECTION,
                id: dup.id(),
            });
        }
        let n = new_docs.len();
        docs.extend(new_docs.into_iter().map(|d| (d.id(), d)));
        Ok(n)
    }

    /// Read-modify-write of one document under the write lock (array push/pull goes through here).
    pub async fn update<F>(&self, id: Uuid, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut T),
    {
        let mut docs = self.docs.write().await;
        let doc = docs.get_mut(&id).ok_or(StoreError::NotFound {
            collection: T::COLLECTION,
            id,
        })?;
        f(doc);
        Ok(doc.clone())
    }

    /// Like `update`, but the closure may reject the change. On `Err` the stored
    /// document is left untouched.
    pub async fn try_update<E, F>(&self, id: Uuid, f: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut T) -> Result<(), E>,
    {
        let mut docs = self.docs.write().await;
        let current = docs.get(&id).ok_or(StoreError::NotFound {
            collection: T::COLLECTION,
            id,
        })?;
        let mut next = current.clone();
        f(&mut next)?;
        docs.insert(id, next.clone());
        Ok(next)
    }

    /// Apply `update` to every document matching `filter`. Returns how many matched.
    pub async fn update_many<F, U>(&self, filter: F, mut update: U) -> usize
    where
        F: Fn(&T) -> bool,
        U: FnMut(&mut T),
    {
        let mut docs = self.docs.write().await;
        let mut n = 0;
        for doc in docs.values_mut().filter(|d| filter(d)) {
            update(doc);
            n += 1;
        }
        n
    }

    /// Remove one document, returning it if it existed.
    pub async fn delete(&self, id: Uuid) -> Option<T> {
        self.docs.write().await.remove(&id)
    }

    /// Remove every document matching `filter`. Returns how many were removed.
    pub async fn delete_many<F>(&self, filter: F) -> usize
    where
        F: Fn(&T) -> bool,
    {
        let mut docs = self.docs.write().await;
        let before = docs.len();
        docs.retain(|_, d| !filter(d));
        before - docs.len()
    }
}
