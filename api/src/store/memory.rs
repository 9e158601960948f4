//! In-process document store
//!
//! Keeps collections as vectors of BSON documents. Besides standing in for
//! MongoDB in tests, it counts every operation it serves and can be switched
//! into an "unavailable" state to exercise storage failure paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Bson, Document};
use shared::DocumentId;
use tokio::sync::RwLock;

use super::{from_object_id, to_object_id, DocumentStore, StoreError, StoreResult};

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
    operations: AtomicUsize,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store calls served so far (including failed ones)
    pub fn operations(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }

    /// Make every subsequent call fail with a connection error
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Document count of a collection, read without counting as an operation
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }

    fn begin(&self) -> StoreResult<()> {
        self.operations.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Connection("memory store marked unavailable".to_string()));
        }
        Ok(())
    }
}

fn matches_id(document: &Document, oid: &ObjectId) -> bool {
    matches!(document.get("_id"), Some(Bson::ObjectId(existing)) if existing == oid)
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_all(&self, collection: &str) -> StoreResult<Vec<Document>> {
        self.begin()?;
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default())
    }

    async fn find_by_id(&self, collection: &str, id: DocumentId) -> StoreResult<Option<Document>> {
        self.begin()?;
        let oid = to_object_id(id);
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| matches_id(d, &oid)).cloned()))
    }

    async fn insert_one(
        &self,
        collection: &str,
        mut document: Document,
    ) -> StoreResult<DocumentId> {
        self.begin()?;
        let oid = match document.get("_id") {
            Some(Bson::ObjectId(existing)) => *existing,
            _ => {
                let generated = ObjectId::new();
                document.insert("_id", generated);
                generated
            }
        };

        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        if docs.iter().any(|d| matches_id(d, &oid)) {
            return Err(StoreError::Query(format!("duplicate _id {}", oid)));
        }
        docs.push(document);
        Ok(from_object_id(oid))
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: DocumentId,
        set: Document,
    ) -> StoreResult<Option<Document>> {
        self.begin()?;
        let oid = to_object_id(id);
        let mut collections = self.collections.write().await;
        let Some(document) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| matches_id(d, &oid)))
        else {
            return Ok(None);
        };

        for (key, value) in set {
            document.insert(key, value);
        }
        Ok(Some(document.clone()))
    }

    async fn delete_by_id(&self, collection: &str, id: DocumentId) -> StoreResult<bool> {
        self.begin()?;
        let oid = to_object_id(id);
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };

        let before = docs.len();
        docs.retain(|d| !matches_id(d, &oid));
        Ok(docs.len() < before)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.begin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[tokio::test]
    async fn insert_assigns_unique_ids() {
        let store = MemoryStore::new();
        let a = store.insert_one("Items", doc! { "name": "a" }).await.unwrap();
        let b = store.insert_one("Items", doc! { "name": "b" }).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(store.count("Items").await, 2);
        assert_eq!(store.operations(), 2);
    }

    #[tokio::test]
    async fn update_sets_only_given_fields() {
        let store = MemoryStore::new();
        let id = store
            .insert_one("Items", doc! { "name": "milk", "purchased": false })
            .await
            .unwrap();

        let updated = store
            .update_by_id("Items", id, doc! { "purchased": true })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.get_str("name").unwrap(), "milk");
        assert!(updated.get_bool("purchased").unwrap());
    }

    #[tokio::test]
    async fn missing_documents_are_not_errors() {
        let store = MemoryStore::new();
        let id = DocumentId::parse("65f1a2b3c4d5e6f708192a3b").unwrap();
        assert!(store.find_by_id("Items", id).await.unwrap().is_none());
        assert!(store
            .update_by_id("Items", id, doc! { "name": "x" })
            .await
            .unwrap()
            .is_none());
        assert!(!store.delete_by_id("Items", id).await.unwrap());
    }

    #[tokio::test]
    async fn delete_removes_document() {
        let store = MemoryStore::new();
        let id = store.insert_one("Items", doc! { "name": "a" }).await.unwrap();
        assert!(store.delete_by_id("Items", id).await.unwrap());
        assert!(!store.delete_by_id("Items", id).await.unwrap());
        assert_eq!(store.count("Items").await, 0);
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_call() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            store.find_all("Items").await,
            Err(StoreError::Connection(_))
        ));
        assert!(store.ping().await.is_err());

        store.set_unavailable(false);
        assert!(store.ping().await.is_ok());
    }
}
