//! MongoDB-backed document store

use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, Bson, Document},
    options::ReturnDocument,
    Client, Collection, Database,
};
use shared::DocumentId;

use super::{from_object_id, to_object_id, DocumentStore, StoreError, StoreResult};

#[derive(Clone)]
pub struct MongoStore {
    database: Database,
}

impl MongoStore {
    /// Connect and verify the server answers before returning.
    ///
    /// The driver connects lazily, so the ping is what surfaces a bad URI or an
    /// unreachable host at startup rather than on the first request.
    pub async fn connect(uri: &str, database_name: &str) -> StoreResult<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let store = Self {
            database: client.database(database_name),
        };
        store.ping().await?;
        Ok(store)
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.database.collection::<Document>(name)
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn find_all(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let cursor = self
            .collection(collection)
            .find(doc! {})
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| StoreError::Query(e.to_string()))
    }

    async fn find_by_id(&self, collection: &str, id: DocumentId) -> StoreResult<Option<Document>> {
        self.collection(collection)
            .find_one(doc! { "_id": to_object_id(id) })
            .await
            .map_err(|e| StoreError::Query(e.to_string()))
    }

    async fn insert_one(&self, collection: &str, document: Document) -> StoreResult<DocumentId> {
        let result = self
            .collection(collection)
            .insert_one(document)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        match result.inserted_id {
            Bson::ObjectId(oid) => Ok(from_object_id(oid)),
            other => Err(StoreError::Decode(format!(
                "expected an ObjectId for the inserted _id, got {}",
                other
            ))),
        }
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: DocumentId,
        set: Document,
    ) -> StoreResult<Option<Document>> {
        self.collection(collection)
            .find_one_and_update(doc! { "_id": to_object_id(id) }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))
    }

    async fn delete_by_id(&self, collection: &str, id: DocumentId) -> StoreResult<bool> {
        let result = self
            .collection(collection)
            .delete_one(doc! { "_id": to_object_id(id) })
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(result.deleted_count > 0)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StoreError::Connection(format!("ping failed: {}", e)))?;
        Ok(())
    }
}
