//! Persistence collaborator
//!
//! Repositories talk to storage only through [`DocumentStore`], a small
//! collection-oriented CRUD interface over BSON documents. The server wires in
//! [`MongoStore`]; tests substitute [`MemoryStore`].

pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Document};
use shared::DocumentId;
use thiserror::Error;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Connection(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored document is malformed: {0}")]
    Decode(String),
    #[error("document {0} vanished after write")]
    Missing(DocumentId),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Generic single-document CRUD against named collections
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document in the collection, in storage order
    async fn find_all(&self, collection: &str) -> StoreResult<Vec<Document>>;

    async fn find_by_id(&self, collection: &str, id: DocumentId) -> StoreResult<Option<Document>>;

    /// Insert a document and return the identifier the store assigned to it
    async fn insert_one(&self, collection: &str, document: Document) -> StoreResult<DocumentId>;

    /// Apply `$set` with the given fields atomically and return the updated
    /// document, or `None` when nothing matched
    async fn update_by_id(
        &self,
        collection: &str,
        id: DocumentId,
        set: Document,
    ) -> StoreResult<Option<Document>>;

    /// `true` when a document was removed
    async fn delete_by_id(&self, collection: &str, id: DocumentId) -> StoreResult<bool>;

    async fn ping(&self) -> StoreResult<()>;
}

pub fn to_object_id(id: DocumentId) -> ObjectId {
    ObjectId::from_bytes(id.bytes())
}

pub fn from_object_id(oid: ObjectId) -> DocumentId {
    DocumentId::from_bytes(oid.bytes())
}
