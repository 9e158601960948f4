//! Resource repositories
//!
//! [`Repository`] implements list/get/create/update/delete once, for any type
//! implementing [`Resource`]. A `Resource` only describes how its sanitized
//! input maps onto a stored document and how a stored document maps back.
//! Identifiers arrive as [`DocumentId`], so nothing unvalidated reaches the
//! store.

pub mod categories;
pub mod items;

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use mongodb::bson::{self, Bson, Document};
use shared::{whole_quantity, DocumentId, Patch};
use thiserror::Error;

use crate::store::{from_object_id, DocumentStore, StoreError, StoreResult};

/// Name of the creation timestamp field in stored documents
pub const CREATED_AT: &str = "createdAt";

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("update contains no fields")]
    EmptyUpdate,
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Mapping between a resource type and its stored document shape
pub trait Resource: Sized + Send + Sync + 'static {
    /// Collection holding this resource
    const COLLECTION: &'static str;

    /// Sanitized create payload
    type New: Send + 'static;

    /// Sanitized partial update
    type Changes: Send + Sync + 'static;

    /// Full document for a new resource, without `_id`
    fn new_document(input: Self::New, created_at: DateTime<Utc>) -> Document;

    /// `$set` body for an update; empty when the changes carry no fields
    fn changes_document(changes: &Self::Changes) -> Document;

    fn from_document(document: Document) -> StoreResult<Self>;
}

pub struct Repository<R> {
    store: Arc<dyn DocumentStore>,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for Repository<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> Repository<R> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _resource: PhantomData,
        }
    }

    /// Every stored resource. Documents that cannot be decoded are skipped
    /// with a warning so one bad record does not hide the rest.
    pub async fn list_all(&self) -> RepositoryResult<Vec<R>> {
        let documents = self.store.find_all(R::COLLECTION).await?;
        let resources = documents
            .into_iter()
            .filter_map(|document| {
                let id = document.get("_id").cloned();
                match R::from_document(document) {
                    Ok(resource) => Some(resource),
                    Err(err) => {
                        tracing::warn!(
                            collection = R::COLLECTION,
                            id = ?id,
                            error = %err,
                            "skipping undecodable document"
                        );
                        None
                    }
                }
            })
            .collect();
        Ok(resources)
    }

    pub async fn get_by_id(&self, id: DocumentId) -> RepositoryResult<Option<R>> {
        match self.store.find_by_id(R::COLLECTION, id).await? {
            Some(document) => Ok(Some(R::from_document(document)?)),
            None => Ok(None),
        }
    }

    /// Insert a new resource and return it as stored, generated fields included
    pub async fn create(&self, input: R::New) -> RepositoryResult<R> {
        let document = R::new_document(input, Utc::now());
        let id = self.store.insert_one(R::COLLECTION, document).await?;

        let stored = self
            .store
            .find_by_id(R::COLLECTION, id)
            .await?
            .ok_or(StoreError::Missing(id))?;
        Ok(R::from_document(stored)?)
    }

    /// Apply the supplied fields; `Ok(None)` when no resource has this id
    pub async fn update(
        &self,
        id: DocumentId,
        changes: &R::Changes,
    ) -> RepositoryResult<Option<R>> {
        let set = R::changes_document(changes);
        if set.is_empty() {
            return Err(RepositoryError::EmptyUpdate);
        }

        match self.store.update_by_id(R::COLLECTION, id, set).await? {
            Some(document) => Ok(Some(R::from_document(document)?)),
            None => Ok(None),
        }
    }

    /// `Ok(false)` when no resource has this id
    pub async fn delete(&self, id: DocumentId) -> RepositoryResult<bool> {
        Ok(self.store.delete_by_id(R::COLLECTION, id).await?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Document field helpers
// ─────────────────────────────────────────────────────────────────────────────

pub(crate) fn document_id(document: &Document) -> StoreResult<DocumentId> {
    match document.get("_id") {
        Some(Bson::ObjectId(oid)) => Ok(from_object_id(*oid)),
        other => Err(StoreError::Decode(format!("_id is not an ObjectId: {:?}", other))),
    }
}

pub(crate) fn required_string(document: &Document, key: &str) -> StoreResult<String> {
    optional_string(document, key)
        .ok_or_else(|| StoreError::Decode(format!("{} is missing or not a string", key)))
}

/// Text value of a field; scalar values written by older clients are stringified
pub(crate) fn optional_string(document: &Document, key: &str) -> Option<String> {
    match document.get(key) {
        Some(Bson::String(s)) => Some(s.clone()),
        Some(Bson::Int32(n)) => Some(n.to_string()),
        Some(Bson::Int64(n)) => Some(n.to_string()),
        Some(Bson::Double(n)) => Some(match whole_quantity(*n) {
            Some(whole) => whole.to_string(),
            None => n.to_string(),
        }),
        Some(Bson::Boolean(b)) => Some(b.to_string()),
        _ => None,
    }
}

/// Numeric value of a field; numeric strings are parsed
pub(crate) fn optional_number(document: &Document, key: &str) -> Option<f64> {
    match document.get(key) {
        Some(Bson::Double(n)) => Some(*n),
        Some(Bson::Int32(n)) => Some(f64::from(*n)),
        Some(Bson::Int64(n)) => Some(*n as f64),
        Some(Bson::String(s)) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Whole numbers are stored as integers
pub(crate) fn number_bson(value: f64) -> Bson {
    match whole_quantity(value) {
        Some(whole) => Bson::Int64(whole),
        None => Bson::Double(value),
    }
}

pub(crate) fn optional_timestamp(document: &Document, key: &str) -> Option<DateTime<Utc>> {
    match document.get(key) {
        Some(Bson::DateTime(dt)) => {
            DateTime::<Utc>::from_timestamp_millis(dt.timestamp_millis())
        }
        _ => None,
    }
}

pub(crate) fn timestamp_bson(at: DateTime<Utc>) -> Bson {
    Bson::DateTime(bson::DateTime::from_millis(at.timestamp_millis()))
}

/// `None` is stored as an explicit null so every document has the full field set
pub(crate) fn nullable<T: Into<Bson>>(value: Option<T>) -> Bson {
    value.map_or(Bson::Null, Into::into)
}

/// Add a field to a `$set` body unless it is absent
pub(crate) fn set_patch<T: Into<Bson>>(set: &mut Document, key: &str, patch: Patch<T>) {
    match patch {
        Patch::Absent => {}
        Patch::Null => {
            set.insert(key, Bson::Null);
        }
        Patch::Value(value) => {
            set.insert(key, value.into());
        }
    }
}

pub(crate) fn set_value<T: Into<Bson>>(set: &mut Document, key: &str, value: Option<T>) {
    if let Some(value) = value {
        set.insert(key, value.into());
    }
}
