use chrono::{DateTime, Utc};
use mongodb::bson::{doc, Document};
use shared::{Category, CategoryChanges, NewCategory};

use super::{
    document_id, optional_string, optional_timestamp, required_string, set_value,
    timestamp_bson, Repository, Resource, CREATED_AT,
};
use crate::store::StoreResult;

pub type CategoryRepository = Repository<Category>;

impl Resource for Category {
    const COLLECTION: &'static str = "Categories";

    type New = NewCategory;
    type Changes = CategoryChanges;

    fn new_document(input: NewCategory, created_at: DateTime<Utc>) -> Document {
        doc! {
            "name": input.name,
            "color": input.color,
            "description": input.description,
            "createdAt": timestamp_bson(created_at),
        }
    }

    fn changes_document(changes: &CategoryChanges) -> Document {
        let mut set = Document::new();
        set_value(&mut set, "name", changes.name.clone());
        set_value(&mut set, "color", changes.color.clone());
        set_value(&mut set, "description", changes.description.clone());
        set
    }

    fn from_document(document: Document) -> StoreResult<Self> {
        Ok(Category {
            id: document_id(&document)?,
            name: required_string(&document, "name")?,
            color: optional_string(&document, "color"),
            description: optional_string(&document, "description"),
            created_at: optional_timestamp(&document, CREATED_AT),
        })
    }
}
