use chrono::{DateTime, Utc};
use mongodb::bson::{doc, Document};
use shared::{Item, ItemChanges, NewItem, Priority};

use super::{
    document_id, nullable, number_bson, optional_number, optional_string, optional_timestamp,
    required_string, set_patch, set_value, timestamp_bson, Repository, Resource, CREATED_AT,
};
use crate::store::StoreResult;

pub type ItemRepository = Repository<Item>;

fn priority_name(priority: Priority) -> &'static str {
    priority.as_str()
}

impl Resource for Item {
    const COLLECTION: &'static str = "Items";

    type New = NewItem;
    type Changes = ItemChanges;

    fn new_document(input: NewItem, created_at: DateTime<Utc>) -> Document {
        doc! {
            "name": input.name,
            "quantity": nullable(input.quantity.map(number_bson)),
            "unit": nullable(input.unit),
            "category": nullable(input.category),
            "store": nullable(input.store),
            "priority": nullable(input.priority.map(priority_name)),
            "purchased": input.purchased,
            "notes": nullable(input.notes),
            "createdAt": timestamp_bson(created_at),
        }
    }

    fn changes_document(changes: &ItemChanges) -> Document {
        let mut set = Document::new();
        set_value(&mut set, "name", changes.name.clone());
        set_patch(&mut set, "quantity", changes.quantity.clone().map(number_bson));
        set_patch(&mut set, "unit", changes.unit.clone());
        set_patch(&mut set, "category", changes.category.clone());
        set_patch(&mut set, "store", changes.store.clone());
        set_patch(&mut set, "priority", changes.priority.clone().map(priority_name));
        set_value(&mut set, "purchased", changes.purchased);
        set_patch(&mut set, "notes", changes.notes.clone());
        set
    }

    fn from_document(document: Document) -> StoreResult<Self> {
        Ok(Item {
            id: document_id(&document)?,
            name: required_string(&document, "name")?,
            quantity: optional_number(&document, "quantity"),
            unit: optional_string(&document, "unit"),
            category: optional_string(&document, "category"),
            store: optional_string(&document, "store"),
            // Values written by older clients may use other casings
            priority: optional_string(&document, "priority").and_then(|p| p.parse().ok()),
            purchased: document.get_bool("purchased").unwrap_or(false),
            notes: optional_string(&document, "notes"),
            created_at: optional_timestamp(&document, CREATED_AT),
        })
    }
}
