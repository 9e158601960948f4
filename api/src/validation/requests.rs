//! Validation implementations for API request types
//!
//! Each request type names its rule set and builds itself from the sanitized
//! fields. By the time `from_fields` runs every value has the right type and
//! required fields are present.

use shared::{CategoryChanges, ItemChanges, NewCategory, NewItem};

use super::extractors::Validatable;
use super::rules::{Mode, RuleSet, SanitizedFields, CATEGORY_RULES, ITEM_RULES};

// ─────────────────────────────────────────────────────────────────────────────
// Items
// ─────────────────────────────────────────────────────────────────────────────

impl Validatable for NewItem {
    const MODE: Mode = Mode::Create;

    fn rules() -> &'static RuleSet {
        &ITEM_RULES
    }

    fn from_fields(fields: SanitizedFields) -> Self {
        NewItem {
            name: fields.text("name").or_null().unwrap_or_default(),
            quantity: fields.number("quantity").or_null(),
            unit: fields.text("unit").or_null(),
            category: fields.text("category").or_null(),
            store: fields.text("store").or_null(),
            priority: fields.priority("priority").or_null(),
            purchased: fields.boolean("purchased").unwrap_or(false),
            notes: fields.text("notes").or_null(),
        }
    }
}

impl Validatable for ItemChanges {
    const MODE: Mode = Mode::Update;

    fn rules() -> &'static RuleSet {
        &ITEM_RULES
    }

    fn from_fields(fields: SanitizedFields) -> Self {
        ItemChanges {
            name: fields.text("name").or_null(),
            quantity: fields.number("quantity"),
            unit: fields.text("unit"),
            category: fields.text("category"),
            store: fields.text("store"),
            priority: fields.priority("priority"),
            purchased: fields.boolean("purchased"),
            notes: fields.text("notes"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Categories
// ─────────────────────────────────────────────────────────────────────────────

fn required_text(fields: &SanitizedFields, field: &str) -> String {
    fields.text(field).or_null().unwrap_or_default()
}

impl Validatable for NewCategory {
    const MODE: Mode = Mode::Create;

    fn rules() -> &'static RuleSet {
        &CATEGORY_RULES
    }

    fn from_fields(fields: SanitizedFields) -> Self {
        NewCategory {
            name: required_text(&fields, "name"),
            color: required_text(&fields, "color"),
            description: required_text(&fields, "description"),
        }
    }
}

impl Validatable for CategoryChanges {
    const MODE: Mode = Mode::Update;

    fn rules() -> &'static RuleSet {
        &CATEGORY_RULES
    }

    fn from_fields(fields: SanitizedFields) -> Self {
        CategoryChanges {
            name: fields.text("name").or_null(),
            color: fields.text("color").or_null(),
            description: fields.text("description").or_null(),
        }
    }
}
