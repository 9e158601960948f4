use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use utoipa::ToSchema;

use crate::id::DocumentId;

// ═══════════════════════════════════════════════════════════════════════════
// STORED RESOURCES
// ═══════════════════════════════════════════════════════════════════════════

/// A shopping list entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(rename = "_id")]
    #[schema(value_type = String, example = "65f1a2b3c4d5e6f708192a3b")]
    pub id: DocumentId,
    #[schema(example = "Milk")]
    pub name: String,
    #[schema(example = 2)]
    #[serde(serialize_with = "serialize_quantity")]
    pub quantity: Option<f64>,
    #[schema(example = "gallon")]
    pub unit: Option<String>,
    #[schema(example = "Dairy")]
    pub category: Option<String>,
    #[schema(example = "Walmart")]
    pub store: Option<String>,
    pub priority: Option<Priority>,
    pub purchased: bool,
    #[schema(example = "2% preferred")]
    pub notes: Option<String>,
    /// Absent on documents written before creation timestamps were recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Largest magnitude below which every whole `f64` is an exact integer
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// The quantity as an integer when it has no fractional part
pub fn whole_quantity(quantity: f64) -> Option<i64> {
    (quantity.fract() == 0.0 && quantity.abs() <= MAX_EXACT_INTEGER).then_some(quantity as i64)
}

fn serialize_quantity<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(n) => match whole_quantity(*n) {
            Some(whole) => serializer.serialize_some(&whole),
            None => serializer.serialize_some(n),
        },
        None => serializer.serialize_none(),
    }
}

/// A named grouping for items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id")]
    #[schema(value_type = String, example = "65f1a2b3c4d5e6f708192a3c")]
    pub id: DocumentId,
    #[schema(example = "Dairy")]
    pub name: String,
    #[schema(example = "blue")]
    pub color: Option<String>,
    #[schema(example = "Milk, cheese and yogurt")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Item priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    /// Case-insensitive; `"high"` and `"HIGH"` both yield `Priority::High`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown priority: {}", s))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SANITIZED INPUT
// ═══════════════════════════════════════════════════════════════════════════

/// Presence state of a field in a partial update.
///
/// `Absent` leaves the stored value alone, `Null` clears it, `Value` replaces it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Patch<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Patch<U> {
        match self {
            Patch::Absent => Patch::Absent,
            Patch::Null => Patch::Null,
            Patch::Value(v) => Patch::Value(f(v)),
        }
    }

    /// `None` when absent, `Some(None)` when explicitly null
    pub fn into_option(self) -> Option<Option<T>> {
        match self {
            Patch::Absent => None,
            Patch::Null => Some(None),
            Patch::Value(v) => Some(Some(v)),
        }
    }

    /// Collapse to a stored value, treating absence as null
    pub fn or_null(self) -> Option<T> {
        self.into_option().flatten()
    }
}

/// Validated payload for creating an item
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub category: Option<String>,
    pub store: Option<String>,
    pub priority: Option<Priority>,
    pub purchased: bool,
    pub notes: Option<String>,
}

impl NewItem {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: None,
            unit: None,
            category: None,
            store: None,
            priority: None,
            purchased: false,
            notes: None,
        }
    }
}

/// Validated partial update for an item; non-nullable fields use `Option`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemChanges {
    pub name: Option<String>,
    pub quantity: Patch<f64>,
    pub unit: Patch<String>,
    pub category: Patch<String>,
    pub store: Patch<String>,
    pub priority: Patch<Priority>,
    pub purchased: Option<bool>,
    pub notes: Patch<String>,
}

impl ItemChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.quantity.is_absent()
            && self.unit.is_absent()
            && self.category.is_absent()
            && self.store.is_absent()
            && self.priority.is_absent()
            && self.purchased.is_none()
            && self.notes.is_absent()
    }
}

/// Validated payload for creating a category
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub name: String,
    pub color: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
}

impl CategoryChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none() && self.description.is_none()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// DOCUMENTED REQUEST BODIES
// ═══════════════════════════════════════════════════════════════════════════

/// Item request body as published in the API description
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ItemPayload {
    #[schema(example = "Milk", max_length = 80)]
    pub name: Option<String>,
    #[schema(example = 2, minimum = 0)]
    pub quantity: Option<f64>,
    #[schema(example = "gallon", max_length = 30)]
    pub unit: Option<String>,
    #[schema(example = "Dairy", max_length = 40)]
    pub category: Option<String>,
    #[schema(example = "Walmart", max_length = 40)]
    pub store: Option<String>,
    pub priority: Option<Priority>,
    #[schema(example = false)]
    pub purchased: Option<bool>,
    #[schema(example = "2% preferred", max_length = 200)]
    pub notes: Option<String>,
}

/// Category request body as published in the API description
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryPayload {
    #[schema(example = "Dairy", max_length = 80)]
    pub name: Option<String>,
    #[schema(example = "blue", max_length = 30)]
    pub color: Option<String>,
    #[schema(example = "Milk, cheese and yogurt", max_length = 200)]
    pub description: Option<String>,
}
