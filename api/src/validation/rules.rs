//! Declarative field rules
//!
//! A [`RuleSet`] lists every accepted field of a resource together with its
//! kind, whether a create must supply it, and whether it may be cleared to
//! null. Applying a rule set to a raw JSON body yields [`SanitizedFields`]
//! containing only known fields, trimmed and coerced, or every field error at
//! once. Unknown keys never survive sanitization.

use std::collections::BTreeMap;

use serde_json::Value;
use shared::{Patch, Priority};

use super::extractors::{FieldError, ValidationBuilder};
use super::{sanitizers, validators};

pub const NO_VALID_FIELDS: &str = "No valid fields to update";

/// Whether a body creates a resource or updates one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Create,
    Update,
}

#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Trimmed string with a maximum length in characters
    Text { max_len: usize },
    /// Number or numeric string with a lower bound
    Number { min: f64 },
    /// Boolean or `"true"` / `"false"`
    Boolean,
    /// One of a fixed set of strings, matched case-insensitively
    Choice(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub nullable: bool,
    /// An update may set the field to an empty string
    pub blank_on_update: bool,
}

impl FieldRule {
    pub const fn text(field: &'static str, max_len: usize) -> Self {
        Self::optional(field, FieldKind::Text { max_len })
    }

    pub const fn number(field: &'static str, min: f64) -> Self {
        Self::optional(field, FieldKind::Number { min })
    }

    pub const fn boolean(field: &'static str) -> Self {
        Self::optional(field, FieldKind::Boolean).not_null()
    }

    pub const fn choice(field: &'static str, choices: &'static [&'static str]) -> Self {
        Self::optional(field, FieldKind::Choice(choices))
    }

    const fn optional(field: &'static str, kind: FieldKind) -> Self {
        Self {
            field,
            kind,
            required: false,
            nullable: true,
            blank_on_update: false,
        }
    }

    /// Must be supplied on create; implies not nullable
    pub const fn required(self) -> Self {
        Self {
            required: true,
            nullable: false,
            ..self
        }
    }

    /// Required on create, but an update may blank it
    pub const fn required_on_create(self) -> Self {
        Self {
            blank_on_update: true,
            ..self.required()
        }
    }

    pub const fn not_null(self) -> Self {
        Self {
            nullable: false,
            ..self
        }
    }

    fn type_message(&self) -> String {
        match self.kind {
            FieldKind::Text { .. } => format!("{} must be a string", self.field),
            FieldKind::Number { .. } => format!("{} must be a number", self.field),
            FieldKind::Boolean => format!("{} must be a boolean", self.field),
            FieldKind::Choice(choices) => {
                format!("{} must be one of {}", self.field, choices.join(", "))
            }
        }
    }

    fn missing_message(&self, mode: Mode) -> String {
        if mode == Mode::Create && self.required {
            format!("{} is required", self.field)
        } else {
            format!("{} cannot be empty", self.field)
        }
    }

    /// Check one raw value. `Ok(None)` means the field was absent.
    pub fn check(&self, raw: Option<&Value>, mode: Mode) -> Result<Option<FieldValue>, String> {
        let value = match raw {
            None if mode == Mode::Create && self.required => {
                return Err(self.missing_message(mode));
            }
            None => return Ok(None),
            Some(Value::Null) if mode == Mode::Create && self.required => {
                return Err(self.missing_message(mode));
            }
            Some(Value::Null) if self.nullable => return Ok(Some(FieldValue::Null)),
            Some(Value::Null) => return Err(self.type_message()),
            Some(value) => value,
        };

        let checked = match self.kind {
            FieldKind::Text { max_len } => {
                let raw = value.as_str().ok_or_else(|| self.type_message())?;
                let Some(text) = sanitizers::trim_to_none(raw) else {
                    if self.nullable {
                        return Ok(Some(FieldValue::Null));
                    }
                    if mode == Mode::Update && self.blank_on_update {
                        return Ok(Some(FieldValue::Text(String::new())));
                    }
                    return Err(self.missing_message(mode));
                };
                validators::validate_max_length(&text, max_len, self.field)?;
                FieldValue::Text(text)
            }
            FieldKind::Number { min } => {
                let number =
                    validators::coerce_number(value).ok_or_else(|| self.type_message())?;
                validators::validate_min(number, min, self.field)?;
                FieldValue::Number(number)
            }
            FieldKind::Boolean => {
                FieldValue::Bool(validators::coerce_bool(value).ok_or_else(|| self.type_message())?)
            }
            FieldKind::Choice(choices) => {
                let choice = validators::coerce_choice(value, choices)
                    .ok_or_else(|| self.type_message())?;
                FieldValue::Text(choice.to_string())
            }
        };
        Ok(Some(checked))
    }
}

#[derive(Debug)]
pub struct RuleSet {
    pub rules: &'static [FieldRule],
}

impl RuleSet {
    /// Validate and sanitize a raw body, reporting at most one error per field
    pub fn apply(&self, body: &Value, mode: Mode) -> Result<SanitizedFields, Vec<FieldError>> {
        let Some(object) = body.as_object() else {
            return Err(vec![FieldError::new(
                "body",
                "Request body must be a JSON object",
            )]);
        };

        let mut builder = ValidationBuilder::new();
        let mut fields = SanitizedFields::default();

        for rule in self.rules {
            match rule.check(object.get(rule.field), mode) {
                Ok(Some(value)) => fields.insert(rule.field, value),
                Ok(None) => {}
                Err(message) => {
                    builder.add_error(rule.field, message);
                }
            }
        }

        builder.check_condition(
            mode == Mode::Update && !builder.has_errors() && fields.is_empty(),
            "body",
            NO_VALID_FIELDS,
        );
        builder.build().map(|()| fields)
    }
}

pub const ITEM_RULES: RuleSet = RuleSet {
    rules: &[
        FieldRule::text("name", 80).required(),
        FieldRule::number("quantity", 0.0),
        FieldRule::text("unit", 30),
        FieldRule::text("category", 40),
        FieldRule::text("store", 40),
        FieldRule::choice("priority", &["Low", "Medium", "High"]),
        FieldRule::boolean("purchased"),
        FieldRule::text("notes", 200),
    ],
};

pub const CATEGORY_RULES: RuleSet = RuleSet {
    rules: &[
        FieldRule::text("name", 80).required(),
        FieldRule::text("color", 30).required_on_create(),
        FieldRule::text("description", 200).required_on_create(),
    ],
};

/// A sanitized field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Text(String),
    Number(f64),
    Bool(bool),
}

/// Known fields that passed validation, keyed by field name
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SanitizedFields {
    values: BTreeMap<&'static str, FieldValue>,
}

impl SanitizedFields {
    fn insert(&mut self, field: &'static str, value: FieldValue) {
        self.values.insert(field, value);
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    pub fn text(&self, field: &str) -> Patch<String> {
        match self.get(field) {
            None => Patch::Absent,
            Some(FieldValue::Text(text)) => Patch::Value(text.clone()),
            Some(_) => Patch::Null,
        }
    }

    pub fn number(&self, field: &str) -> Patch<f64> {
        match self.get(field) {
            None => Patch::Absent,
            Some(FieldValue::Number(n)) => Patch::Value(*n),
            Some(_) => Patch::Null,
        }
    }

    pub fn boolean(&self, field: &str) -> Option<bool> {
        match self.get(field) {
            Some(FieldValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn priority(&self, field: &str) -> Patch<Priority> {
        match self.text(field) {
            Patch::Absent => Patch::Absent,
            Patch::Null => Patch::Null,
            Patch::Value(text) => text.parse().map_or(Patch::Null, Patch::Value),
        }
    }
}
