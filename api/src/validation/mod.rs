//! Input Validation Module
//!
//! Every create and update body passes through here before it reaches a
//! repository.
//!
//! # Overview
//!
//! 1. **Rules** - declarative per-resource field rules (`ITEM_RULES`, `CATEGORY_RULES`)
//! 2. **Extractors** - `ValidatedJson<T>` for bodies, `PathId` for the `:id` segment
//! 3. **Validators** - reusable checks and coercions
//! 4. **Sanitizers** - string normalization
//!
//! # Validation Error Response
//!
//! When validation fails, a 400 Bad Request is returned listing one entry per
//! failing field:
//!
//! ```json
//! {
//!   "error": "Validation failed",
//!   "details": [
//!     {"field": "name", "message": "name is required"},
//!     {"field": "quantity", "message": "quantity must be 0 or greater"}
//!   ]
//! }
//! ```

pub mod extractors;
pub mod requests;
pub mod rules;
pub mod sanitizers;
pub mod validators;

pub use extractors::{
    FieldError, PathId, Validatable, ValidatedJson, ValidationBuilder, ValidationError,
};
pub use rules::{Mode, RuleSet, SanitizedFields, CATEGORY_RULES, ITEM_RULES};
