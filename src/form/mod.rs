//! Dynamic form synthesis and state reconciliation.
//!
//! SYSTEM CONTEXT
//! ==============
//! `field` parses untrusted generator output, `schema` turns it into a
//! validation schema plus render list, `value` defines stored values and
//! coercion, and `state` reconciles persisted data with live edits.

pub mod field;
pub mod schema;
pub mod state;
pub mod value;

pub use field::{FieldDefinition, FieldKind, canonical_key};
pub use schema::{FieldRule, FieldViolation, FormField, SchemaTranslationError, Translation, ValidationSchema, translate};
pub use state::{FormError, FormState};
pub use value::FormValue;
