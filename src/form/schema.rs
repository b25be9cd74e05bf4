//! Field-map to validation-schema translation.
//!
//! DESIGN
//! ======
//! The generated field map is keyed by human-readable names. Translation
//! canonicalizes each name, assigns a per-key validation rule, and keeps an
//! ordered field list for rendering. Every rule is optional: a partially
//! filled form is valid so users can save and resume.
//!
//! Two raw names that canonicalize to the same key collide. The later
//! definition wins (keeping the earlier render position) and the collision
//! is logged, not reported.

#[cfg(test)]
#[path = "schema_test.rs"]
mod schema_test;

use std::collections::BTreeMap;

use serde_json::Value;

use super::field::{FieldDefinition, FieldKind, canonical_key};
use super::state::FormState;
use super::value::FormValue;

#[derive(Debug, thiserror::Error)]
pub enum SchemaTranslationError {
    #[error("generated form fields must be a JSON object, got {found}")]
    NotAMap { found: &'static str },
}

/// Validation rule for one canonical key. All rules accept absence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldRule {
    OptionalString,
    OptionalBool,
    OptionalAny,
}

impl FieldRule {
    #[must_use]
    pub fn for_kind(kind: &FieldKind) -> Self {
        match kind {
            FieldKind::Checkbox => Self::OptionalBool,
            FieldKind::Unknown(_) => Self::OptionalAny,
            _ => Self::OptionalString,
        }
    }

    /// Whether `value` satisfies the rule.
    #[must_use]
    pub fn accepts(self, value: &FormValue) -> bool {
        match self {
            Self::OptionalString => matches!(value, FormValue::Text(_)),
            Self::OptionalBool => matches!(value, FormValue::Bool(_)),
            Self::OptionalAny => true,
        }
    }

    fn expected(self) -> &'static str {
        match self {
            Self::OptionalString => "string",
            Self::OptionalBool => "boolean",
            Self::OptionalAny => "any",
        }
    }
}

/// A renderable field in generation order.
#[derive(Clone, Debug, PartialEq)]
pub struct FormField {
    /// Canonical key used in form state and persistence.
    pub key: String,
    /// Field name as the generator emitted it.
    pub raw_key: String,
    /// Display label; falls back to the raw key.
    pub label: String,
    pub kind: FieldKind,
    pub options: Vec<String>,
}

/// Per-key validation schema produced by [`translate`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidationSchema {
    rules: BTreeMap<String, FieldRule>,
    kinds: BTreeMap<String, FieldKind>,
}

/// A value that does not satisfy its field's rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldViolation {
    pub key: String,
    pub expected: &'static str,
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: expected {}", self.key, self.expected)
    }
}

impl ValidationSchema {
    #[must_use]
    pub fn rule(&self, key: &str) -> Option<FieldRule> {
        self.rules.get(key).copied()
    }

    #[must_use]
    pub fn kind(&self, key: &str) -> Option<&FieldKind> {
        self.kinds.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.rules.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Check every present value against its rule. Keys outside the schema
    /// are ignored; they are stripped before saving.
    #[must_use]
    pub fn validate(&self, state: &FormState) -> Vec<FieldViolation> {
        state
            .iter()
            .filter_map(|(key, value)| {
                let rule = self.rule(key)?;
                (!rule.accepts(value)).then(|| FieldViolation { key: key.to_owned(), expected: rule.expected() })
            })
            .collect()
    }

    fn insert(&mut self, key: String, kind: FieldKind) {
        self.rules.insert(key.clone(), FieldRule::for_kind(&kind));
        self.kinds.insert(key, kind);
    }
}

/// Output of [`translate`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Translation {
    pub schema: ValidationSchema,
    /// Canonical key to the raw name that won it.
    pub key_map: BTreeMap<String, String>,
    /// Fields in generation order, one per canonical key.
    pub fields: Vec<FormField>,
}

/// Translate an untrusted generated field map.
///
/// # Errors
///
/// Returns [`SchemaTranslationError::NotAMap`] if `fields` is not a JSON
/// object. Malformed entries never fail the translation.
pub fn translate(fields: &Value) -> Result<Translation, SchemaTranslationError> {
    let Value::Object(entries) = fields else {
        return Err(SchemaTranslationError::NotAMap { found: json_type_name(fields) });
    };

    let mut out = Translation::default();
    let mut positions: BTreeMap<String, usize> = BTreeMap::new();

    for (raw_key, raw_def) in entries {
        let key = canonical_key(raw_key);
        let def = FieldDefinition::from_value(raw_key, raw_def);
        let field = FormField {
            key: key.clone(),
            raw_key: raw_key.clone(),
            label: def.label.unwrap_or_else(|| raw_key.clone()),
            kind: def.kind.clone(),
            options: def.options,
        };

        if let Some(previous) = out.key_map.insert(key.clone(), raw_key.clone()) {
            tracing::warn!(key = %key, previous = %previous, winner = %raw_key, "canonical key collision; later field wins");
        }
        out.schema.insert(key.clone(), def.kind);

        match positions.get(&key) {
            Some(&idx) => out.fields[idx] = field,
            None => {
                positions.insert(key, out.fields.len());
                out.fields.push(field);
            }
        }
    }

    tracing::debug!(fields = out.fields.len(), "translated generated form fields");
    Ok(out)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
