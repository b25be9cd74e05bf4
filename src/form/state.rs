//! Controlled form state and its reconciliation with persisted data.
//!
//! SYSTEM CONTEXT
//! ==============
//! Three sources feed one form: the generated schema, the last saved blob,
//! and live edits. `initialize` merges the first two once per load;
//! `apply_edit` is the only mutation afterwards; `serialize` produces the
//! save payload. `initialize(schema, serialize(state)) == state` holds for
//! any state whose keys are in the schema.

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;

use std::collections::BTreeMap;

use serde_json::Value;

use super::schema::ValidationSchema;
use super::value::FormValue;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FormError {
    #[error("field `{0}` is not part of the current form")]
    UnknownField(String),
    #[error("field `{key}` cannot hold that value")]
    InvalidValue { key: String },
}

/// Form values keyed by canonical field key, sorted for stable output.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormState {
    values: BTreeMap<String, FormValue>,
}

impl FormState {
    /// Build the initial state for `schema` from an optional persisted blob.
    ///
    /// A blob that does not parse as a JSON object is logged and ignored so
    /// a corrupt save never blocks a fresh form. Keys the current schema no
    /// longer has are dropped.
    #[must_use]
    pub fn initialize(schema: &ValidationSchema, persisted: Option<&str>) -> Self {
        let Some(raw) = persisted else {
            return Self::default();
        };

        let map = match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                tracing::warn!(found = ?other, "persisted form data is not an object; starting empty");
                return Self::default();
            }
            Err(e) => {
                tracing::warn!(error = %e, "persisted form data is not valid JSON; starting empty");
                return Self::default();
            }
        };

        let mut values = BTreeMap::new();
        for (key, raw_value) in map {
            if !schema.contains(&key) {
                tracing::debug!(key = %key, "dropping stale persisted field");
                continue;
            }
            match FormValue::from_json(&raw_value) {
                Some(value) => {
                    values.insert(key, value);
                }
                None => tracing::warn!(key = %key, "persisted field has an unsupported shape; dropping"),
            }
        }
        Self { values }
    }

    /// Return a new state with `key` set to `value`, coerced to the kind of
    /// that field.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownField`] if `key` is not in `schema`, or
    /// [`FormError::InvalidValue`] for a non-finite number.
    pub fn apply_edit(&self, schema: &ValidationSchema, key: &str, value: FormValue) -> Result<Self, FormError> {
        let kind = schema
            .kind(key)
            .ok_or_else(|| FormError::UnknownField(key.to_owned()))?;
        let coerced = value
            .coerce(kind)
            .ok_or_else(|| FormError::InvalidValue { key: key.to_owned() })?;

        let mut next = self.clone();
        next.values.insert(key.to_owned(), coerced);
        Ok(next)
    }

    /// Encode the state as a JSON object string for the persistence
    /// collaborator.
    #[must_use]
    pub fn serialize(&self) -> String {
        serde_json::to_string(&self.values).unwrap_or_else(|e| {
            tracing::error!(error = %e, "form state failed to encode");
            "{}".to_owned()
        })
    }

    /// Fit the state to a new schema, e.g. after regeneration. Values whose
    /// key left the schema are dropped; the rest are coerced to their
    /// field's current kind.
    pub fn retain_schema(&mut self, schema: &ValidationSchema) {
        let values = std::mem::take(&mut self.values);
        self.values = values
            .into_iter()
            .filter_map(|(key, value)| {
                let Some(kind) = schema.kind(&key) else {
                    tracing::debug!(key = %key, "dropping value for removed field");
                    return None;
                };
                value.coerce(kind).map(|coerced| (key, coerced))
            })
            .collect();
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FormValue> {
        self.values.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
