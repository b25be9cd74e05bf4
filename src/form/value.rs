//! Form values and per-kind coercion.

#[cfg(test)]
#[path = "value_test.rs"]
mod value_test;

use serde::Serialize;
use serde_json::Value;

use super::field::FieldKind;

/// One stored form value.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FormValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl FormValue {
    /// Convert a persisted JSON value. Returns `None` for shapes a form
    /// value cannot take (null, objects, arrays with non-string items).
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => n.as_f64().map(Self::Number),
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_str().map(str::to_owned))
                .collect::<Option<Vec<_>>>()
                .map(Self::List),
            Value::Null | Value::Object(_) => None,
        }
    }

    /// Coerce a raw edit into the shape implied by `kind`.
    ///
    /// Returns `None` only for non-finite numbers, which JSON cannot carry.
    #[must_use]
    pub fn coerce(self, kind: &FieldKind) -> Option<Self> {
        if let Self::Number(n) = self {
            if !n.is_finite() {
                return None;
            }
        }
        let coerced = match kind {
            FieldKind::Checkbox => Self::Bool(self.truthy()),
            kind if kind.is_textual() => Self::Text(self.into_text()),
            _ => self,
        };
        Some(coerced)
    }

    fn truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0,
            Self::Text(s) => !is_false_word(s),
            Self::List(items) => !items.is_empty(),
        }
    }

    fn into_text(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::List(items) => items.join(", "),
        }
    }

    /// Borrow the text payload, if any.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the boolean payload, if any.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FormValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for FormValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Vec<String>> for FormValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

fn is_false_word(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "" | "false" | "off" | "0" | "no" | "unchecked")
}
