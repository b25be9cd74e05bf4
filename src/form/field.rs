//! Field definitions as produced by the form generator.
//!
//! DESIGN
//! ======
//! The generator is an AI model, so every definition is untrusted. Parsing
//! never fails per entry: anything that does not describe a known control
//! becomes `FieldKind::Unknown` and is carried through as an unconstrained
//! value instead of rejecting the page.

#[cfg(test)]
#[path = "field_test.rs"]
mod field_test;

use serde_json::Value;

/// Control kind for one generated field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Single-line text input.
    Text,
    /// Multi-line text area.
    MultiLineText,
    /// Boolean checkbox.
    Checkbox,
    /// Single-select radio group.
    Radio,
    /// Single-select dropdown.
    Dropdown,
    /// Anything the generator emitted that is not a known control.
    /// Holds the raw kind text (empty when the kind was missing).
    Unknown(String),
}

impl FieldKind {
    /// Map a raw kind string to a known control, accepting both the backend
    /// wire names and the hyphenated long forms.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "text" | "single-line-text" | "single-line text" => Self::Text,
            "multi-line text" | "multi-line-text" | "textarea" => Self::MultiLineText,
            "checkbox" => Self::Checkbox,
            "radio" | "single-select-radio" => Self::Radio,
            "dropdown" | "select" | "single-select-dropdown" => Self::Dropdown,
            _ => Self::Unknown(raw.to_owned()),
        }
    }

    /// Whether the control picks one value out of `options`.
    #[must_use]
    pub fn is_select(&self) -> bool {
        matches!(self, Self::Radio | Self::Dropdown)
    }

    /// Whether edits to this field are stored as text.
    #[must_use]
    pub fn is_textual(&self) -> bool {
        matches!(self, Self::Text | Self::MultiLineText | Self::Radio | Self::Dropdown)
    }
}

/// One generated form field, after tolerant parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDefinition {
    pub kind: FieldKind,
    pub label: Option<String>,
    /// Ordered, de-duplicated choices. Non-empty for radio/dropdown.
    pub options: Vec<String>,
}

impl FieldDefinition {
    /// Parse one entry of a generated field map.
    ///
    /// The kind is read from `type` (backend wire name) or `kind`. A select
    /// control without usable options degrades to single-line text.
    #[must_use]
    pub fn from_value(raw_key: &str, value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            tracing::warn!(field = %raw_key, "field definition is not an object; treating as unknown");
            return Self { kind: FieldKind::Unknown(String::new()), label: None, options: Vec::new() };
        };

        let raw_kind = obj
            .get("type")
            .or_else(|| obj.get("kind"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        let mut kind = FieldKind::parse(raw_kind);
        if let FieldKind::Unknown(raw) = &kind {
            tracing::warn!(field = %raw_key, kind = %raw, "unknown field kind; accepting any value");
        }

        let label = obj
            .get("label")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .map(str::to_owned);

        let options = parse_options(obj.get("options"));
        if kind.is_select() && options.is_empty() {
            tracing::warn!(field = %raw_key, "select field has no options; rendering as text");
            kind = FieldKind::Text;
        }

        Self { kind, label, options }
    }
}

fn parse_options(raw: Option<&Value>) -> Vec<String> {
    let Some(items) = raw.and_then(Value::as_array) else {
        return Vec::new();
    };
    let mut options: Vec<String> = Vec::with_capacity(items.len());
    for item in items.iter().filter_map(Value::as_str) {
        if !options.iter().any(|existing| existing == item) {
            options.push(item.to_owned());
        }
    }
    options
}

/// Derive the canonical key for a raw field name: every whitespace run
/// becomes one underscore, then the result is lower-cased.
///
/// `"Full Name"` and `"full   name"` both map to `full_name`. Keys must
/// match those already saved by the web client, so whitespace follows the
/// ECMAScript `\s` class and lower-casing runs over the whole string
/// (final sigma depends on context).
#[must_use]
pub fn canonical_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_space = false;
    for ch in raw.chars() {
        if is_key_space(ch) {
            if !in_space {
                out.push('_');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out.to_lowercase()
}

/// ECMAScript `\s`: Unicode `White_Space` minus U+0085, plus U+FEFF.
fn is_key_space(ch: char) -> bool {
    ch == '\u{feff}' || (ch.is_whitespace() && ch != '\u{85}')
}
