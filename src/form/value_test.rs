use super::*;

// =============================================================
// from_json
// =============================================================

#[test]
fn from_json_maps_scalars() {
    assert_eq!(FormValue::from_json(&serde_json::json!(true)), Some(FormValue::Bool(true)));
    assert_eq!(FormValue::from_json(&serde_json::json!(2.5)), Some(FormValue::Number(2.5)));
    assert_eq!(FormValue::from_json(&serde_json::json!("hi")), Some(FormValue::Text("hi".to_owned())));
}

#[test]
fn from_json_maps_string_arrays() {
    assert_eq!(
        FormValue::from_json(&serde_json::json!(["a", "b"])),
        Some(FormValue::List(vec!["a".to_owned(), "b".to_owned()]))
    );
}

#[test]
fn from_json_rejects_null_objects_and_mixed_arrays() {
    assert_eq!(FormValue::from_json(&serde_json::Value::Null), None);
    assert_eq!(FormValue::from_json(&serde_json::json!({"a": 1})), None);
    assert_eq!(FormValue::from_json(&serde_json::json!(["a", 1])), None);
}

// =============================================================
// coerce: checkbox
// =============================================================

#[test]
fn checkbox_coerces_true_string() {
    assert_eq!(FormValue::from("true").coerce(&FieldKind::Checkbox), Some(FormValue::Bool(true)));
}

#[test]
fn checkbox_coerces_false_words() {
    for word in ["false", "FALSE", " off ", "0", "no", "", "unchecked"] {
        assert_eq!(
            FormValue::from(word).coerce(&FieldKind::Checkbox),
            Some(FormValue::Bool(false)),
            "word {word:?}"
        );
    }
}

#[test]
fn checkbox_coerces_other_strings_to_true() {
    assert_eq!(FormValue::from("on").coerce(&FieldKind::Checkbox), Some(FormValue::Bool(true)));
    assert_eq!(FormValue::from("checked").coerce(&FieldKind::Checkbox), Some(FormValue::Bool(true)));
}

#[test]
fn checkbox_coerces_numbers_and_lists() {
    assert_eq!(FormValue::Number(0.0).coerce(&FieldKind::Checkbox), Some(FormValue::Bool(false)));
    assert_eq!(FormValue::Number(3.0).coerce(&FieldKind::Checkbox), Some(FormValue::Bool(true)));
    assert_eq!(FormValue::List(Vec::new()).coerce(&FieldKind::Checkbox), Some(FormValue::Bool(false)));
}

// =============================================================
// coerce: textual kinds
// =============================================================

#[test]
fn text_kinds_stringify_non_text_values() {
    assert_eq!(FormValue::Bool(true).coerce(&FieldKind::Text), Some(FormValue::from("true")));
    assert_eq!(FormValue::Number(2.5).coerce(&FieldKind::MultiLineText), Some(FormValue::from("2.5")));
    assert_eq!(FormValue::Number(3.0).coerce(&FieldKind::Radio), Some(FormValue::from("3")));
    assert_eq!(
        FormValue::List(vec!["a".to_owned(), "b".to_owned()]).coerce(&FieldKind::Dropdown),
        Some(FormValue::from("a, b"))
    );
}

#[test]
fn unknown_kind_passes_values_through() {
    let kind = FieldKind::Unknown("slider".to_owned());
    assert_eq!(FormValue::Number(7.0).coerce(&kind), Some(FormValue::Number(7.0)));
    let list = FormValue::List(vec!["x".to_owned()]);
    assert_eq!(list.clone().coerce(&kind), Some(list));
}

#[test]
fn non_finite_numbers_are_rejected() {
    assert_eq!(FormValue::Number(f64::NAN).coerce(&FieldKind::Text), None);
    assert_eq!(FormValue::Number(f64::INFINITY).coerce(&FieldKind::Unknown(String::new())), None);
}
