use std::sync::Mutex;

use serde_json::{Value, json};
use tokio::sync::oneshot;

use super::*;
use crate::net::ApiError;
use crate::net::types::PageResponse;
use crate::panel::NoticeLevel;

// =========================================================================
// MockForms
// =========================================================================

struct MockForms {
    page: Mutex<Result<PageResponse, ApiError>>,
    /// Generation results, consumed front to back; the last one repeats.
    fields: Mutex<Vec<Result<Value, ApiError>>>,
    saved: Mutex<Result<Option<String>, ApiError>>,
    save_result: Mutex<Result<(), ApiError>>,
    saves: Mutex<Vec<String>>,
    save_gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl MockForms {
    fn new(fields: Value) -> Self {
        Self {
            page: Mutex::new(Ok(page("Tenant name and signature."))),
            fields: Mutex::new(vec![Ok(fields)]),
            saved: Mutex::new(Ok(None)),
            save_result: Mutex::new(Ok(())),
            saves: Mutex::new(Vec::new()),
            save_gate: Mutex::new(None),
        }
    }

    fn with_saved(self, blob: &str) -> Self {
        *self.saved.lock().unwrap() = Ok(Some(blob.to_owned()));
        self
    }

    fn set_fields(&self, fields: Result<Value, ApiError>) {
        *self.fields.lock().unwrap() = vec![fields];
    }

    fn saves(&self) -> Vec<String> {
        self.saves.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl FormBackend for MockForms {
    async fn page_text(&self, _project_id: ProjectId, _page_number: u32) -> Result<PageResponse, ApiError> {
        self.page.lock().unwrap().clone()
    }

    async fn generate_fields(&self, _project_id: ProjectId, _page_number: u32) -> Result<Value, ApiError> {
        let mut fields = self.fields.lock().unwrap();
        if fields.len() > 1 { fields.remove(0) } else { fields[0].clone() }
    }

    async fn generated_form_html(&self, _project_id: ProjectId, _page_number: u32) -> Result<Option<String>, ApiError> {
        Ok(None)
    }

    async fn form_data(&self, _project_id: ProjectId, _page_number: u32) -> Result<Option<String>, ApiError> {
        self.saved.lock().unwrap().clone()
    }

    async fn save_form_data(&self, _project_id: ProjectId, _page_number: u32, data: String) -> Result<(), ApiError> {
        let gate = self.save_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.saves.lock().unwrap().push(data);
        self.save_result.lock().unwrap().clone()
    }
}

fn page(text: &str) -> PageResponse {
    PageResponse { id: 11, page_number: 1, text_content: text.to_owned(), generated_form_html: None }
}

fn lease_fields() -> Value {
    json!({
        "Full Name": {"type": "text", "label": "Full name"},
        "Agree": {"type": "checkbox"},
        "Unit": {"type": "dropdown", "options": ["A", "B"]}
    })
}

fn server_error(message: &str) -> ApiError {
    ApiError::Status { status: 500, message: message.to_owned() }
}

async fn loaded(mock: MockForms) -> (Arc<MockForms>, FormPanel) {
    let mock = Arc::new(mock);
    let panel = FormPanel::mount(mock.clone(), 1, 1);
    panel.load().await;
    (mock, panel)
}

// =========================================================================
// load
// =========================================================================

#[tokio::test]
async fn new_panel_starts_loading() {
    let panel = FormPanel::mount(Arc::new(MockForms::new(lease_fields())), 1, 1);
    assert_eq!(panel.view(), FormPanelView::Loading);
}

#[tokio::test]
async fn load_renders_fields_in_generation_order() {
    let (_, panel) = loaded(MockForms::new(lease_fields())).await;
    let FormPanelView::Ready { fields, values, dirty, saving } = panel.view() else {
        panic!("expected ready view");
    };
    let keys: Vec<&str> = fields.iter().map(|f| f.key.as_str()).collect();
    assert_eq!(keys, vec!["full_name", "agree", "unit"]);
    assert_eq!(fields[0].label, "Full name");
    assert!(values.is_empty());
    assert!(!dirty);
    assert!(!saving);
}

#[tokio::test]
async fn load_reconciles_saved_data_with_schema() {
    let mock = MockForms::new(lease_fields()).with_saved(r#"{"full_name": "Ada", "agree": true, "stale": "x"}"#);
    let (_, panel) = loaded(mock).await;
    let values = panel.values();
    assert_eq!(values.get("full_name"), Some(&FormValue::from("Ada")));
    assert_eq!(values.get("agree"), Some(&FormValue::Bool(true)));
    assert_eq!(values.get("stale"), None);
    assert!(panel.take_notices().is_empty());
}

#[tokio::test]
async fn corrupt_saved_data_starts_empty() {
    let (_, panel) = loaded(MockForms::new(lease_fields()).with_saved("not json")).await;
    assert!(matches!(panel.view(), FormPanelView::Ready { .. }));
    assert!(panel.values().is_empty());
}

#[tokio::test]
async fn saved_data_failure_degrades_with_notice() {
    let mock = MockForms::new(lease_fields());
    *mock.saved.lock().unwrap() = Err(server_error("db down"));
    let (_, panel) = loaded(mock).await;

    assert!(matches!(panel.view(), FormPanelView::Ready { .. }));
    let notices = panel.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].description, "Could not load previously saved form data.");
}

#[tokio::test]
async fn page_text_failure_fails_panel() {
    let mock = MockForms::new(lease_fields());
    *mock.page.lock().unwrap() = Err(ApiError::Request("connection refused".to_owned()));
    let (_, panel) = loaded(mock).await;

    let FormPanelView::Failed { message } = panel.view() else {
        panic!("expected failed view");
    };
    assert!(message.contains("connection refused"));
    assert!(panel.take_notices()[0].is_error());
}

#[tokio::test]
async fn generation_failure_fails_panel_with_notice() {
    let mock = MockForms::new(lease_fields());
    *mock.fields.lock().unwrap() = vec![Err(server_error("model unavailable"))];
    let (_, panel) = loaded(mock).await;

    assert_eq!(panel.view(), FormPanelView::Failed { message: "model unavailable".to_owned() });
    let notices = panel.take_notices();
    assert_eq!(notices[0].title, "Error Generating Form");
    assert_eq!(notices[0].level, NoticeLevel::Error);
}

#[tokio::test]
async fn non_object_generation_fails_panel() {
    let (_, panel) = loaded(MockForms::new(json!(["Full Name"]))).await;
    assert!(matches!(panel.view(), FormPanelView::Failed { .. }));
}

#[tokio::test]
async fn empty_generation_reports_missing_page_text() {
    let mock = MockForms::new(json!({}));
    *mock.page.lock().unwrap() = Ok(page("   "));
    let (_, panel) = loaded(mock).await;
    assert_eq!(panel.view(), FormPanelView::Empty { page_text_missing: true });
}

#[tokio::test]
async fn empty_generation_with_text_is_plain_empty() {
    let (_, panel) = loaded(MockForms::new(json!({}))).await;
    assert_eq!(panel.view(), FormPanelView::Empty { page_text_missing: false });
}

// =========================================================================
// edit
// =========================================================================

#[tokio::test]
async fn edit_coerces_and_marks_dirty() {
    let (_, panel) = loaded(MockForms::new(lease_fields())).await;
    panel.edit("agree", "on").unwrap();
    panel.edit("full_name", 42.0).unwrap();

    let FormPanelView::Ready { values, dirty, .. } = panel.view() else {
        panic!("expected ready view");
    };
    assert_eq!(values.get("agree"), Some(&FormValue::Bool(true)));
    assert_eq!(values.get("full_name"), Some(&FormValue::from("42")));
    assert!(dirty);
}

#[tokio::test]
async fn edit_rejects_unknown_field() {
    let (_, panel) = loaded(MockForms::new(lease_fields())).await;
    let err = panel.edit("nope", "x").unwrap_err();
    assert_eq!(err, FormError::UnknownField("nope".to_owned()));
    assert!(panel.values().is_empty());
}

// =========================================================================
// submit
// =========================================================================

#[tokio::test]
async fn submit_saves_serialized_state() {
    let (mock, panel) = loaded(MockForms::new(lease_fields())).await;
    panel.edit("full_name", "Ada").unwrap();
    panel.edit("agree", true).unwrap();

    assert_eq!(panel.submit().await, SubmitOutcome::Saved);
    assert_eq!(mock.saves(), vec![r#"{"agree":true,"full_name":"Ada"}"#.to_owned()]);

    let FormPanelView::Ready { dirty, saving, .. } = panel.view() else {
        panic!("expected ready view");
    };
    assert!(!dirty);
    assert!(!saving);
    let notices = panel.take_notices();
    assert_eq!(notices[0].title, "Form Saved");
    assert_eq!(notices[0].level, NoticeLevel::Info);
}

#[tokio::test]
async fn failed_save_keeps_edits() {
    let mock = MockForms::new(lease_fields());
    *mock.save_result.lock().unwrap() = Err(server_error("disk full"));
    let (_, panel) = loaded(mock).await;
    panel.edit("full_name", "Ada").unwrap();

    assert_eq!(panel.submit().await, SubmitOutcome::Failed);
    let FormPanelView::Ready { values, dirty, .. } = panel.view() else {
        panic!("expected ready view");
    };
    assert_eq!(values.get("full_name"), Some(&FormValue::from("Ada")));
    assert!(dirty);
    let notices = panel.take_notices();
    assert_eq!(notices[0].title, "Save Failed");
    assert_eq!(notices[0].description, "disk full");
}

#[tokio::test]
async fn submit_rejects_values_violating_schema() {
    let mock = MockForms::new(lease_fields()).with_saved(r#"{"full_name": true}"#);
    let (mock, panel) = loaded(mock).await;

    let SubmitOutcome::Invalid(violations) = panel.submit().await else {
        panic!("expected validation failure");
    };
    assert_eq!(violations[0].to_string(), "full_name: expected string");
    assert!(mock.saves().is_empty());
}

#[tokio::test]
async fn submit_before_load_is_not_ready() {
    let panel = FormPanel::mount(Arc::new(MockForms::new(lease_fields())), 1, 1);
    assert_eq!(panel.submit().await, SubmitOutcome::NotReady);
}

#[tokio::test]
async fn second_submit_while_saving_is_not_ready() {
    let (mock, panel) = loaded(MockForms::new(lease_fields())).await;
    let (tx, rx) = oneshot::channel();
    *mock.save_gate.lock().unwrap() = Some(rx);

    let (first, second) = tokio::join!(panel.submit(), async {
        let second = panel.submit().await;
        tx.send(()).unwrap();
        second
    });
    assert_eq!(first, SubmitOutcome::Saved);
    assert_eq!(second, SubmitOutcome::NotReady);
    assert_eq!(mock.saves().len(), 1);
}

#[tokio::test]
async fn unmount_during_save_discards_response() {
    let (mock, panel) = loaded(MockForms::new(lease_fields())).await;
    panel.edit("full_name", "Ada").unwrap();
    let (tx, rx) = oneshot::channel();
    *mock.save_gate.lock().unwrap() = Some(rx);

    let (outcome, ()) = tokio::join!(panel.submit(), async {
        panel.unmount();
        tx.send(()).unwrap();
    });
    assert_eq!(outcome, SubmitOutcome::Discarded);
    assert!(!panel.is_mounted());
    assert!(panel.take_notices().is_empty());
    assert!(panel.values().is_empty());
}

// =========================================================================
// regenerate
// =========================================================================

#[tokio::test]
async fn regenerate_keeps_surviving_values() {
    let (mock, panel) = loaded(MockForms::new(lease_fields())).await;
    panel.edit("full_name", "Ada").unwrap();
    panel.edit("agree", true).unwrap();
    mock.set_fields(Ok(json!({
        "Full Name": {"type": "text"},
        "Signature Date": {"type": "text"}
    })));

    panel.regenerate().await;
    let FormPanelView::Ready { fields, values, .. } = panel.view() else {
        panic!("expected ready view");
    };
    let keys: Vec<&str> = fields.iter().map(|f| f.key.as_str()).collect();
    assert_eq!(keys, vec!["full_name", "signature_date"]);
    assert_eq!(values.get("full_name"), Some(&FormValue::from("Ada")));
    assert_eq!(values.get("agree"), None);
}

#[tokio::test]
async fn regenerate_reshapes_values_when_kind_changes() {
    let (mock, panel) = loaded(MockForms::new(lease_fields())).await;
    panel.edit("agree", true).unwrap();
    panel.edit("full_name", "Ada").unwrap();
    mock.set_fields(Ok(json!({
        "Full Name": {"type": "text"},
        "Agree": {"type": "text"}
    })));

    panel.regenerate().await;
    assert_eq!(panel.values().get("agree"), Some(&FormValue::from("true")));
    assert_eq!(panel.submit().await, SubmitOutcome::Saved);
    assert_eq!(mock.saves(), vec![r#"{"agree":"true","full_name":"Ada"}"#.to_owned()]);
}

#[tokio::test]
async fn failed_regenerate_keeps_current_form() {
    let (mock, panel) = loaded(MockForms::new(lease_fields())).await;
    mock.set_fields(Err(server_error("model unavailable")));

    panel.regenerate().await;
    let FormPanelView::Ready { fields, .. } = panel.view() else {
        panic!("expected ready view");
    };
    assert_eq!(fields.len(), 3);
    assert_eq!(panel.take_notices()[0].title, "Error Generating Form");
}

#[tokio::test]
async fn regenerate_after_failure_reloads() {
    let mock = MockForms::new(lease_fields());
    *mock.fields.lock().unwrap() = vec![Err(server_error("model unavailable")), Ok(lease_fields())];
    let (_, panel) = loaded(mock).await;
    assert!(matches!(panel.view(), FormPanelView::Failed { .. }));

    panel.regenerate().await;
    assert!(matches!(panel.view(), FormPanelView::Ready { .. }));
}
