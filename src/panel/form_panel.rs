//! Form panel controller for one document page.
//!
//! SYSTEM CONTEXT
//! ==============
//! Load runs page text -> field generation -> translation -> saved data ->
//! initialize. Generation is AI-latent, so the view stays in `Loading`
//! until it lands. A failed save keeps every in-progress edit.

#[cfg(test)]
#[path = "form_panel_test.rs"]
mod form_panel_test;

use std::sync::Arc;

use super::notice::Notice;
use super::Mounted;
use crate::form::{FieldViolation, FormError, FormField, FormState, FormValue, Translation, translate};
use crate::net::{FormBackend, ProjectId};

/// What the view should render.
#[derive(Clone, Debug, PartialEq)]
pub enum FormPanelView {
    Loading,
    Failed { message: String },
    /// The generator produced no fields for this page.
    Empty { page_text_missing: bool },
    Ready { fields: Vec<FormField>, values: FormState, dirty: bool, saving: bool },
}

#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    Saved,
    /// Validation failed; nothing was sent.
    Invalid(Vec<FieldViolation>),
    /// The save request failed; edits are kept.
    Failed,
    /// The form is not loaded or a save is already running.
    NotReady,
    /// The panel was unmounted before the save resolved.
    Discarded,
}

#[derive(Clone, Debug, Default, PartialEq)]
enum Phase {
    #[default]
    Loading,
    Failed(String),
    Loaded,
}

#[derive(Debug, Default)]
struct FormPanelState {
    phase: Phase,
    page_text: String,
    translation: Translation,
    values: FormState,
    /// Last state known to be persisted.
    baseline: FormState,
    saving: bool,
    notices: Vec<Notice>,
}

impl FormPanelState {
    fn fail(&mut self, title: &str, message: String) {
        self.notices.push(Notice::error(title, message.clone()));
        self.phase = Phase::Failed(message);
    }
}

/// Controller handle. Clones share the same mount.
#[derive(Clone)]
pub struct FormPanel {
    backend: Arc<dyn FormBackend>,
    project_id: ProjectId,
    page_number: u32,
    inner: Arc<Mounted<FormPanelState>>,
}

impl FormPanel {
    /// Mount a panel for one page. Call [`FormPanel::load`] to populate it.
    #[must_use]
    pub fn mount(backend: Arc<dyn FormBackend>, project_id: ProjectId, page_number: u32) -> Self {
        Self { backend, project_id, page_number, inner: Arc::new(Mounted::new()) }
    }

    /// Fetch everything the form needs and build its initial state.
    pub async fn load(&self) {
        let Some(mut state) = self.inner.lock_mounted() else {
            return;
        };
        state.phase = Phase::Loading;
        drop(state);

        let page = self
            .backend
            .page_text(self.project_id, self.page_number)
            .await;
        let Some(mut state) = self.guard("page text") else {
            return;
        };
        match page {
            Ok(page) => state.page_text = page.text_content,
            Err(e) => {
                state.fail("Error Loading Page", format!("Could not load page text: {e}"));
                return;
            }
        }
        drop(state);

        let Some(translation) = self.generate().await else {
            return;
        };
        if translation.fields.is_empty() {
            if let Some(mut state) = self.guard("generated fields") {
                tracing::info!(project_id = self.project_id, page = self.page_number, "no form fields generated");
                state.translation = translation;
                state.values = FormState::default();
                state.baseline = FormState::default();
                state.phase = Phase::Loaded;
            }
            return;
        }

        let saved = self
            .backend
            .form_data(self.project_id, self.page_number)
            .await;
        let Some(mut state) = self.guard("saved form data") else {
            return;
        };
        let persisted = match saved {
            Ok(persisted) => persisted,
            Err(e) => {
                tracing::warn!(error = %e, "could not fetch saved form data; starting empty");
                state
                    .notices
                    .push(Notice::error("Error", "Could not load previously saved form data."));
                None
            }
        };
        let values = FormState::initialize(&translation.schema, persisted.as_deref());
        state.baseline = values.clone();
        state.values = values;
        state.translation = translation;
        state.phase = Phase::Loaded;
    }

    /// Run generation and translation, recording failures on the panel.
    async fn generate(&self) -> Option<Translation> {
        let fields = self
            .backend
            .generate_fields(self.project_id, self.page_number)
            .await;
        let mut state = self.guard("generated fields")?;
        let fields = match fields {
            Ok(fields) => fields,
            Err(e) => {
                state.fail("Error Generating Form", e.to_string());
                return None;
            }
        };
        match translate(&fields) {
            Ok(translation) => Some(translation),
            Err(e) => {
                state.fail("Error Generating Form", e.to_string());
                None
            }
        }
    }

    /// Re-run generation. Values whose field disappeared are dropped; the
    /// rest are kept. Falls back to a full load when no form is showing.
    pub async fn regenerate(&self) {
        let showing_form = self
            .inner
            .lock_mounted()
            .is_some_and(|s| s.phase == Phase::Loaded && !s.translation.fields.is_empty());
        if !showing_form {
            self.load().await;
            return;
        }

        let fields = self
            .backend
            .generate_fields(self.project_id, self.page_number)
            .await;
        let Some(mut state) = self.guard("regenerated fields") else {
            return;
        };
        let translation = match fields.map_err(|e| e.to_string()).and_then(|f| translate(&f).map_err(|e| e.to_string())) {
            Ok(translation) => translation,
            Err(message) => {
                state
                    .notices
                    .push(Notice::error("Error Generating Form", message));
                return;
            }
        };
        if translation.fields.is_empty() {
            state.notices.push(Notice::error(
                "Error Generating Form",
                "Regeneration produced no fields; keeping the current form.",
            ));
            return;
        }
        state.values.retain_schema(&translation.schema);
        state.baseline.retain_schema(&translation.schema);
        state.translation = translation;
    }

    /// Apply one user edit, coerced to the field's kind.
    ///
    /// # Errors
    ///
    /// Returns a [`FormError`] if the key is not in the current form or the
    /// value cannot be stored.
    pub fn edit(&self, key: &str, value: impl Into<FormValue>) -> Result<(), FormError> {
        let Some(mut state) = self.inner.lock_mounted() else {
            return Ok(());
        };
        let next = state
            .values
            .apply_edit(&state.translation.schema, key, value.into())?;
        state.values = next;
        Ok(())
    }

    /// Validate, serialize and save the current values.
    pub async fn submit(&self) -> SubmitOutcome {
        let Some(mut state) = self.inner.lock_mounted() else {
            return SubmitOutcome::Discarded;
        };
        if state.phase != Phase::Loaded || state.saving || state.translation.fields.is_empty() {
            return SubmitOutcome::NotReady;
        }
        let violations = state.translation.schema.validate(&state.values);
        if !violations.is_empty() {
            let description = violations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            state.notices.push(Notice::error("Invalid Form", description));
            return SubmitOutcome::Invalid(violations);
        }
        let snapshot = state.values.clone();
        state.saving = true;
        drop(state);

        let result = self
            .backend
            .save_form_data(self.project_id, self.page_number, snapshot.serialize())
            .await;

        let Some(mut state) = self.guard("form save") else {
            return SubmitOutcome::Discarded;
        };
        state.saving = false;
        match result {
            Ok(()) => {
                state.baseline = snapshot;
                state.notices.push(Notice::info(
                    "Form Saved",
                    "Your responses have been saved successfully.",
                ));
                SubmitOutcome::Saved
            }
            Err(e) => {
                tracing::warn!(error = %e, project_id = self.project_id, page = self.page_number, "form save failed");
                state.notices.push(Notice::error("Save Failed", e.to_string()));
                SubmitOutcome::Failed
            }
        }
    }

    /// Current view state.
    #[must_use]
    pub fn view(&self) -> FormPanelView {
        let state = self.inner.lock();
        match &state.phase {
            Phase::Loading => FormPanelView::Loading,
            Phase::Failed(message) => FormPanelView::Failed { message: message.clone() },
            Phase::Loaded if state.translation.fields.is_empty() => {
                FormPanelView::Empty { page_text_missing: state.page_text.trim().is_empty() }
            }
            Phase::Loaded => FormPanelView::Ready {
                fields: state.translation.fields.clone(),
                values: state.values.clone(),
                dirty: state.values != state.baseline,
                saving: state.saving,
            },
        }
    }

    /// Current values, regardless of phase.
    #[must_use]
    pub fn values(&self) -> FormState {
        self.inner.lock().values.clone()
    }

    /// Drain pending notices.
    pub fn take_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut self.inner.lock().notices)
    }

    /// Discard panel state. Late responses become no-ops.
    pub fn unmount(&self) {
        self.inner.unmount();
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.inner.is_mounted()
    }

    fn guard(&self, step: &'static str) -> Option<std::sync::MutexGuard<'_, FormPanelState>> {
        let guard = self.inner.lock_mounted();
        if guard.is_none() {
            tracing::debug!(step, project_id = self.project_id, page = self.page_number, "form panel unmounted; dropping response");
        }
        guard
    }
}
