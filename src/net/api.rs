//! Collaborator contracts consumed by the panel controllers.
//!
//! SYSTEM CONTEXT
//! ==============
//! The backend owns projects, pages, text extraction, form generation,
//! persistence and chat. Controllers only see these traits, which keeps
//! transport out of the reconciliation logic and lets tests drive exact
//! response orderings. `http::HttpBackend` implements all three.

use serde_json::Value;

use super::error::ApiError;
use super::types::{PageResponse, ProjectResponse, SessionHistory};
use crate::chat::{ChatMessage, SessionId};

pub type ProjectId = i64;

/// Page text, generated fields and saved form responses for one page.
#[async_trait::async_trait]
pub trait FormBackend: Send + Sync {
    /// Fetch extracted text for a page. The text may be empty.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport or HTTP failure.
    async fn page_text(&self, project_id: ProjectId, page_number: u32) -> Result<PageResponse, ApiError>;

    /// Generate (or fetch previously generated) form fields. The result is
    /// untrusted and only structurally checked by the translator.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport or HTTP failure.
    async fn generate_fields(&self, project_id: ProjectId, page_number: u32) -> Result<Value, ApiError>;

    /// Fetch the HTML rendering of the generated form. `None` when the
    /// backend has not rendered one.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport or HTTP failure other than
    /// "not found".
    async fn generated_form_html(&self, project_id: ProjectId, page_number: u32) -> Result<Option<String>, ApiError>;

    /// Fetch the saved form blob. `None` when nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport or HTTP failure other than
    /// "not found".
    async fn form_data(&self, project_id: ProjectId, page_number: u32) -> Result<Option<String>, ApiError>;

    /// Save a JSON-encoded form blob.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport or HTTP failure.
    async fn save_form_data(&self, project_id: ProjectId, page_number: u32, data: String) -> Result<(), ApiError>;
}

/// Chat sessions and messages scoped to one project.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    /// Get or create the chat session for a project. `None` when the backend
    /// supplied no id.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport or HTTP failure.
    async fn resolve_session(&self, project_id: ProjectId) -> Result<Option<SessionId>, ApiError>;

    /// Fetch session metadata and the full message history.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport or HTTP failure.
    async fn chat_history(&self, session_id: &SessionId) -> Result<SessionHistory, ApiError>;

    /// Send a user message and return the server-confirmed copy.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport or HTTP failure.
    async fn send_message(&self, session_id: &SessionId, text: &str) -> Result<ChatMessage, ApiError>;
}

/// Project inventory.
#[async_trait::async_trait]
pub trait ProjectBackend: Send + Sync {
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport or HTTP failure.
    async fn list_projects(&self) -> Result<Vec<ProjectResponse>, ApiError>;

    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport or HTTP failure.
    async fn project(&self, project_id: ProjectId) -> Result<ProjectResponse, ApiError>;

    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport or HTTP failure.
    async fn pages(&self, project_id: ProjectId) -> Result<Vec<PageResponse>, ApiError>;

    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport or HTTP failure.
    async fn delete_project(&self, project_id: ProjectId) -> Result<(), ApiError>;
}
