//! REST implementation of the collaborator traits over `reqwest`.
//!
//! ERROR HANDLING
//! ==============
//! Non-success responses become `ApiError::Status` with a display message
//! extracted from the body: validation `detail` lists render as
//! `loc.path: msg` joined by `; `, `{"error": ...}` bodies render their
//! string, anything else falls back to `HTTP error! status: <code>`.
//! A 204 or empty body decodes as absent.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use std::time::Duration;

use reqwest::Url;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::api::{ChatBackend, FormBackend, ProjectBackend, ProjectId};
use super::error::ApiError;
use super::types::{
    ChatMessageCreate, ChatMessageResponse, ChatSessionResponse, FormDataCreate, FormDataResponse, GeneratedHtmlResponse,
    PageResponse, ProjectResponse, SessionHistory, SessionResponse,
};
use crate::chat::{ChatMessage, SessionId};
use crate::config::ClientConfig;

/// Backend routes, relative to the API base URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Endpoint<'a> {
    Projects,
    Project(ProjectId),
    Pages(ProjectId),
    PageText(ProjectId, u32),
    GenerateForm(ProjectId, u32),
    FormHtml(ProjectId, u32),
    FormData(ProjectId, u32),
    ChatSession(ProjectId),
    Session(&'a SessionId),
    SessionMessages(&'a SessionId),
}

impl Endpoint<'_> {
    /// Raw path segments. An empty last segment yields a trailing slash.
    #[must_use]
    pub fn segments(&self) -> Vec<String> {
        let page = |p: &ProjectId, n: &u32, rest: &[&str]| {
            let mut out = vec!["projects".to_owned(), p.to_string(), "pages".to_owned(), n.to_string()];
            out.extend(rest.iter().map(|s| (*s).to_owned()));
            out
        };
        match self {
            Self::Projects => vec!["projects".to_owned(), String::new()],
            Self::Project(p) => vec!["projects".to_owned(), p.to_string()],
            Self::Pages(p) => vec!["projects".to_owned(), p.to_string(), "pages".to_owned(), String::new()],
            Self::PageText(p, n) => page(p, n, &["text"]),
            Self::GenerateForm(p, n) => page(p, n, &["form", "generate"]),
            Self::FormHtml(p, n) => page(p, n, &["form", "html"]),
            Self::FormData(p, n) => page(p, n, &["form"]),
            Self::ChatSession(p) => vec!["projects".to_owned(), p.to_string(), "chat".to_owned(), "session".to_owned()],
            Self::Session(s) => vec!["chat".to_owned(), "sessions".to_owned(), s.as_str().to_owned()],
            Self::SessionMessages(s) => {
                vec!["chat".to_owned(), "sessions".to_owned(), s.as_str().to_owned(), "messages".to_owned()]
            }
        }
    }
}

/// REST client for the document backend.
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpBackend {
    /// Build a backend client from config.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBaseUrl`] if the base URL cannot carry a
    /// path, or [`ApiError::HttpClientBuild`] if the HTTP client cannot be
    /// built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.api_base_url)
            .map_err(|e| ApiError::InvalidBaseUrl(format!("{}: {e}", config.api_base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(config.api_base_url.clone()));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url })
    }

    /// Join `endpoint` onto the base URL, percent-encoding each segment.
    fn url(&self, endpoint: &Endpoint<'_>) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(endpoint.segments());
        Ok(url)
    }

    /// Send a request and return the body text, `None` for 204/empty.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Option<String>, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        if !(200..300).contains(&status) {
            let message = error_message(status, &text);
            tracing::warn!(%status, %message, "backend request failed");
            return Err(ApiError::Status { status, message });
        }
        if status == 204 || text.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(text))
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: Endpoint<'_>) -> Result<T, ApiError> {
        let body = self.send(self.http.get(self.url(&endpoint)?)).await?;
        decode_required(body.as_deref())
    }

    async fn post_json<T: DeserializeOwned>(&self, endpoint: Endpoint<'_>, payload: &impl serde::Serialize) -> Result<T, ApiError> {
        let body = self
            .send(self.http.post(self.url(&endpoint)?).json(payload))
            .await?;
        decode_required(body.as_deref())
    }
}

fn decode_required<T: DeserializeOwned>(body: Option<&str>) -> Result<T, ApiError> {
    let text = body.ok_or_else(|| ApiError::Parse("empty response body".to_owned()))?;
    serde_json::from_str(text).map_err(|e| ApiError::Parse(e.to_string()))
}

/// Render a display message for a failed response body.
#[must_use]
pub fn error_message(status: u16, body: &str) -> String {
    let fallback = format!("HTTP error! status: {status}");
    let Ok(parsed) = serde_json::from_str::<Value>(body) else {
        return fallback;
    };

    match parsed.get("detail") {
        Some(Value::Array(items)) if !items.is_empty() => {
            return items
                .iter()
                .map(render_validation_item)
                .collect::<Vec<_>>()
                .join("; ");
        }
        Some(Value::String(detail)) if !detail.is_empty() => return detail.clone(),
        _ => {}
    }
    match parsed.get("error") {
        Some(Value::String(error)) if !error.is_empty() => error.clone(),
        _ => fallback,
    }
}

fn render_validation_item(item: &Value) -> String {
    let loc = item
        .get("loc")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .map(|part| match part {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(".")
        })
        .unwrap_or_default();
    let msg = item
        .get("msg")
        .and_then(Value::as_str)
        .unwrap_or("invalid");
    format!("{loc}: {msg}")
}

#[async_trait::async_trait]
impl FormBackend for HttpBackend {
    async fn page_text(&self, project_id: ProjectId, page_number: u32) -> Result<PageResponse, ApiError> {
        self.get_json(Endpoint::PageText(project_id, page_number))
            .await
    }

    async fn generate_fields(&self, project_id: ProjectId, page_number: u32) -> Result<Value, ApiError> {
        let request = self
            .http
            .post(self.url(&Endpoint::GenerateForm(project_id, page_number))?)
            .header(CONTENT_TYPE, "application/json");
        let body = self.send(request).await?;
        decode_required(body.as_deref())
    }

    async fn generated_form_html(&self, project_id: ProjectId, page_number: u32) -> Result<Option<String>, ApiError> {
        match self.get_json::<GeneratedHtmlResponse>(Endpoint::FormHtml(project_id, page_number)).await {
            Ok(resp) => Ok(Some(resp.html_content)),
            Err(ApiError::Status { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn form_data(&self, project_id: ProjectId, page_number: u32) -> Result<Option<String>, ApiError> {
        let request = self
            .http
            .get(self.url(&Endpoint::FormData(project_id, page_number))?);
        match self.send(request).await {
            Ok(Some(text)) => {
                let resp: FormDataResponse = serde_json::from_str(&text).map_err(|e| ApiError::Parse(e.to_string()))?;
                Ok(Some(resp.data))
            }
            Ok(None) => Ok(None),
            Err(ApiError::Status { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn save_form_data(&self, project_id: ProjectId, page_number: u32, data: String) -> Result<(), ApiError> {
        let payload = FormDataCreate { data };
        self.send(
            self.http
                .post(self.url(&Endpoint::FormData(project_id, page_number))?)
                .json(&payload),
        )
        .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ChatBackend for HttpBackend {
    async fn resolve_session(&self, project_id: ProjectId) -> Result<Option<SessionId>, ApiError> {
        let body = self
            .send(self.http.post(self.url(&Endpoint::ChatSession(project_id))?))
            .await?;
        let Some(text) = body else {
            return Ok(None);
        };
        let resp: SessionResponse = serde_json::from_str(&text).map_err(|e| ApiError::Parse(e.to_string()))?;
        Ok(resp.into_session_id())
    }

    async fn chat_history(&self, session_id: &SessionId) -> Result<SessionHistory, ApiError> {
        let resp: ChatSessionResponse = self.get_json(Endpoint::Session(session_id)).await?;
        Ok(resp.into())
    }

    async fn send_message(&self, session_id: &SessionId, text: &str) -> Result<ChatMessage, ApiError> {
        let resp: ChatMessageResponse = self
            .post_json(Endpoint::SessionMessages(session_id), &ChatMessageCreate::user(text))
            .await?;
        Ok(resp.into_message())
    }
}

#[async_trait::async_trait]
impl ProjectBackend for HttpBackend {
    async fn list_projects(&self) -> Result<Vec<ProjectResponse>, ApiError> {
        self.get_json(Endpoint::Projects).await
    }

    async fn project(&self, project_id: ProjectId) -> Result<ProjectResponse, ApiError> {
        self.get_json(Endpoint::Project(project_id)).await
    }

    async fn pages(&self, project_id: ProjectId) -> Result<Vec<PageResponse>, ApiError> {
        self.get_json(Endpoint::Pages(project_id)).await
    }

    async fn delete_project(&self, project_id: ProjectId) -> Result<(), ApiError> {
        self.send(self.http.delete(self.url(&Endpoint::Project(project_id))?))
            .await?;
        Ok(())
    }
}
