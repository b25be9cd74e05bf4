//! Wire types for the document backend REST API.
//!
//! DESIGN
//! ======
//! These mirror the backend's JSON exactly and convert into domain types at
//! the edge, so the rest of the crate never sees `is_user_message: 0|1`.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

use crate::chat::{ChatMessage, ChatRole, ChatSession, MessageId, SessionId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectResponse {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResponse {
    pub id: i64,
    pub page_number: u32,
    #[serde(default)]
    pub text_content: String,
    #[serde(default)]
    pub generated_form_html: Option<String>,
}

/// Rendered HTML for a page's generated form.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct GeneratedHtmlResponse {
    #[serde(default)]
    pub html_content: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDataCreate {
    /// JSON-encoded form values.
    pub data: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDataResponse {
    #[serde(default)]
    pub id: i64,
    pub data: String,
    #[serde(default)]
    pub page_id: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessageCreate {
    pub message: String,
    /// 1 for user, 0 for assistant.
    pub is_user_message: u8,
}

impl ChatMessageCreate {
    #[must_use]
    pub fn user(message: &str) -> Self {
        Self { message: message.to_owned(), is_user_message: 1 }
    }
}

/// A chat message as the backend returns it. Accepts both the
/// `message`/`is_user_message`/`created_at` shape and `content`/`role`/`timestamp`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ChatMessageResponse {
    pub id: i64,
    #[serde(alias = "content")]
    pub message: String,
    #[serde(default)]
    pub is_user_message: Option<u8>,
    #[serde(default)]
    pub role: Option<ChatRole>,
    #[serde(default, alias = "timestamp")]
    pub created_at: String,
}

impl ChatMessageResponse {
    #[must_use]
    pub fn into_message(self) -> ChatMessage {
        let role = self.role.unwrap_or(match self.is_user_message {
            Some(1) => ChatRole::User,
            _ => ChatRole::Assistant,
        });
        ChatMessage { id: MessageId(self.id), role, content: self.message, timestamp: self.created_at }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct SessionResponse {
    #[serde(default, alias = "id")]
    pub session_id: Option<String>,
}

impl SessionResponse {
    /// The session id, treating a blank id as absent.
    #[must_use]
    pub fn into_session_id(self) -> Option<SessionId> {
        self.session_id
            .map(|id| id.trim().to_owned())
            .filter(|id| !id.is_empty())
            .map(SessionId)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ChatSessionResponse {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub messages: Vec<ChatMessageResponse>,
}

/// Session metadata plus its messages in server order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionHistory {
    pub session: ChatSession,
    pub messages: Vec<ChatMessage>,
}

impl From<ChatSessionResponse> for SessionHistory {
    fn from(resp: ChatSessionResponse) -> Self {
        Self {
            session: ChatSession { id: SessionId(resp.id), title: resp.title, created_at: resp.created_at },
            messages: resp
                .messages
                .into_iter()
                .map(ChatMessageResponse::into_message)
                .collect(),
        }
    }
}
