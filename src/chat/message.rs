//! Chat message and session types.
//!
//! DESIGN
//! ======
//! Server ids are integers and temp ids are `temp-` prefixed tokens, so the
//! two identifier spaces are disjoint by type, not by convention. An entry
//! in the history is either pending (temp id only) or confirmed (server id
//! only), never both.

#[cfg(test)]
#[path = "message_test.rs"]
mod message_test;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Server-assigned, durable message id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub i64);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

const TEMP_ID_PREFIX: &str = "temp-";

/// Client-generated id for a message awaiting server acknowledgment.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TempId(String);

impl TempId {
    /// Generate a fresh `temp-` + 16 hex char token.
    #[must_use]
    pub fn generate() -> Self {
        let bytes: [u8; 8] = rand::rng().random();
        let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        Self(format!("{TEMP_ID_PREFIX}{hex}"))
    }

    /// Wrap an existing token, adding the prefix if it is missing.
    #[must_use]
    pub fn new(token: &str) -> Self {
        if token.starts_with(TEMP_ID_PREFIX) {
            Self(token.to_owned())
        } else {
            Self(format!("{TEMP_ID_PREFIX}{token}"))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TempId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// A server-confirmed chat message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: ChatRole,
    pub content: String,
    /// ISO 8601 instant. Informational; display order is history order.
    pub timestamp: String,
}

/// A user message shown before the server has acknowledged it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingChatMessage {
    pub temp_id: TempId,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: String,
}

impl PendingChatMessage {
    /// Build a pending user message stamped with the current client time.
    #[must_use]
    pub fn user(temp_id: TempId, content: impl Into<String>) -> Self {
        Self { temp_id, role: ChatRole::User, content: content.into(), timestamp: now_rfc3339() }
    }
}

/// One entry of a chat history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatEntry {
    Pending(PendingChatMessage),
    Confirmed(ChatMessage),
}

impl ChatEntry {
    #[must_use]
    pub fn role(&self) -> ChatRole {
        match self {
            Self::Pending(m) => m.role,
            Self::Confirmed(m) => m.role,
        }
    }

    #[must_use]
    pub fn content(&self) -> &str {
        match self {
            Self::Pending(m) => &m.content,
            Self::Confirmed(m) => &m.content,
        }
    }

    #[must_use]
    pub fn timestamp(&self) -> &str {
        match self {
            Self::Pending(m) => &m.timestamp,
            Self::Confirmed(m) => &m.timestamp,
        }
    }

    #[must_use]
    pub fn temp_id(&self) -> Option<&TempId> {
        match self {
            Self::Pending(m) => Some(&m.temp_id),
            Self::Confirmed(_) => None,
        }
    }

    #[must_use]
    pub fn id(&self) -> Option<MessageId> {
        match self {
            Self::Pending(_) => None,
            Self::Confirmed(m) => Some(m.id),
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }
}

/// Server-side or locally generated chat session id.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generate a local fallback id used when the backend supplies none.
    #[must_use]
    pub fn fallback() -> Self {
        Self(format!("local-{}", uuid::Uuid::new_v4()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Chat session metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatSession {
    pub id: SessionId,
    pub title: String,
    pub created_at: String,
}

impl ChatSession {
    /// Session metadata for a locally generated id.
    #[must_use]
    pub fn local(id: SessionId) -> Self {
        Self { id, title: "Document chat".to_owned(), created_at: now_rfc3339() }
    }
}

/// Current UTC time as RFC 3339.
#[must_use]
pub fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}
