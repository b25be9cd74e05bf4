//! Chat message model and optimistic history reconciliation.

pub mod history;
pub mod message;

pub use history::{ChatHistory, ChatHistoryError};
pub use message::{ChatEntry, ChatMessage, ChatRole, ChatSession, MessageId, PendingChatMessage, SessionId, TempId};
