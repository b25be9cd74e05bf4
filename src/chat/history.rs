//! Session-scoped chat history with optimistic sends.
//!
//! DESIGN
//! ======
//! Each send moves through `pending -> acknowledged | rolled back`, keyed by
//! its temp id. Several sends may be in flight and their responses may land
//! in any order, so acknowledgment and rollback match strictly by temp id,
//! never by position. Assistant replies are not modeled here; they arrive
//! through `merge_server` on the next full-history refresh.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use std::collections::HashSet;

use super::message::{ChatEntry, ChatMessage, MessageId, PendingChatMessage, TempId};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChatHistoryError {
    #[error("temp id {0} is already pending")]
    DuplicateTempId(TempId),
}

/// Append-ordered chat log. Display order is entry order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChatHistory {
    entries: Vec<ChatEntry>,
}

impl ChatHistory {
    /// History made of confirmed server messages.
    #[must_use]
    pub fn from_server(messages: Vec<ChatMessage>) -> Self {
        Self { entries: messages.into_iter().map(ChatEntry::Confirmed).collect() }
    }

    /// Append a pending user message for `temp_id`.
    ///
    /// Call this before issuing the send request so the message shows up
    /// immediately.
    ///
    /// # Errors
    ///
    /// Returns [`ChatHistoryError::DuplicateTempId`] if an entry already
    /// carries `temp_id`.
    pub fn append_optimistic(&mut self, temp_id: TempId, content: impl Into<String>) -> Result<(), ChatHistoryError> {
        if self.position_of(&temp_id).is_some() {
            return Err(ChatHistoryError::DuplicateTempId(temp_id));
        }
        self.entries
            .push(ChatEntry::Pending(PendingChatMessage::user(temp_id, content)));
        Ok(())
    }

    /// Replace the pending entry for `temp_id` with the server's message.
    ///
    /// Returns `false` (and changes nothing) if no entry matches, e.g. the
    /// send was already rolled back or acknowledged.
    pub fn acknowledge(&mut self, temp_id: &TempId, message: ChatMessage) -> bool {
        let Some(idx) = self.position_of(temp_id) else {
            tracing::debug!(temp_id = %temp_id, "acknowledge for unknown temp id; ignoring");
            return false;
        };
        // A refresh may already have delivered this message.
        if self.entries.iter().any(|e| e.id() == Some(message.id)) {
            self.entries.remove(idx);
        } else {
            self.entries[idx] = ChatEntry::Confirmed(message);
        }
        true
    }

    /// Remove the pending entry for `temp_id`, returning it.
    pub fn rollback(&mut self, temp_id: &TempId) -> Option<PendingChatMessage> {
        let idx = self.position_of(temp_id)?;
        match self.entries.remove(idx) {
            ChatEntry::Pending(pending) => Some(pending),
            ChatEntry::Confirmed(_) => None,
        }
    }

    /// Apply a full-history snapshot from the server.
    ///
    /// Result order: the snapshot, then locally confirmed messages the
    /// snapshot does not contain yet, then entries still pending.
    pub fn merge_server(&mut self, snapshot: Vec<ChatMessage>) {
        let known: HashSet<MessageId> = snapshot.iter().map(|m| m.id).collect();
        let (pending, confirmed): (Vec<ChatEntry>, Vec<ChatEntry>) = self.entries.drain(..).partition(ChatEntry::is_pending);
        let late_confirmed = confirmed
            .into_iter()
            .filter(|e| e.id().is_some_and(|id| !known.contains(&id)));

        let mut merged: Vec<ChatEntry> = snapshot.into_iter().map(ChatEntry::Confirmed).collect();
        merged.extend(late_confirmed);
        merged.extend(pending);
        self.entries = merged;
    }

    #[must_use]
    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_pending()).count()
    }

    #[must_use]
    pub fn last(&self) -> Option<&ChatEntry> {
        self.entries.last()
    }

    fn position_of(&self, temp_id: &TempId) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.temp_id() == Some(temp_id))
    }
}
