//! Chat panel controller for one project.
//!
//! DESIGN
//! ======
//! Sends are optimistic: the user's message is appended under a fresh temp id
//! before the request goes out, then acknowledged or rolled back by that id
//! alone. Several sends may overlap and resolve in any order. Assistant
//! replies are picked up by the history refresh that follows each
//! acknowledgment.
//!
//! ERROR HANDLING
//! ==============
//! A missing or failed session lookup falls back to a local session id and
//! marks the panel degraded. Degraded panels treat history failures as an
//! empty history. Send failures roll back, restore the draft if the input is
//! empty, and raise a notice.

#[cfg(test)]
#[path = "chat_panel_test.rs"]
mod chat_panel_test;

use std::sync::{Arc, MutexGuard};

use super::Mounted;
use super::notice::Notice;
use crate::chat::{ChatEntry, ChatHistory, ChatSession, SessionId, TempId};
use crate::net::{ChatBackend, ProjectId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatPanelView {
    Loading,
    Failed {
        message: String,
    },
    Ready {
        session: ChatSession,
        /// The session id was generated locally.
        degraded: bool,
        entries: Vec<ChatEntry>,
        /// At least one send has not finished its round trip.
        awaiting_reply: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank text, or the panel is not ready.
    Ignored,
    Acknowledged,
    RolledBack,
    /// The panel was unmounted before the send resolved.
    Discarded,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
enum Phase {
    #[default]
    Loading,
    Failed(String),
    Ready,
}

#[derive(Debug, Default)]
struct ChatPanelState {
    phase: Phase,
    session: Option<ChatSession>,
    degraded: bool,
    history: ChatHistory,
    draft: String,
    in_flight: usize,
    notices: Vec<Notice>,
}

/// Controller handle. Clones share the same mount.
#[derive(Clone)]
pub struct ChatPanel {
    backend: Arc<dyn ChatBackend>,
    project_id: ProjectId,
    inner: Arc<Mounted<ChatPanelState>>,
}

impl ChatPanel {
    #[must_use]
    pub fn mount(backend: Arc<dyn ChatBackend>, project_id: ProjectId) -> Self {
        Self { backend, project_id, inner: Arc::new(Mounted::new()) }
    }

    /// Resolve the session and fetch its history.
    pub async fn load(&self) {
        let Some(mut state) = self.inner.lock_mounted() else {
            return;
        };
        state.phase = Phase::Loading;
        drop(state);

        let resolved = self.backend.resolve_session(self.project_id).await;
        let Some(mut state) = self.guard("session") else {
            return;
        };
        let (session_id, degraded) = match resolved {
            Ok(Some(id)) => (id, false),
            Ok(None) => {
                let id = SessionId::fallback();
                tracing::warn!(project_id = self.project_id, session_id = %id, "backend supplied no chat session; using local id");
                (id, true)
            }
            Err(e) => {
                let id = SessionId::fallback();
                tracing::warn!(error = %e, project_id = self.project_id, session_id = %id, "chat session lookup failed; using local id");
                state.notices.push(Notice::info(
                    "Offline Chat",
                    "Could not reach the chat service; messages may not be saved.",
                ));
                (id, true)
            }
        };
        state.degraded = degraded;
        drop(state);

        let fetched = self.backend.chat_history(&session_id).await;
        let Some(mut state) = self.guard("history") else {
            return;
        };
        match fetched {
            Ok(history) => {
                state.history.merge_server(history.messages);
                state.session = Some(history.session);
                state.phase = Phase::Ready;
            }
            Err(e) if degraded => {
                tracing::warn!(error = %e, session_id = %session_id, "history unavailable for local session; starting empty");
                state.session = Some(ChatSession::local(session_id));
                state.phase = Phase::Ready;
            }
            Err(e) => {
                let message = format!("Could not load chat history: {e}");
                state.notices.push(Notice::error("Error Loading Chat", message.clone()));
                state.phase = Phase::Failed(message);
            }
        }
    }

    /// Send `text` as a user message.
    pub async fn send(&self, text: &str) -> SendOutcome {
        let content = text.trim();
        if content.is_empty() {
            return SendOutcome::Ignored;
        }
        let Some(mut state) = self.inner.lock_mounted() else {
            return SendOutcome::Discarded;
        };
        let Some(session_id) = state.session.as_ref().map(|s| s.id.clone()) else {
            return SendOutcome::Ignored;
        };
        if state.phase != Phase::Ready {
            return SendOutcome::Ignored;
        }
        let temp_id = TempId::generate();
        if let Err(e) = state.history.append_optimistic(temp_id.clone(), content) {
            tracing::error!(error = %e, "temp id collision; dropping send");
            return SendOutcome::Ignored;
        }
        state.in_flight += 1;
        drop(state);

        let sent = self.backend.send_message(&session_id, content).await;

        let Some(mut state) = self.guard("send") else {
            return SendOutcome::Discarded;
        };
        match sent {
            Ok(message) => {
                tracing::debug!(temp_id = %temp_id, id = message.id.0, "message acknowledged");
                state.history.acknowledge(&temp_id, message);
                drop(state);
                self.refresh().await;
                if let Some(mut state) = self.inner.lock_mounted() {
                    state.in_flight = state.in_flight.saturating_sub(1);
                }
                SendOutcome::Acknowledged
            }
            Err(e) => {
                tracing::warn!(error = %e, temp_id = %temp_id, "send failed; rolling back");
                state.in_flight = state.in_flight.saturating_sub(1);
                if let Some(pending) = state.history.rollback(&temp_id) {
                    if state.draft.trim().is_empty() {
                        state.draft = pending.content;
                    }
                }
                state
                    .notices
                    .push(Notice::error("Error", format!("Failed to send your message: {e}")));
                SendOutcome::RolledBack
            }
        }
    }

    /// Clear the draft and send what it held.
    pub async fn send_draft(&self) -> SendOutcome {
        let draft = match self.inner.lock_mounted() {
            Some(mut state) => std::mem::take(&mut state.draft),
            None => return SendOutcome::Discarded,
        };
        self.send(&draft).await
    }

    /// Re-fetch the session history and merge it with local entries.
    pub async fn refresh(&self) {
        let Some((session_id, degraded)) = self
            .inner
            .lock_mounted()
            .and_then(|s| s.session.as_ref().map(|session| (session.id.clone(), s.degraded)))
        else {
            return;
        };

        let fetched = self.backend.chat_history(&session_id).await;
        let Some(mut state) = self.guard("refresh") else {
            return;
        };
        match fetched {
            Ok(history) => {
                state.history.merge_server(history.messages);
                state.session = Some(history.session);
            }
            Err(e) if degraded => {
                tracing::warn!(error = %e, session_id = %session_id, "history refresh failed for local session");
            }
            Err(e) => {
                state
                    .notices
                    .push(Notice::error("Error", format!("Could not refresh chat history: {e}")));
            }
        }
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        if let Some(mut state) = self.inner.lock_mounted() {
            state.draft = text.into();
        }
    }

    #[must_use]
    pub fn draft(&self) -> String {
        self.inner.lock().draft.clone()
    }

    #[must_use]
    pub fn view(&self) -> ChatPanelView {
        let state = self.inner.lock();
        match (&state.phase, &state.session) {
            (Phase::Failed(message), _) => ChatPanelView::Failed { message: message.clone() },
            (Phase::Ready, Some(session)) => ChatPanelView::Ready {
                session: session.clone(),
                degraded: state.degraded,
                entries: state.history.entries().to_vec(),
                awaiting_reply: state.in_flight > 0,
            },
            _ => ChatPanelView::Loading,
        }
    }

    /// Drain pending notices.
    pub fn take_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut self.inner.lock().notices)
    }

    pub fn unmount(&self) {
        self.inner.unmount();
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.inner.is_mounted()
    }

    fn guard(&self, step: &'static str) -> Option<MutexGuard<'_, ChatPanelState>> {
        let guard = self.inner.lock_mounted();
        if guard.is_none() {
            tracing::debug!(step, project_id = self.project_id, "chat panel unmounted; dropping response");
        }
        guard
    }
}
