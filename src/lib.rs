//! Client core for a document workspace: per-page dynamic forms synthesized
//! from AI-generated field maps, and a project-scoped chat assistant.
//!
//! ARCHITECTURE
//! ============
//! - `form`: pure translation of generated field maps into a validation
//!   schema and render list, plus form state reconciliation.
//! - `chat`: message model and optimistic history reconciliation.
//! - `net`: collaborator traits, wire types, and the REST backend.
//! - `panel`: controllers that drive fetch, reconcile, render and submit.
//! - `config`: environment-driven client configuration.
//!
//! `form` and `chat` never suspend; only `panel` awaits collaborators.

pub mod chat;
pub mod config;
pub mod form;
pub mod net;
pub mod panel;
