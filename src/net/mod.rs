//! Backend collaborators.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` defines the collaborator traits, `types` the wire schema, `http`
//! the REST implementation, and `error` the shared failure type.

pub mod api;
pub mod error;
pub mod http;
pub mod types;

pub use api::{ChatBackend, FormBackend, ProjectBackend, ProjectId};
pub use error::ApiError;
pub use http::HttpBackend;
