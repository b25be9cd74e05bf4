//! Collaborator error type.

/// Failure talking to the document backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request could not be sent or the body could not be read.
    #[error("request failed: {0}")]
    Request(String),

    /// The backend returned a non-success status. `message` is already
    /// rendered for display.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The response body did not decode into the expected shape.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// The configured base URL cannot have endpoint paths joined onto it.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    /// HTTP status for `Status` errors.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
