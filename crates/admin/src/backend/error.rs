//! Backend API errors.

use thiserror::Error;

/// Errors that can occur when calling the backend REST API.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The request never produced a response (connection refused, timeout).
    #[error("Backend request failed: {0}")]
    Request(String),

    /// The response body was not the JSON we expected.
    #[error("Malformed backend response (HTTP {status}): {detail}")]
    MalformedResponse {
        /// HTTP status of the response.
        status: u16,
        /// Parser error detail.
        detail: String,
    },

    /// The backend rejected the request; `message` is its own wording.
    #[error("{message}")]
    Domain {
        /// HTTP status of the response.
        status: u16,
        /// Message from the `error` field, or a generic fallback.
        message: String,
    },

    /// A request URL could not be built.
    #[error("Invalid backend URL: {0}")]
    Url(String),
}

impl BackendError {
    /// HTTP status of the failed response, if there was one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::MalformedResponse { status, .. } | Self::Domain { status, .. } => Some(*status),
            Self::Request(_) | Self::Url(_) => None,
        }
    }
}
