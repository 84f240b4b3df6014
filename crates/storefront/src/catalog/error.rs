//! Catalog errors.

use thiserror::Error;

/// Errors that can occur when fetching the product feed.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    /// The request never produced a response.
    #[error("Backend request failed: {0}")]
    Request(String),

    /// The backend answered with a non-2xx status.
    #[error("Failed to fetch products (HTTP {0})")]
    Status(u16),

    /// The body was not a JSON product list.
    #[error("Malformed product feed: {0}")]
    Malformed(String),

    /// The feed URL could not be built.
    #[error("Invalid backend URL: {0}")]
    Url(String),
}
