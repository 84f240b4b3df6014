//! HTTP plumbing shared by the backend endpoints.

use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::{debug, warn};
use url::Url;

use super::error::BackendError;

/// Backend REST API client.
#[derive(Clone)]
pub struct BackendClient {
    /// HTTP client.
    client: Client,
    /// API base URL without trailing slash (e.g., `http://localhost:5000/api`).
    base_url: String,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// What the backend sends back after a create or update.
///
/// Deployments differ: some echo the stored document, some return the raw
/// insert receipt, some only `{ "message": ... }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WriteAck<T> {
    /// The stored document.
    Record(T),
    /// An insert receipt carrying the new document id.
    Inserted {
        #[serde(rename = "insertedId")]
        inserted_id: String,
    },
    /// Any other JSON acknowledgment.
    Receipt(serde_json::Value),
}

/// Error body shape (`{ "error": "..." }`).
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl BackendClient {
    /// Create a new backend client.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// The configured API base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(super) const fn http(&self) -> &Client {
        &self.client
    }

    /// Build `{base}/{segments...}`, percent-encoding each segment.
    pub(super) fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| BackendError::Url(e.to_string()))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| BackendError::Url(format!("{} cannot be a base", self.base_url)))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    /// Send a request and decode a JSON success body.
    pub(super) async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, BackendError> {
        let (status, body) = Self::exchange(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            warn!(status, error = %e, "Backend returned unexpected JSON");
            BackendError::MalformedResponse {
                status,
                detail: e.to_string(),
            }
        })
    }

    /// Send a request whose success body carries nothing we need.
    ///
    /// An empty body is accepted; anything else must still be JSON.
    pub(super) async fn send_discarding(
        &self,
        request: RequestBuilder,
    ) -> Result<(), BackendError> {
        let (status, body) = Self::exchange(request).await?;
        if body.trim().is_empty() {
            return Ok(());
        }
        serde_json::from_str::<IgnoredAny>(&body)
            .map(|_| ())
            .map_err(|e| BackendError::MalformedResponse {
                status,
                detail: e.to_string(),
            })
    }

    /// Perform the request and return the status and raw body of a 2xx
    /// response. Non-2xx responses become [`BackendError::Domain`] or
    /// [`BackendError::MalformedResponse`].
    async fn exchange(request: RequestBuilder) -> Result<(u16, String), BackendError> {
        let response = request
            .send()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;

        if status.is_success() {
            debug!(status = status.as_u16(), "Backend request succeeded");
            return Ok((status.as_u16(), body));
        }

        Err(error_from_body(status.as_u16(), &body))
    }
}

/// Interpret a non-2xx body.
fn error_from_body(status: u16, body: &str) -> BackendError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => {
            let message = parsed
                .error
                .or(parsed.message)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| format!("request failed (HTTP {status})"));
            warn!(status, message = %message, "Backend rejected request");
            BackendError::Domain { status, message }
        }
        Err(e) => {
            warn!(status, error = %e, "Backend error body is not JSON");
            BackendError::MalformedResponse {
                status,
                detail: e.to_string(),
            }
        }
    }
}
