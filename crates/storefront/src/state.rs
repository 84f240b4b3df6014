//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::CatalogClient;
use crate::config::StorefrontConfig;
use crate::services::EmailJsClient;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: CatalogClient,
    emailjs: Option<EmailJsClient>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let catalog = CatalogClient::new(config.backend_url.clone());
        let emailjs = config.emailjs.clone().map(EmailJsClient::new);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                emailjs,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product feed client.
    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }

    /// The contact form sender, when EmailJS is configured.
    #[must_use]
    pub fn emailjs(&self) -> Option<&EmailJsClient> {
        self.inner.emailjs.as_ref()
    }
}
