//! Public product feed.
//!
//! Reads `GET {backend}/products` and caches the list with `moka`
//! (60-second TTL) so a burst of page views costs one backend call.

mod error;

pub use error::CatalogError;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use ms_apparels_core::Product;
use tracing::{debug, instrument, warn};
use url::Url;

/// Name shown for products without one.
pub const UNNAMED_PRODUCT: &str = "Unnamed Product";

const FEED_KEY: &str = "products";
const FEED_TTL: Duration = Duration::from_secs(60);

/// Client for the public product feed.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<&'static str, Arc<Vec<Product>>>,
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

impl CatalogClient {
    /// Create a client for the backend at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_ttl(base_url, FEED_TTL)
    }

    /// Create a client with a custom cache TTL.
    #[must_use]
    pub fn with_ttl(base_url: impl Into<String>, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(1).time_to_live(ttl).build();

        Self {
            inner: Arc::new(CatalogClientInner {
                client: reqwest::Client::new(),
                base_url: base_url.into(),
                cache,
            }),
        }
    }

    /// All products, served from the cache while it is fresh.
    ///
    /// Failures are not cached.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the backend is unreachable, answers with a
    /// non-2xx status, or sends something other than a product list.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Arc<Vec<Product>>, CatalogError> {
        if let Some(products) = self.inner.cache.get(FEED_KEY).await {
            debug!("Cache hit for product feed");
            return Ok(products);
        }

        let products = Arc::new(self.fetch().await?);
        self.inner.cache.insert(FEED_KEY, Arc::clone(&products)).await;
        Ok(products)
    }

    /// Drop the cached feed.
    pub async fn invalidate(&self) {
        self.inner.cache.invalidate(FEED_KEY).await;
    }

    async fn fetch(&self) -> Result<Vec<Product>, CatalogError> {
        let url = feed_url(&self.inner.base_url)?;
        let response = self
            .inner
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Product feed request failed");
            return Err(CatalogError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::Request(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| CatalogError::Malformed(e.to_string()))
    }
}

fn feed_url(base_url: &str) -> Result<Url, CatalogError> {
    let mut url = Url::parse(base_url).map_err(|e| CatalogError::Url(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| CatalogError::Url(format!("{base_url} cannot be a base")))?
        .pop_if_empty()
        .push("products");
    Ok(url)
}

// =============================================================================
// Display
// =============================================================================

/// A product as shown on the public grid.
#[derive(Debug, Clone)]
pub struct ProductCard {
    pub name: String,
    pub image: Option<String>,
    pub price: String,
    pub old_price: String,
    /// WhatsApp chat prefilled with the product name.
    pub order_url: String,
}

impl ProductCard {
    #[must_use]
    pub fn new(product: &Product, whatsapp_phone: &str) -> Self {
        let name = if product.name.trim().is_empty() {
            UNNAMED_PRODUCT.to_string()
        } else {
            product.name.clone()
        };
        let order_url = order_url(whatsapp_phone, &name);

        Self {
            image: product.image.clone().filter(|i| !i.is_empty()),
            price: product.price.map_or_else(|| "N/A".to_string(), |p| p.display()),
            old_price: product
                .old_price
                .map_or_else(|| "N/A".to_string(), |p| p.display()),
            order_url,
            name,
        }
    }
}

/// WhatsApp link asking about `product_name`.
#[must_use]
pub fn order_url(whatsapp_phone: &str, product_name: &str) -> String {
    format!(
        "https://api.whatsapp.com/send/?phone={whatsapp_phone}&text=Hi%2C+I%27m+interested+in+the+product+{}&type=phone_number&app_absent=0",
        urlencoding::encode(product_name)
    )
}

/// WhatsApp link with a general greeting.
#[must_use]
pub fn chat_url(whatsapp_phone: &str) -> String {
    format!(
        "https://api.whatsapp.com/send/?phone={whatsapp_phone}&text=Hello,%20I%20have%20a%20question!&type=phone_number&app_absent=0"
    )
}
