//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check (registered in lib)
//! GET  /                       - Home page
//! GET  /home                   - Home page
//!
//! # Pages
//! GET  /about                  - About us, stats and social links
//! GET  /faq                    - Frequently asked questions
//!
//! # Contact
//! GET  /contact                - Contact details and message form
//! POST /contact                - Send a message through EmailJS
//!
//! # Products
//! GET  /products               - Product grid
//!
//! # Auth
//! GET  /login                  - Redirect to the admin login page
//! ```

pub mod auth;
pub mod contact;
pub mod home;
pub mod pages;
pub mod products;

use axum::{Router, routing::get};

use crate::catalog::{ProductCard, chat_url};
use crate::content::{CONTACT, ContactDetails, SOCIAL, SocialLink};
use crate::error::Result;
use crate::state::AppState;

// =============================================================================
// Shared View Types
// =============================================================================

/// Data every page layout needs.
#[derive(Debug, Clone)]
pub struct Layout {
    /// Path of the current nav entry.
    pub active: &'static str,
    /// Floating WhatsApp button target.
    pub chat_url: String,
    pub contact: ContactDetails,
    pub social: [SocialLink; 2],
}

impl Layout {
    #[must_use]
    pub fn new(state: &AppState, active: &'static str) -> Self {
        Self {
            active,
            chat_url: chat_url(&state.config().whatsapp_phone),
            contact: CONTACT,
            social: SOCIAL,
        }
    }

    /// Whether `path` is the current page (for the nav highlight).
    #[must_use]
    pub fn is_active(&self, path: &str) -> bool {
        self.active == path
    }
}

/// Product grid as the templates show it.
#[derive(Debug, Clone, Default)]
pub struct ProductGrid {
    pub cards: Vec<ProductCard>,
    /// Set when the feed could not be loaded.
    pub error: Option<String>,
}

impl ProductGrid {
    /// Load the feed, turning failures into the grid's error state.
    pub async fn load(state: &AppState) -> Self {
        let phone = &state.config().whatsapp_phone;
        match state.catalog().products().await {
            Ok(products) => Self {
                cards: products
                    .iter()
                    .map(|product| ProductCard::new(product, phone))
                    .collect(),
                error: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, "Product feed unavailable");
                Self {
                    cards: Vec::new(),
                    error: Some(format!("Error fetching products: {e}")),
                }
            }
        }
    }

    /// True when the feed loaded but held nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.error.is_none() && self.cards.is_empty()
    }
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/home", get(home::home))
        .route("/about", get(pages::about))
        .route("/faq", get(pages::faq))
        .route("/contact", get(contact::show).post(contact::submit))
        .route("/products", get(products::index))
        .route("/login", get(auth::login))
}

/// Fallback for unknown paths.
///
/// # Errors
///
/// Always returns `AppError::NotFound`.
pub async fn not_found(uri: axum::http::Uri) -> Result<()> {
    Err(crate::error::AppError::NotFound(uri.path().to_string()))
}
