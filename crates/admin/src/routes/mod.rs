//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                              - Health check (registered in main)
//! GET  /                                    - Redirect to /dashboard
//!
//! # Auth
//! GET  /login                               - Login page
//! POST /login                               - Sign in with email and password
//! POST /logout                              - Sign out
//!
//! # Dashboard (signed in)
//! GET  /dashboard                           - Own profile
//! GET  /dashboard/profile/edit              - Edit own profile
//! POST /dashboard/profile/edit              - Save own profile (multipart)
//! GET  /dashboard/profile/delete            - Confirm own account deletion
//! POST /dashboard/profile/delete            - Delete own account
//! POST /dashboard/profile/reset-password    - Send own password-reset email
//! GET  /dashboard/{*rest}                   - Unknown paths show the dashboard
//!
//! # Moderators (admin role only)
//! GET  /dashboard/moderator/add             - Add moderator form
//! POST /dashboard/moderator/add             - Create moderator (multipart)
//! GET  /dashboard/moderator/show            - Moderator list
//! GET  /dashboard/moderator/{id}/edit       - Edit moderator form
//! POST /dashboard/moderator/{id}/edit       - Update moderator (multipart)
//! GET  /dashboard/moderator/{id}/delete     - Confirm deletion
//! POST /dashboard/moderator/{id}/delete     - Delete moderator
//! POST /dashboard/moderator/{id}/reset-password - Send password-reset email
//!
//! # Products (signed in)
//! GET  /dashboard/products/add              - Add product form
//! POST /dashboard/products/add              - Create product (multipart)
//! GET  /dashboard/products/show?q=          - Product list with search
//! GET  /dashboard/products/{id}/edit        - Edit product form
//! POST /dashboard/products/{id}/edit        - Update product (multipart)
//! GET  /dashboard/products/{id}/delete      - Confirm deletion
//! POST /dashboard/products/{id}/delete      - Delete product
//! ```

pub mod auth;
pub mod dashboard;
pub mod moderators;
pub mod products;
pub mod upload;

use askama::Template;
use axum::{
    Router,
    response::{Html, Redirect},
    routing::get,
};
use serde::Deserialize;

use crate::filters;
use crate::middleware::AdminSession;
use crate::state::AppState;
use crate::views::{Notice, ViewError, notify};

// =============================================================================
// Shared View Types
// =============================================================================

/// Signed-in user view for templates.
#[derive(Debug, Clone)]
pub struct AdminUserView {
    pub name: String,
    pub email: String,
    pub is_admin: bool,
}

impl From<&AdminSession> for AdminUserView {
    fn from(admin: &AdminSession) -> Self {
        let name = if admin.user.display_name.is_empty() {
            admin.user.email.clone()
        } else {
            admin.user.display_name.clone()
        };
        Self {
            name,
            email: admin.user.email.clone(),
            is_admin: admin.is_admin(),
        }
    }
}

/// Everything the dashboard layout needs.
#[derive(Debug, Clone)]
pub struct Layout {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub notices: Vec<Notice>,
    pub notice_duration_ms: u32,
    pub storefront_url: String,
}

impl Layout {
    /// Build the layout, taking the queued notices.
    pub async fn new(admin: &AdminSession, state: &AppState, current_path: &str) -> Self {
        Self {
            admin_user: AdminUserView::from(admin),
            current_path: current_path.to_string(),
            notices: notify::take(&admin.session).await,
            notice_duration_ms: notify::NOTICE_DURATION_MS,
            storefront_url: state.config().storefront_url.clone(),
        }
    }

    /// Add a notice raised while handling this request.
    pub fn notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    /// Add an error notice.
    pub fn error(&mut self, error: &ViewError) {
        self.notices.push(Notice::from(error));
    }

    /// Whether `prefix` is the active navigation section.
    #[must_use]
    pub fn is_active(&self, prefix: &str) -> bool {
        self.current_path.starts_with(prefix)
    }
}

/// Delete confirmation page.
#[derive(Template)]
#[template(path = "confirm.html")]
pub struct ConfirmTemplate {
    pub layout: Layout,
    pub subject: String,
    pub action: String,
    pub cancel: String,
}

/// Submitted delete confirmation.
#[derive(Debug, Deserialize)]
pub struct ConfirmForm {
    pub confirm: Option<String>,
}

/// Render a template to HTML, logging render failures.
pub fn render(template: &impl Template) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
}

// =============================================================================
// Router
// =============================================================================

/// Create all routes for the admin panel.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/dashboard") }))
        .merge(auth::router())
        .merge(dashboard::router())
        .merge(moderators::router())
        .merge(products::router())
}
