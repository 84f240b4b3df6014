//! MS Apparels Admin library.
//!
//! The back-office for moderators: sign-in against the identity provider,
//! the role-gated dashboard, and moderator and product management on top of
//! the MS Apparels backend API.
//!
//! The binary in `main.rs` adds Sentry and request tracing around [`app`];
//! integration tests drive [`app`] directly against mock services.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod error;
pub mod filters;
pub mod identity;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod views;

use axum::extract::DefaultBodyLimit;
use axum::{Router, middleware as axum_middleware, routing::get};
use tower_http::services::ServeDir;

use state::AppState;

/// Request body limit. Larger than the 2MB image cap so oversized images
/// reach the form handler and get a friendly message.
pub const BODY_LIMIT_BYTES: usize = 8 * 1024 * 1024;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Build the admin router with sessions and security middleware.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new("crates/admin/static"))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(session_layer)
        .layer(axum_middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum_middleware::from_fn(middleware::request_id_middleware))
        .with_state(state)
}
