//! MS Apparels Storefront library.
//!
//! The public marketing site: home, about, FAQ and contact pages plus the
//! product grid read from the MS Apparels backend. Orders go through
//! WhatsApp; contact messages through EmailJS.
//!
//! The binary in `main.rs` adds Sentry and request tracing around [`app`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod content;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, middleware as axum_middleware, routing::get};
use tower_http::services::ServeDir;

use state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Build the storefront router with sessions and security middleware.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new("crates/storefront/static"))
        .fallback(routes::not_found)
        .layer(session_layer)
        .layer(axum_middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum_middleware::from_fn(middleware::request_id_middleware))
        .with_state(state)
}
