//! Sign-in entry point.
//!
//! Staff accounts live in the admin panel; the storefront only links there.

use axum::{extract::State, response::Redirect};

use crate::state::AppState;

/// Redirect to the admin login page.
pub async fn login(State(state): State<AppState>) -> Redirect {
    Redirect::to(&admin_login_url(&state.config().admin_url))
}

fn admin_login_url(admin_url: &str) -> String {
    format!("{}/login", admin_url.trim_end_matches('/'))
}
