//! Static content page route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use super::Layout;
use crate::content::{FAQS, FaqEntry, STATS, Stat};
use crate::filters;
use crate::state::AppState;

/// About page template.
#[derive(Template, WebTemplate)]
#[template(path = "about.html")]
pub struct AboutTemplate {
    pub layout: Layout,
    pub stats: [Stat; 4],
}

/// FAQ page template.
#[derive(Template, WebTemplate)]
#[template(path = "faq.html")]
pub struct FaqTemplate {
    pub layout: Layout,
    pub faqs: [FaqEntry; 10],
}

/// Display the About page.
#[instrument(skip(state))]
pub async fn about(State(state): State<AppState>) -> impl IntoResponse {
    AboutTemplate {
        layout: Layout::new(&state, "/about"),
        stats: STATS,
    }
}

/// Display the FAQ page.
#[instrument(skip(state))]
pub async fn faq(State(state): State<AppState>) -> impl IntoResponse {
    FaqTemplate {
        layout: Layout::new(&state, "/faq"),
        faqs: FAQS,
    }
}
