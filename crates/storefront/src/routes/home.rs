//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use super::{Layout, ProductGrid};
use crate::content::{REVIEWS, Review};
use crate::filters;
use crate::state::AppState;

/// Call-to-action banner at the top of the home page.
#[derive(Debug, Clone, Copy)]
pub struct Banner {
    pub badge: &'static str,
    pub title: &'static str,
    pub tagline: &'static str,
    pub button_text: &'static str,
}

pub const BANNER: Banner = Banner {
    badge: "Sale",
    title: "Ms Apparels:",
    tagline: "Where Champions Unite",
    button_text: "Get Started",
};

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub banner: Banner,
    pub grid: ProductGrid,
    pub reviews: [Review; 4],
}

/// Display the home page: banner, product grid and customer reviews.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> impl IntoResponse {
    HomeTemplate {
        layout: Layout::new(&state, "/"),
        banner: BANNER,
        grid: ProductGrid::load(&state).await,
        reviews: REVIEWS,
    }
}
