//! Product listing route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use super::{Layout, ProductGrid};
use crate::filters;
use crate::state::AppState;

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products.html")]
pub struct ProductsTemplate {
    pub layout: Layout,
    pub grid: ProductGrid,
}

/// Display every product with its WhatsApp order link.
///
/// A backend failure is shown inline, the page itself still renders.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    ProductsTemplate {
        layout: Layout::new(&state, "/products"),
        grid: ProductGrid::load(&state).await,
    }
}
