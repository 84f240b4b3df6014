//! Product management route handlers.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Multipart, Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use ms_apparels_core::{Product, ProductId};
use serde::Deserialize;
use tracing::instrument;

use super::upload::UploadForm;
use super::{ConfirmForm, ConfirmTemplate, Layout, render};
use crate::error::AppError;
use crate::filters;
use crate::middleware::AdminSession;
use crate::state::AppState;
use crate::views::products::{self, ProductForm, SearchOutcome};
use crate::views::{Confirmation, DeleteOutcome, LoadState, Notice, ViewError, notify};

const ADD_PATH: &str = "/dashboard/products/add";
const SHOW_PATH: &str = "/dashboard/products/show";

/// Product row for templates.
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub price: String,
    pub old_price: String,
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            image: product.image.clone(),
            price: product.price.map_or_else(|| "N/A".to_string(), |p| p.display()),
            old_price: product
                .old_price
                .map_or_else(|| "N/A".to_string(), |p| p.display()),
        }
    }
}

/// Search query.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Add or edit product form template.
#[derive(Template)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub layout: Layout,
    pub heading: &'static str,
    pub submit_label: &'static str,
    pub name: String,
    pub price: String,
    pub old_price: String,
    pub image: Option<String>,
    pub action: String,
    pub cancel: Option<String>,
}

/// Product list template.
#[derive(Template)]
#[template(path = "products/show.html")]
pub struct ProductListTemplate {
    pub layout: Layout,
    pub query: String,
    pub products: Vec<ProductRow>,
    pub empty_message: Option<&'static str>,
    pub error: Option<String>,
}

/// Build the product router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(ADD_PATH, get(add_page).post(add))
        .route(SHOW_PATH, get(show))
        .route("/dashboard/products/{id}/edit", get(edit_page).post(edit))
        .route(
            "/dashboard/products/{id}/delete",
            get(delete_page).post(delete),
        )
}

/// The typed fields of an upload, plus the image error if the file was
/// rejected.
fn form_from_upload(mut upload: UploadForm) -> (ProductForm, Option<ViewError>) {
    let (image, image_error) = upload.take_image();
    let form = ProductForm {
        name: upload.text("name"),
        price: upload.text("price"),
        old_price: upload.text("old_price"),
        image,
    };
    (form, image_error.map(|e| ViewError::validation("image", e.to_string())))
}

fn edit_path(id: &str) -> String {
    format!("/dashboard/products/{id}/edit")
}

async fn find(
    state: &AppState,
    admin: &AdminSession,
    id: &ProductId,
) -> Result<Option<Product>, ViewError> {
    if *admin.workspace.products.lock().await.state() == LoadState::Loading {
        products::load(state.backend(), &admin.workspace.products).await?;
    }
    Ok(admin.workspace.products.lock().await.get(id).cloned())
}

// =============================================================================
// Add
// =============================================================================

fn add_template(layout: Layout, form: &ProductForm) -> ProductFormTemplate {
    ProductFormTemplate {
        layout,
        heading: "Add Product",
        submit_label: "Add Product",
        name: form.name.clone(),
        price: form.price.clone(),
        old_price: form.old_price.clone(),
        image: form.image.as_ref().map(|i| i.as_str().to_owned()),
        action: ADD_PATH.to_string(),
        cancel: None,
    }
}

/// GET /dashboard/products/add
async fn add_page(admin: AdminSession, State(state): State<AppState>) -> impl IntoResponse {
    let layout = Layout::new(&admin, &state, ADD_PATH).await;
    render(&add_template(layout, &ProductForm::default()))
}

/// POST /dashboard/products/add
#[instrument(skip_all)]
async fn add(
    admin: AdminSession,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let upload = UploadForm::read(multipart).await?;
    let mut layout = Layout::new(&admin, &state, ADD_PATH).await;

    let (form, image_error) = form_from_upload(upload);
    if let Some(e) = image_error {
        layout.error(&e);
        return Ok(render(&add_template(layout, &form)).into_response());
    }

    match products::create(state.backend(), &admin.workspace.products, &form).await {
        Ok(()) => {
            notify::push(&admin.session, Notice::success(products::ADDED)).await;
            Ok(Redirect::to(ADD_PATH).into_response())
        }
        Err(e) => {
            layout.error(&e);
            Ok(render(&add_template(layout, &form)).into_response())
        }
    }
}

// =============================================================================
// List and Search
// =============================================================================

/// Whether the list request needs a fetch.
///
/// A plain visit always fetches. A search filters the collection already in
/// the view and only fetches when nothing has been loaded yet.
fn needs_fetch(query: &str, state: &LoadState) -> bool {
    query.trim().is_empty() || *state != LoadState::Ready
}

/// Product list. A plain visit fetches; `?q=` filters the fetched list.
///
/// GET /dashboard/products/show
async fn show(
    admin: AdminSession,
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    let mut layout = Layout::new(&admin, &state, SHOW_PATH).await;

    let load_state = admin.workspace.products.lock().await.state().clone();
    let error = if needs_fetch(&query.q, &load_state) {
        match products::load(state.backend(), &admin.workspace.products).await {
            Ok(()) => None,
            Err(e) => {
                layout.error(&e);
                Some(e.to_string())
            }
        }
    } else {
        None
    };

    let view = admin.workspace.products.lock().await;
    let outcome = products::search(view.records(), &query.q);
    let empty_message = outcome.empty_message().filter(|_| error.is_none());
    let rows = match outcome {
        SearchOutcome::Matches(found) => found.into_iter().map(ProductRow::from).collect(),
        SearchOutcome::NoMatches | SearchOutcome::NoRecords => Vec::new(),
    };
    drop(view);

    render(&ProductListTemplate {
        layout,
        query: query.q,
        products: rows,
        empty_message,
        error,
    })
}

// =============================================================================
// Edit
// =============================================================================

fn edit_template(
    layout: Layout,
    id: &str,
    form: &ProductForm,
    image: Option<String>,
) -> ProductFormTemplate {
    ProductFormTemplate {
        layout,
        heading: "Edit Product",
        submit_label: "Update Product",
        name: form.name.clone(),
        price: form.price.clone(),
        old_price: form.old_price.clone(),
        image,
        action: edit_path(id),
        cancel: Some(SHOW_PATH.to_string()),
    }
}

/// GET /dashboard/products/{id}/edit
async fn edit_page(
    admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let product = match find(&state, &admin, &ProductId::new(id.clone())).await {
        Ok(Some(product)) => product,
        Ok(None) => return Err(AppError::NotFound(format!("product {id}"))),
        Err(e) => {
            notify::push(&admin.session, Notice::from(&e)).await;
            return Ok(Redirect::to(SHOW_PATH).into_response());
        }
    };

    let layout = Layout::new(&admin, &state, SHOW_PATH).await;
    let form = ProductForm::from_product(&product);
    Ok(render(&edit_template(layout, &id, &form, product.image)).into_response())
}

/// POST /dashboard/products/{id}/edit
#[instrument(skip(admin, state, multipart))]
async fn edit(
    admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let upload = UploadForm::read(multipart).await?;
    let product_id = ProductId::new(id.clone());
    let current = find(&state, &admin, &product_id).await.ok().flatten();

    let (form, image_error) = form_from_upload(upload);
    let result = match image_error {
        Some(e) => Err(e),
        None => {
            let view = &admin.workspace.products;
            products::update(state.backend(), view, &product_id, &form).await
        }
    };

    match result {
        Ok(_) => {
            notify::push(&admin.session, Notice::success(products::UPDATED)).await;
            Ok(Redirect::to(SHOW_PATH).into_response())
        }
        Err(e) => {
            let Some(current) = current else {
                notify::push(&admin.session, Notice::from(&e)).await;
                return Ok(Redirect::to(SHOW_PATH).into_response());
            };
            let mut layout = Layout::new(&admin, &state, SHOW_PATH).await;
            layout.error(&e);
            Ok(render(&edit_template(layout, &id, &form, current.image)).into_response())
        }
    }
}

// =============================================================================
// Delete
// =============================================================================

/// GET /dashboard/products/{id}/delete
async fn delete_page(
    admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let Some(product) = find(&state, &admin, &ProductId::new(id.clone()))
        .await
        .ok()
        .flatten()
    else {
        return Redirect::to(SHOW_PATH).into_response();
    };

    render(&ConfirmTemplate {
        layout: Layout::new(&admin, &state, SHOW_PATH).await,
        subject: product.name,
        action: format!("/dashboard/products/{id}/delete"),
        cancel: SHOW_PATH.to_string(),
    })
    .into_response()
}

/// POST /dashboard/products/{id}/delete
#[instrument(skip(admin, state, form))]
async fn delete(
    admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<ConfirmForm>,
) -> Redirect {
    let result = products::delete(
        state.backend(),
        &admin.workspace.products,
        &ProductId::new(id),
        Confirmation::from_form(form.confirm.as_deref()),
    )
    .await;

    match result {
        Ok(DeleteOutcome::Deleted) => {
            notify::push(&admin.session, Notice::success(products::DELETED)).await;
        }
        Ok(DeleteOutcome::Cancelled) => {}
        Err(e) => notify::push(&admin.session, Notice::from(&e)).await,
    }
    Redirect::to(SHOW_PATH)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ms_apparels_core::ImageError;

    use super::*;

    #[test]
    fn test_row_formats_prices() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "_id": "p1",
            "name": "Classic Tee",
            "price": 19.5,
        }))
        .unwrap();
        let row = ProductRow::from(&product);
        assert_eq!(row.price, "$19.50");
        assert_eq!(row.old_price, "N/A");
    }

    #[test]
    fn test_form_from_upload() {
        let upload = UploadForm::from_parts(
            [
                ("name".to_string(), "Tee".to_string()),
                ("price".to_string(), "10".to_string()),
                ("old_price".to_string(), "12".to_string()),
            ],
            None,
        );
        let (form, image_error) = form_from_upload(upload);
        assert_eq!(form.name, "Tee");
        assert_eq!(form.old_price, "12");
        assert!(form.image.is_none());
        assert!(image_error.is_none());
    }

    #[test]
    fn test_rejected_image_keeps_typed_fields() {
        let upload = UploadForm::from_parts(
            [
                ("name".to_string(), "Tee".to_string()),
                ("price".to_string(), "10".to_string()),
            ],
            Some(Err(ImageError::TooLarge { size: 3_000_000 })),
        );
        let (form, image_error) = form_from_upload(upload);
        assert_eq!(form.name, "Tee");
        assert_eq!(form.price, "10");
        assert_eq!(
            image_error.unwrap().to_string(),
            "Image size must be less than 2MB"
        );
    }

    #[test]
    fn test_search_uses_loaded_collection() {
        assert!(needs_fetch("", &LoadState::Ready));
        assert!(needs_fetch("  ", &LoadState::Ready));
        assert!(needs_fetch("tee", &LoadState::Loading));
        assert!(needs_fetch("tee", &LoadState::Failed("down".to_string())));
        assert!(!needs_fetch("tee", &LoadState::Ready));
    }
}
