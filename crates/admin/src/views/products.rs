//! Product management operations.

use ms_apparels_core::{ImageData, Price, Product, ProductDraft, ProductId};
use tokio::sync::Mutex;
use tracing::instrument;

use super::error::ViewError;
use super::resource::{
    Confirmation, DeleteOutcome, ResourceView, mount, sync_created, sync_updated,
};
use crate::backend::BackendClient;

pub const ADDED: &str = "Product added successfully!";
pub const UPDATED: &str = "Product updated successfully!";
pub const DELETED: &str = "Your product has been deleted.";
pub const NO_RECORDS: &str = "No products found in the database.";
pub const NO_MATCHES: &str = "No products match your search.";

const ALL_FIELDS_REQUIRED: &str = "All fields are required";
const PRICES_MUST_BE_POSITIVE: &str = "Price and old price must be positive numbers";

/// Raw product form input.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: String,
    pub price: String,
    pub old_price: String,
    /// Newly uploaded image, if any.
    pub image: Option<ImageData>,
}

impl ProductForm {
    /// Validate the form into a backend payload.
    ///
    /// `current_image` is the image already on the record being edited; it is
    /// kept when no new image was uploaded.
    ///
    /// # Errors
    ///
    /// Returns a validation error when a field is missing or a price is not
    /// a positive number.
    pub fn validate(&self, current_image: Option<&str>) -> Result<ProductDraft, ViewError> {
        let name = self.name.trim();
        let image = self
            .image
            .as_ref()
            .map(|i| i.as_str().to_owned())
            .or_else(|| current_image.filter(|i| !i.is_empty()).map(str::to_owned));

        let Some(image) = image else {
            return Err(ViewError::validation("image", ALL_FIELDS_REQUIRED));
        };
        if name.is_empty() {
            return Err(ViewError::validation("name", ALL_FIELDS_REQUIRED));
        }
        if self.price.trim().is_empty() || self.old_price.trim().is_empty() {
            return Err(ViewError::validation("price", ALL_FIELDS_REQUIRED));
        }

        let price = Price::parse(&self.price)
            .map_err(|_| ViewError::validation("price", PRICES_MUST_BE_POSITIVE))?;
        let old_price = Price::parse(&self.old_price)
            .map_err(|_| ViewError::validation("old_price", PRICES_MUST_BE_POSITIVE))?;

        Ok(ProductDraft {
            name: name.to_owned(),
            image,
            price,
            old_price,
        })
    }

    /// Prefill from an existing record.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price.map(|p| p.to_input_value()).unwrap_or_default(),
            old_price: product
                .old_price
                .map(|p| p.to_input_value())
                .unwrap_or_default(),
            image: None,
        }
    }
}

fn record_from_draft(id: ProductId, draft: ProductDraft, prior: Option<&Product>) -> Product {
    Product {
        id,
        name: draft.name,
        image: Some(draft.image),
        price: Some(draft.price),
        old_price: Some(draft.old_price),
        created_at: prior.and_then(|p| p.created_at),
    }
}

/// Fetch all products into the view.
///
/// # Errors
///
/// Returns the fetch error.
pub async fn load(
    backend: &BackendClient,
    view: &Mutex<ResourceView<Product>>,
) -> Result<(), ViewError> {
    mount(view, || async move { backend.list_products().await.map_err(ViewError::from) }).await
}

/// Validate and create a product.
///
/// Validation failures return before any network call.
///
/// # Errors
///
/// Returns validation errors or the backend's rejection.
#[instrument(skip(backend, view, form), fields(name = %form.name))]
pub async fn create(
    backend: &BackendClient,
    view: &Mutex<ResourceView<Product>>,
    form: &ProductForm,
) -> Result<(), ViewError> {
    let draft = form.validate(None)?;
    let ack = backend.create_product(&draft).await?;
    sync_created(
        view,
        ack,
        |id| record_from_draft(ProductId::new(id), draft, None),
        || async move { backend.list_products().await.map_err(ViewError::from) },
    )
    .await
}

/// Validate and update a product.
///
/// # Errors
///
/// Returns validation errors, [`ViewError::NotFound`] if the product is not
/// in the view, or the backend's rejection.
#[instrument(skip(backend, view, form), fields(id = %id))]
pub async fn update(
    backend: &BackendClient,
    view: &Mutex<ResourceView<Product>>,
    id: &ProductId,
    form: &ProductForm,
) -> Result<Product, ViewError> {
    let prior = view
        .lock()
        .await
        .get(id)
        .cloned()
        .ok_or(ViewError::NotFound("Product"))?;

    let draft = form.validate(prior.image.as_deref())?;
    let ack = backend.update_product(id, &draft).await?;
    let submitted = record_from_draft(id.clone(), draft, Some(&prior));
    Ok(sync_updated(view, ack, submitted).await)
}

/// Delete a product after confirmation.
///
/// # Errors
///
/// Returns the backend's rejection; local state is then unchanged.
#[instrument(skip(backend, view), fields(id = %id))]
pub async fn delete(
    backend: &BackendClient,
    view: &Mutex<ResourceView<Product>>,
    id: &ProductId,
    confirmation: Confirmation,
) -> Result<DeleteOutcome, ViewError> {
    if confirmation == Confirmation::Cancelled {
        return Ok(DeleteOutcome::Cancelled);
    }

    backend.delete_product(id).await?;
    view.lock().await.apply_removed(id);
    Ok(DeleteOutcome::Deleted)
}

/// Outcome of a client-side search.
#[derive(Debug, PartialEq, Eq)]
pub enum SearchOutcome<'a> {
    /// Products whose name contains the query.
    Matches(Vec<&'a Product>),
    /// The collection has products but none match.
    NoMatches,
    /// The collection is empty.
    NoRecords,
}

impl SearchOutcome<'_> {
    /// Empty-state copy, if any.
    #[must_use]
    pub const fn empty_message(&self) -> Option<&'static str> {
        match self {
            Self::Matches(_) => None,
            Self::NoMatches => Some(NO_MATCHES),
            Self::NoRecords => Some(NO_RECORDS),
        }
    }
}

/// Filter already-fetched products by name, ignoring case.
///
/// A blank query matches everything. No network call is made.
#[must_use]
pub fn search<'a>(products: &'a [Product], query: &str) -> SearchOutcome<'a> {
    if products.is_empty() {
        return SearchOutcome::NoRecords;
    }

    let needle = query.trim().to_lowercase();
    let matches: Vec<&Product> = products
        .iter()
        .filter(|p| needle.is_empty() || p.name_contains(&needle))
        .collect();

    if matches.is_empty() {
        SearchOutcome::NoMatches
    } else {
        SearchOutcome::Matches(matches)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: &str, name: &str) -> Product {
        serde_json::from_value(serde_json::json!({
            "_id": id,
            "name": name,
            "image": "data:image/png;base64,AQID",
            "price": 10,
            "oldPrice": 12
        }))
        .unwrap()
    }

    fn form(price: &str, old_price: &str) -> ProductForm {
        ProductForm {
            name: "Classic Tee".to_string(),
            price: price.to_string(),
            old_price: old_price.to_string(),
            image: Some(ImageData::from_bytes("image/png", &[1, 2, 3]).unwrap()),
        }
    }

    #[test]
    fn test_validate_accepts_complete_form() {
        let draft = form("19.99", "24.99").validate(None).unwrap();
        assert_eq!(draft.name, "Classic Tee");
        assert_eq!(draft.price.display(), "$19.99");
    }

    #[test]
    fn test_validate_rejects_zero_price() {
        let err = form("0", "10").validate(None).unwrap_err();
        assert_eq!(err.to_string(), PRICES_MUST_BE_POSITIVE);
    }

    #[test]
    fn test_validate_rejects_non_numeric_price() {
        let err = form("ten", "10").validate(None).unwrap_err();
        assert_eq!(err.to_string(), PRICES_MUST_BE_POSITIVE);
        let err = form("10", "-1").validate(None).unwrap_err();
        assert_eq!(err.field(), Some("old_price"));
    }

    #[test]
    fn test_validate_requires_all_fields() {
        let mut missing_image = form("10", "12");
        missing_image.image = None;
        assert_eq!(
            missing_image.validate(None).unwrap_err().to_string(),
            ALL_FIELDS_REQUIRED
        );

        let mut missing_name = form("10", "12");
        missing_name.name = "   ".to_string();
        assert_eq!(
            missing_name.validate(None).unwrap_err().to_string(),
            ALL_FIELDS_REQUIRED
        );

        assert_eq!(
            form("", "12").validate(None).unwrap_err().to_string(),
            ALL_FIELDS_REQUIRED
        );
    }

    #[test]
    fn test_validate_keeps_current_image_on_edit() {
        let mut edit = form("10", "12");
        edit.image = None;
        let draft = edit.validate(Some("data:image/png;base64,BBBB")).unwrap();
        assert_eq!(draft.image, "data:image/png;base64,BBBB");
    }

    #[test]
    fn test_search_single_match() {
        let products = vec![product("1", "Classic Tee"), product("2", "Blue Hoodie")];
        match search(&products, "HOOD") {
            SearchOutcome::Matches(found) => {
                assert_eq!(found.len(), 1);
                assert_eq!(found[0].id.as_str(), "2");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_search_no_match_is_not_no_records() {
        let products = vec![product("1", "Classic Tee")];
        let outcome = search(&products, "jacket");
        assert_eq!(outcome, SearchOutcome::NoMatches);
        assert_eq!(outcome.empty_message(), Some(NO_MATCHES));

        let empty = search(&[], "jacket");
        assert_eq!(empty, SearchOutcome::NoRecords);
        assert_eq!(empty.empty_message(), Some(NO_RECORDS));
    }

    #[test]
    fn test_blank_query_shows_everything() {
        let products = vec![product("1", "Classic Tee"), product("2", "Blue Hoodie")];
        assert!(matches!(search(&products, "  "), SearchOutcome::Matches(v) if v.len() == 2));
    }

    #[test]
    fn test_prefill_from_product() {
        let prefill = ProductForm::from_product(&product("1", "Classic Tee"));
        assert_eq!(prefill.price, "10.00");
        assert_eq!(prefill.old_price, "12.00");
        assert!(prefill.image.is_none());
    }

    #[tokio::test]
    async fn test_cancelled_delete_sends_nothing() {
        let backend = BackendClient::new("http://127.0.0.1:9");
        let view = Mutex::new(ResourceView::new());
        view.lock()
            .await
            .finish_loading(Ok(vec![product("1", "Tee")]))
            .unwrap();

        let outcome = delete(&backend, &view, &ProductId::new("1"), Confirmation::Cancelled)
            .await
            .unwrap();
        assert_eq!(outcome, DeleteOutcome::Cancelled);
        assert_eq!(view.lock().await.records().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_create_makes_no_request() {
        // Port 9 (discard) is never listening; a request would fail as Unreachable.
        let backend = BackendClient::new("http://127.0.0.1:9");
        let view = Mutex::new(ResourceView::new());
        let err = create(&backend, &view, &form("0", "5")).await.unwrap_err();
        assert!(matches!(err, ViewError::Validation { .. }));
    }
}
