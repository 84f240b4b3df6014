//! `/products` endpoints.

use ms_apparels_core::{Product, ProductDraft, ProductId};
use tracing::instrument;

use super::client::{BackendClient, WriteAck};
use super::error::BackendError;

impl BackendClient {
    /// `GET /products`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        let url = self.endpoint(&["products"])?;
        self.send(self.http().get(url)).await
    }

    /// `POST /products`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create_product(
        &self,
        draft: &ProductDraft,
    ) -> Result<WriteAck<Product>, BackendError> {
        let url = self.endpoint(&["products"])?;
        self.send(self.http().post(url).json(draft)).await
    }

    /// `PUT /products/:id`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    #[instrument(skip(self, draft), fields(id = %id))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        draft: &ProductDraft,
    ) -> Result<WriteAck<Product>, BackendError> {
        let url = self.endpoint(&["products", id.as_str()])?;
        self.send(self.http().put(url).json(draft)).await
    }

    /// `DELETE /products/:id`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), BackendError> {
        let url = self.endpoint(&["products", id.as_str()])?;
        self.send_discarding(self.http().delete(url)).await
    }
}
