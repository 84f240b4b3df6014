//! Generic collection view with fetch-on-mount and acknowledgment sync.

use std::fmt::Display;
use std::future::Future;

use ms_apparels_core::{Moderator, ModeratorId, Product, ProductId};
use tokio::sync::Mutex;

use super::error::ViewError;
use crate::backend::WriteAck;

/// A backend document with a stable id.
pub trait Record: Clone + Send + Sync + 'static {
    type Id: Clone + PartialEq + Display + Send + Sync;

    fn id(&self) -> &Self::Id;
}

impl Record for Moderator {
    type Id = ModeratorId;

    fn id(&self) -> &ModeratorId {
        &self.id
    }
}

impl Record for Product {
    type Id = ProductId;

    fn id(&self) -> &ProductId {
        &self.id
    }
}

/// Fetch status of a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// No fetch has completed yet.
    Loading,
    /// The last fetch succeeded.
    Ready,
    /// The last fetch failed with this message.
    Failed(String),
}

/// Answer to a delete confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Cancelled,
}

impl Confirmation {
    /// Read a confirmation form value (`yes` confirms).
    #[must_use]
    pub fn from_form(value: Option<&str>) -> Self {
        if value == Some("yes") {
            Self::Confirmed
        } else {
            Self::Cancelled
        }
    }
}

/// Result of a delete operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The user cancelled; nothing was sent.
    Cancelled,
    /// The record was deleted and removed locally.
    Deleted,
}

/// Local copy of one backend collection.
#[derive(Debug, Clone)]
pub struct ResourceView<R: Record> {
    state: LoadState,
    records: Vec<R>,
}

impl<R: Record> Default for ResourceView<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> ResourceView<R> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: LoadState::Loading,
            records: Vec::new(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &LoadState {
        &self.state
    }

    #[must_use]
    pub fn records(&self) -> &[R] {
        &self.records
    }

    #[must_use]
    pub fn get(&self, id: &R::Id) -> Option<&R> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Apply the outcome of a collection fetch.
    ///
    /// A failure keeps the previous records and records the message.
    ///
    /// # Errors
    ///
    /// Returns the fetch error back so the caller can raise a notice.
    pub fn finish_loading(&mut self, result: Result<Vec<R>, ViewError>) -> Result<(), ViewError> {
        match result {
            Ok(records) => {
                self.records = records;
                self.state = LoadState::Ready;
                Ok(())
            }
            Err(e) => {
                self.state = LoadState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Append an acknowledged new record (replacing any with the same id).
    pub fn apply_created(&mut self, record: R) {
        if let Some(existing) = self.records.iter_mut().find(|r| r.id() == record.id()) {
            *existing = record;
        } else {
            self.records.push(record);
        }
    }

    /// Replace the record with the acknowledged version.
    ///
    /// Returns `false` if no record with that id is present.
    pub fn apply_updated(&mut self, record: R) -> bool {
        match self.records.iter_mut().find(|r| r.id() == record.id()) {
            Some(existing) => {
                *existing = record;
                true
            }
            None => false,
        }
    }

    /// Remove the record with `id`.
    pub fn apply_removed(&mut self, id: &R::Id) -> Option<R> {
        let index = self.records.iter().position(|r| r.id() == id)?;
        Some(self.records.remove(index))
    }
}

/// Fetch the collection and store it.
///
/// The lock is only taken once the fetch has resolved, so a dropped request
/// leaves the view untouched and concurrent mutations are not blocked.
///
/// # Errors
///
/// Returns the fetch error after recording it on the view.
pub async fn mount<R, F, Fut>(view: &Mutex<ResourceView<R>>, fetch: F) -> Result<(), ViewError>
where
    R: Record,
    F: FnOnce() -> Fut + Send,
    Fut: Future<Output = Result<Vec<R>, ViewError>> + Send,
{
    let result = fetch().await;
    if let Err(e) = &result {
        tracing::warn!(error = %e, "Collection fetch failed");
    }
    view.lock().await.finish_loading(result)
}

/// Sync a create acknowledgment into the view.
///
/// `from_id` builds the record from the submitted payload when the backend
/// only returned the new id. Any other acknowledgment triggers a refetch.
///
/// # Errors
///
/// Returns the refetch error when a refetch was needed and failed.
pub async fn sync_created<R, B, F, Fut>(
    view: &Mutex<ResourceView<R>>,
    ack: WriteAck<R>,
    from_id: B,
    refetch: F,
) -> Result<(), ViewError>
where
    R: Record,
    B: FnOnce(String) -> R + Send,
    F: FnOnce() -> Fut + Send,
    Fut: Future<Output = Result<Vec<R>, ViewError>> + Send,
{
    let record = match ack {
        WriteAck::Record(record) => record,
        WriteAck::Inserted { inserted_id } => from_id(inserted_id),
        WriteAck::Receipt(_) => return mount(view, refetch).await,
    };
    view.lock().await.apply_created(record);
    Ok(())
}

/// Sync an update acknowledgment into the view.
///
/// When the backend does not echo the stored document, the payload it
/// accepted (`submitted`) is applied. Returns the record now in the view.
pub async fn sync_updated<R: Record>(
    view: &Mutex<ResourceView<R>>,
    ack: WriteAck<R>,
    submitted: R,
) -> R {
    let record = match ack {
        WriteAck::Record(record) => record,
        WriteAck::Inserted { .. } | WriteAck::Receipt(_) => submitted,
    };
    let mut guard = view.lock().await;
    if !guard.apply_updated(record.clone()) {
        tracing::debug!(id = %record.id(), "Updated record no longer in view");
    }
    record
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: &str, name: &str) -> Product {
        serde_json::from_value(serde_json::json!({ "_id": id, "name": name })).unwrap()
    }

    fn ready(records: Vec<Product>) -> ResourceView<Product> {
        let mut view = ResourceView::new();
        view.finish_loading(Ok(records)).unwrap();
        view
    }

    #[test]
    fn test_new_view_is_loading() {
        let view: ResourceView<Product> = ResourceView::new();
        assert_eq!(view.state(), &LoadState::Loading);
        assert!(view.records().is_empty());
    }

    #[test]
    fn test_failed_fetch_keeps_records() {
        let mut view = ready(vec![product("a", "Tee")]);
        let err = view.finish_loading(Err(ViewError::Unreachable)).unwrap_err();
        assert_eq!(err, ViewError::Unreachable);
        assert_eq!(
            view.state(),
            &LoadState::Failed("Could not reach server".to_string())
        );
        assert_eq!(view.records().len(), 1);
    }

    #[test]
    fn test_remove_only_touches_target() {
        let mut view = ready(vec![product("a", "Tee"), product("b", "Hat"), product("c", "Cap")]);
        let removed = view.apply_removed(&ProductId::new("b")).unwrap();
        assert_eq!(removed.name, "Hat");

        let ids: Vec<&str> = view.records().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
        assert!(view.apply_removed(&ProductId::new("b")).is_none());
    }

    #[test]
    fn test_update_replaces_by_id() {
        let mut view = ready(vec![product("a", "Tee"), product("b", "Hat")]);
        assert!(view.apply_updated(product("b", "Bucket Hat")));
        assert_eq!(view.get(&ProductId::new("b")).unwrap().name, "Bucket Hat");
        assert_eq!(view.get(&ProductId::new("a")).unwrap().name, "Tee");
        assert!(!view.apply_updated(product("z", "Ghost")));
    }

    #[test]
    fn test_create_appends() {
        let mut view = ready(vec![product("a", "Tee")]);
        view.apply_created(product("b", "Hat"));
        assert_eq!(view.records().len(), 2);
        view.apply_created(product("b", "Hat v2"));
        assert_eq!(view.records().len(), 2);
    }

    #[tokio::test]
    async fn test_mount_stores_fetch_result() {
        let view = Mutex::new(ResourceView::new());
        mount(&view, || async move { Ok(vec![product("a", "Tee")]) })
            .await
            .unwrap();
        assert_eq!(view.lock().await.state(), &LoadState::Ready);
    }

    #[tokio::test]
    async fn test_sync_created_from_inserted_id() {
        let view = Mutex::new(ready(vec![]));
        sync_created(
            &view,
            WriteAck::Inserted {
                inserted_id: "new".to_string(),
            },
            |id| product(&id, "Tee"),
            || async move { Ok(vec![]) },
        )
        .await
        .unwrap();
        assert_eq!(view.lock().await.records()[0].id.as_str(), "new");
    }

    #[tokio::test]
    async fn test_sync_created_refetches_on_receipt() {
        let view = Mutex::new(ready(vec![]));
        sync_created(
            &view,
            WriteAck::Receipt(serde_json::json!({ "message": "ok" })),
            |id| product(&id, "unused"),
            || async move { Ok(vec![product("x", "From server")]) },
        )
        .await
        .unwrap();
        assert_eq!(view.lock().await.records()[0].name, "From server");
    }

    #[tokio::test]
    async fn test_sync_updated_prefers_server_record() {
        let view = Mutex::new(ready(vec![product("a", "Tee")]));
        let applied = sync_updated(
            &view,
            WriteAck::Record(product("a", "Server Tee")),
            product("a", "Submitted Tee"),
        )
        .await;
        assert_eq!(applied.name, "Server Tee");
        assert_eq!(view.lock().await.records()[0].name, "Server Tee");
    }

    #[test]
    fn test_confirmation_from_form() {
        assert_eq!(Confirmation::from_form(Some("yes")), Confirmation::Confirmed);
        assert_eq!(Confirmation::from_form(Some("no")), Confirmation::Cancelled);
        assert_eq!(Confirmation::from_form(None), Confirmation::Cancelled);
    }
}
