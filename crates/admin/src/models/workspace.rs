//! Per-browser workspaces.
//!
//! A workspace is what a single-page client would keep in memory between
//! navigations: the identity auth instance and the last fetched collection
//! of each resource view. Workspaces live in an in-process registry keyed by
//! an id stored in the browser's cookie session and expire after a day of
//! inactivity.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use ms_apparels_core::{Moderator, Product};
use tokio::sync::Mutex;
use tower_sessions::Session;
use tracing::debug;

use super::session::keys;
use crate::identity::AuthInstance;
use crate::views::ResourceView;

const IDLE_EXPIRY: Duration = Duration::from_secs(24 * 60 * 60);
const MAX_WORKSPACES: u64 = 10_000;

/// Client state of one browser.
#[derive(Debug, Default)]
pub struct Workspace {
    pub auth: AuthInstance,
    pub moderators: Mutex<ResourceView<Moderator>>,
    pub products: Mutex<ResourceView<Product>>,
    pub profile: Mutex<ResourceView<Moderator>>,
}

impl Workspace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every fetched collection.
    ///
    /// Called whenever the signed-in user changes, so nothing fetched for
    /// one user is shown to or acted on for the next.
    pub async fn reset_views(&self) {
        *self.moderators.lock().await = ResourceView::new();
        *self.products.lock().await = ResourceView::new();
        *self.profile.lock().await = ResourceView::new();
        debug!("Workspace views reset");
    }
}

/// Registry of live workspaces.
#[derive(Clone)]
pub struct Workspaces {
    cache: Cache<String, Arc<Workspace>>,
}

impl std::fmt::Debug for Workspaces {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspaces")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

impl Default for Workspaces {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspaces {
    #[must_use]
    pub fn new() -> Self {
        let cache = Cache::builder()
            .max_capacity(MAX_WORKSPACES)
            .time_to_idle(IDLE_EXPIRY)
            .build();
        Self { cache }
    }

    /// The workspace for this browser, created on first use.
    ///
    /// # Errors
    ///
    /// Returns error if the session store fails.
    pub async fn for_session(
        &self,
        session: &Session,
    ) -> Result<Arc<Workspace>, tower_sessions::session::Error> {
        let id = match session.get::<String>(keys::WORKSPACE_ID).await? {
            Some(id) => id,
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                session.insert(keys::WORKSPACE_ID, &id).await?;
                debug!(workspace = %id, "Workspace created");
                id
            }
        };
        Ok(self.by_id(id).await)
    }

    /// The workspace with `id`, created if absent or expired.
    pub async fn by_id(&self, id: String) -> Arc<Workspace> {
        self.cache
            .get_with(id, async { Arc::new(Workspace::new()) })
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::views::LoadState;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_same_session_gets_same_workspace() {
        let workspaces = Workspaces::new();
        let session = session();
        let first = workspaces.for_session(&session).await.unwrap();
        let second = workspaces.for_session(&session).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_reset_views_returns_to_loading() {
        let workspace = Workspace::new();
        workspace
            .products
            .lock()
            .await
            .finish_loading(Ok(vec![]))
            .unwrap();
        workspace
            .profile
            .lock()
            .await
            .finish_loading(Ok(vec![]))
            .unwrap();

        workspace.reset_views().await;

        assert_eq!(*workspace.products.lock().await.state(), LoadState::Loading);
        assert_eq!(*workspace.profile.lock().await.state(), LoadState::Loading);
        assert_eq!(*workspace.moderators.lock().await.state(), LoadState::Loading);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let workspaces = Workspaces::new();
        let a = workspaces.for_session(&session()).await.unwrap();
        let b = workspaces.for_session(&session()).await.unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }
}
