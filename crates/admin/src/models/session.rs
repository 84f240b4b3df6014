//! Session-stored client state.
//!
//! The signed-in role is derived once at login and mirrored into durable
//! storage so a reload can rehydrate it without another backend lookup.

use std::future::Future;
use std::sync::Arc;

use ms_apparels_core::Role;
use tokio::sync::Mutex;
use tower_sessions::Session;

/// Session keys for admin client state.
pub mod keys {
    /// Durable mirror of the signed-in role.
    pub const USER_ROLE: &str = "userRole";

    /// Id of the browser's workspace in the registry.
    pub const WORKSPACE_ID: &str = "workspace_id";

    /// Pending flash notices.
    pub const NOTICES: &str = "notices";
}

/// Error reading or writing the durable role mirror.
#[derive(Debug, thiserror::Error)]
#[error("role mirror unavailable: {0}")]
pub struct MirrorError(pub String);

/// Durable storage for the role string.
pub trait RoleMirror: Send + Sync {
    /// Read the stored role string, if any.
    fn load(&self) -> impl Future<Output = Result<Option<String>, MirrorError>> + Send;

    /// Store a role string, or erase it with `None`.
    fn store(&self, value: Option<&str>) -> impl Future<Output = Result<(), MirrorError>> + Send;
}

impl RoleMirror for Session {
    async fn load(&self) -> Result<Option<String>, MirrorError> {
        self.get::<String>(keys::USER_ROLE)
            .await
            .map_err(|e| MirrorError(e.to_string()))
    }

    async fn store(&self, value: Option<&str>) -> Result<(), MirrorError> {
        match value {
            Some(role) => self
                .insert(keys::USER_ROLE, role)
                .await
                .map_err(|e| MirrorError(e.to_string())),
            None => self
                .remove_value(keys::USER_ROLE)
                .await
                .map(|_| ())
                .map_err(|e| MirrorError(e.to_string())),
        }
    }
}

/// In-process mirror; clones share storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryMirror {
    value: Arc<Mutex<Option<String>>>,
}

impl MemoryMirror {
    /// A mirror pre-seeded with a raw value.
    #[must_use]
    pub fn with_raw(value: &str) -> Self {
        Self {
            value: Arc::new(Mutex::new(Some(value.to_owned()))),
        }
    }

    /// The raw stored value.
    pub async fn raw(&self) -> Option<String> {
        self.value.lock().await.clone()
    }
}

impl RoleMirror for MemoryMirror {
    async fn load(&self) -> Result<Option<String>, MirrorError> {
        Ok(self.value.lock().await.clone())
    }

    async fn store(&self, value: Option<&str>) -> Result<(), MirrorError> {
        *self.value.lock().await = value.map(str::to_owned);
        Ok(())
    }
}

/// The signed-in role with its durable mirror.
///
/// `set_role` is only called by the login and logout flows; everything
/// else reads.
#[derive(Debug)]
pub struct RoleStore<M> {
    mirror: M,
    role: Option<Role>,
}

impl<M: RoleMirror> RoleStore<M> {
    /// Load the role from the mirror.
    ///
    /// A missing, unreadable or unrecognized value yields no role.
    pub async fn rehydrate(mirror: M) -> Self {
        let role = match mirror.load().await {
            Ok(Some(raw)) => match raw.parse::<Role>() {
                Ok(role) => Some(role),
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring stored role");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read stored role");
                None
            }
        };

        Self { mirror, role }
    }

    /// The current role.
    #[must_use]
    pub const fn get_role(&self) -> Option<Role> {
        self.role
    }

    /// Replace the role; `None` erases the durable copy.
    pub async fn set_role(&mut self, role: Option<Role>) {
        self.role = role;
        if let Err(e) = self.mirror.store(role.map(Role::as_str)).await {
            tracing::warn!(error = %e, "Could not persist role");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_starts_empty() {
        let store = RoleStore::rehydrate(MemoryMirror::default()).await;
        assert_eq!(store.get_role(), None);
    }

    #[tokio::test]
    async fn test_role_survives_reload() {
        let mirror = MemoryMirror::default();
        let mut store = RoleStore::rehydrate(mirror.clone()).await;
        store.set_role(Some(Role::Admin)).await;
        assert_eq!(mirror.raw().await.as_deref(), Some("admin"));

        let reloaded = RoleStore::rehydrate(mirror).await;
        assert_eq!(reloaded.get_role(), Some(Role::Admin));
    }

    #[tokio::test]
    async fn test_clearing_erases_durable_copy() {
        let mirror = MemoryMirror::default();
        let mut store = RoleStore::rehydrate(mirror.clone()).await;
        store.set_role(Some(Role::Moderator)).await;
        store.set_role(None).await;

        assert_eq!(store.get_role(), None);
        assert_eq!(mirror.raw().await, None);
        assert_eq!(RoleStore::rehydrate(mirror).await.get_role(), None);
    }

    #[tokio::test]
    async fn test_corrupt_value_rehydrates_as_none() {
        let store = RoleStore::rehydrate(MemoryMirror::with_raw("root")).await;
        assert_eq!(store.get_role(), None);
    }
}
