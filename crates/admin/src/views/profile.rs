//! The signed-in moderator's own profile.

use ms_apparels_core::{Moderator, Uid};
use tokio::sync::Mutex;

use super::error::ViewError;
use super::moderators::{self, ModeratorEdit};
use super::resource::{ResourceView, mount};
use crate::backend::BackendClient;
use crate::identity::{AuthInstance, IdentityClient};

pub const MISSING: &str = "Moderator profile not found in the database.";

const SIGNED_OUT: &str = "Sign in to view your profile";

/// Fetch the moderator records for the signed-in uid.
///
/// The first record is the profile; an empty result is shown as [`MISSING`].
///
/// # Errors
///
/// Returns [`ViewError::NotSignedIn`] without a session, or the fetch error.
pub async fn load(
    backend: &BackendClient,
    auth: &AuthInstance,
    view: &Mutex<ResourceView<Moderator>>,
) -> Result<(), ViewError> {
    let session = auth
        .current_session()
        .ok_or(ViewError::NotSignedIn(SIGNED_OUT))?;
    mount(view, || async move {
        let mut found = backend
            .find_moderators_by_uid(&session.uid)
            .await
            .map_err(ViewError::from)?;
        found.truncate(1);
        Ok::<_, ViewError>(found)
    })
    .await
}

/// The loaded profile of `uid`, if any.
///
/// A record loaded for any other uid is ignored.
#[must_use]
pub fn current<'a>(view: &'a ResourceView<Moderator>, uid: &Uid) -> Option<&'a Moderator> {
    view.records().first().filter(|m| &m.uid == uid)
}

/// The profile of the signed-in user, fetched unless already loaded for them.
///
/// # Errors
///
/// Returns [`ViewError::NotSignedIn`] without a session, or the fetch error.
pub async fn ensure_loaded(
    backend: &BackendClient,
    auth: &AuthInstance,
    view: &Mutex<ResourceView<Moderator>>,
) -> Result<Option<Moderator>, ViewError> {
    let session = auth
        .current_session()
        .ok_or(ViewError::NotSignedIn(SIGNED_OUT))?;
    if let Some(found) = current(&*view.lock().await, &session.uid) {
        return Ok(Some(found.clone()));
    }
    load(backend, auth, view).await?;
    Ok(current(&*view.lock().await, &session.uid).cloned())
}

/// Update the own profile. The stored role is kept whatever the form says.
///
/// # Errors
///
/// Returns [`ViewError::NotFound`] when the signed-in user has no profile,
/// or any error of [`moderators::update`].
pub async fn update(
    backend: &BackendClient,
    identity: &IdentityClient,
    auth: &AuthInstance,
    view: &Mutex<ResourceView<Moderator>>,
    edit: ModeratorEdit,
) -> Result<Moderator, ViewError> {
    let profile = ensure_loaded(backend, auth, view)
        .await?
        .ok_or(ViewError::NotFound("Profile"))?;
    let (id, role) = (profile.id, profile.role);
    let edit = ModeratorEdit { role, ..edit };
    moderators::update(backend, identity, auth, view, &id, &edit).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_requires_session() {
        let backend = BackendClient::new("http://127.0.0.1:9");
        let view = Mutex::new(ResourceView::new());
        let err = load(&backend, &AuthInstance::new(), &view).await.unwrap_err();
        assert!(matches!(err, ViewError::NotSignedIn(_)));
    }

    fn moderator(uid: &str) -> Moderator {
        serde_json::from_value(serde_json::json!({
            "_id": format!("m-{uid}"),
            "uid": uid,
            "displayName": "Ann",
            "email": "ann@example.com",
            "role": "moderator",
        }))
        .unwrap()
    }

    #[test]
    fn test_current_is_first_record() {
        let mut view = ResourceView::new();
        view.finish_loading(Ok(vec![])).unwrap();
        assert!(current(&view, &Uid::new("u1")).is_none());

        view.finish_loading(Ok(vec![moderator("u1")])).unwrap();
        assert_eq!(current(&view, &Uid::new("u1")).unwrap().uid.as_str(), "u1");
    }

    #[test]
    fn test_current_ignores_record_of_other_user() {
        let mut view = ResourceView::new();
        view.finish_loading(Ok(vec![moderator("ann")])).unwrap();
        assert!(current(&view, &Uid::new("bob")).is_none());
    }
}
