//! Sign-in and sign-out flows.
//!
//! These are the only writers of the role store.

use ms_apparels_core::Role;
use tracing::{info, instrument, warn};

use super::error::ViewError;
use crate::backend::BackendClient;
use crate::identity::{IdentityClient, IdentityError};
use crate::models::{RoleMirror, RoleStore, Workspace};

pub const SIGN_IN_FAILED: &str = "Failed to sign in. Please check your credentials.";

/// Sign in, publish the session, and record the role from the backend.
///
/// The workspace's views are reset before the new session is published. A
/// failed role lookup or an unrecognized role signs the identity session
/// back out.
///
/// # Errors
///
/// Returns [`ViewError::AccessDenied`] when no usable role is found, or the
/// sign-in failure.
#[instrument(skip(backend, identity, workspace, roles, password))]
pub async fn sign_in<M: RoleMirror>(
    backend: &BackendClient,
    identity: &IdentityClient,
    workspace: &Workspace,
    roles: &mut RoleStore<M>,
    email: &str,
    password: &str,
) -> Result<Role, ViewError> {
    let session = identity
        .sign_in(email.trim(), password)
        .await
        .map_err(sign_in_error)?;
    let auth = &workspace.auth;
    workspace.reset_views().await;
    auth.publish(Some(session.clone()));

    let role = match backend.fetch_role(&session.uid, &session.id_token).await {
        Ok(Some(raw)) => raw.parse::<Role>().map_err(|e| {
            warn!(uid = %session.uid, error = %e, "Unrecognized role");
        }),
        Ok(None) => {
            warn!(uid = %session.uid, "No role assigned");
            Err(())
        }
        Err(e) => {
            warn!(uid = %session.uid, error = %e, "Role lookup failed");
            Err(())
        }
    };

    let Ok(role) = role else {
        auth.sign_out();
        roles.set_role(None).await;
        return Err(ViewError::AccessDenied);
    };

    roles.set_role(Some(role)).await;
    info!(uid = %session.uid, role = %role, "Signed in");
    Ok(role)
}

/// Sign out, erase the stored role and drop the fetched views.
pub async fn sign_out<M: RoleMirror>(workspace: &Workspace, roles: &mut RoleStore<M>) {
    workspace.auth.sign_out();
    workspace.reset_views().await;
    roles.set_role(None).await;
}

fn sign_in_error(error: IdentityError) -> ViewError {
    match error {
        IdentityError::InvalidCredentials | IdentityError::Api { .. } => {
            ViewError::Identity(SIGN_IN_FAILED.to_string())
        }
        other => ViewError::from(other),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ms_apparels_core::Uid;
    use secrecy::SecretString;

    use super::*;
    use crate::identity::IdentitySession;
    use crate::models::MemoryMirror;
    use crate::views::LoadState;

    #[test]
    fn test_wrong_credentials_message() {
        assert_eq!(
            sign_in_error(IdentityError::InvalidCredentials).to_string(),
            SIGN_IN_FAILED
        );
    }

    #[test]
    fn test_provider_message_passes_through() {
        assert_eq!(
            sign_in_error(IdentityError::TooManyAttempts).to_string(),
            "Too many attempts. Please try again later."
        );
        assert_eq!(
            sign_in_error(IdentityError::Request("refused".to_string())),
            ViewError::Unreachable
        );
    }

    #[tokio::test]
    async fn test_sign_out_clears_session_role_and_views() {
        let workspace = Workspace::new();
        workspace
            .profile
            .lock()
            .await
            .finish_loading(Ok(vec![]))
            .unwrap();
        workspace.auth.publish(Some(IdentitySession {
            uid: Uid::new("u1"),
            email: "a@example.com".to_string(),
            display_name: String::new(),
            id_token: SecretString::from("token"),
            refresh_token: SecretString::from("refresh"),
        }));
        let mirror = MemoryMirror::with_raw("admin");
        let mut roles = RoleStore::rehydrate(mirror.clone()).await;
        assert_eq!(roles.get_role(), Some(Role::Admin));

        sign_out(&workspace, &mut roles).await;
        assert!(workspace.auth.current_session().is_none());
        assert_eq!(*workspace.profile.lock().await.state(), LoadState::Loading);
        assert_eq!(roles.get_role(), None);
        assert_eq!(mirror.raw().await, None);
    }
}
