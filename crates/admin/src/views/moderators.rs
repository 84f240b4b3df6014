//! Moderator management operations.
//!
//! Creating a moderator provisions an identity account on an isolated
//! session, so the acting admin stays signed in. Email and password changes
//! are pushed to the identity provider only when the edited record is the
//! signed-in user's own account.

use ms_apparels_core::{
    Email, ImageData, Moderator, ModeratorDraft, ModeratorId, Password, Role,
};
use tokio::sync::Mutex;
use tracing::{instrument, warn};

use super::error::{DELETE_REMEDIATION, UPDATE_REMEDIATION, ViewError};
use super::resource::{
    Confirmation, DeleteOutcome, ResourceView, mount, sync_created, sync_updated,
};
use crate::backend::BackendClient;
use crate::identity::{AuthInstance, IdentityClient, IdentitySession};

pub const ADDED: &str = "Moderator added successfully!";
pub const UPDATED: &str = "Profile updated successfully!";
pub const DELETED: &str = "Moderator has been deleted.";
pub const RESET_SENT: &str = "Password reset email sent!";
pub const NO_RECORDS: &str = "No moderators found.";

const INVALID_EMAIL: &str = "Please enter a valid email address.";
const ADMIN_SIGNED_OUT: &str = "Admin must be signed in to add a moderator";

/// Raw add-moderator form input.
#[derive(Debug, Clone, Default)]
pub struct ModeratorForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub image: Option<ImageData>,
}

/// A validated add-moderator request.
#[derive(Debug, Clone)]
pub struct NewModerator {
    pub name: String,
    pub email: Email,
    pub password: Password,
    pub role: Role,
    pub image: Option<ImageData>,
}

impl ModeratorForm {
    /// Validate every field, collecting all failures.
    ///
    /// # Errors
    ///
    /// Returns one [`ViewError::Validation`] per failing field.
    pub fn validate(&self) -> Result<NewModerator, Vec<ViewError>> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push(ViewError::validation("name", "Name is required"));
        }

        let email = Email::parse(self.email.trim())
            .map_err(|_| errors.push(ViewError::validation("email", INVALID_EMAIL)))
            .ok();
        let password = Password::parse(&self.password)
            .map_err(|e| errors.push(ViewError::validation("password", e.to_string())))
            .ok();

        match (email, password) {
            (Some(email), Some(password)) if errors.is_empty() => Ok(NewModerator {
                name: name.to_owned(),
                email,
                password,
                role: self.role,
                image: self.image.clone(),
            }),
            _ => Err(errors),
        }
    }
}

/// Raw edit form input. Blank fields keep the current value.
#[derive(Debug, Clone, Default)]
pub struct ModeratorEdit {
    pub name: String,
    pub email: String,
    /// New password; blank leaves it unchanged.
    pub password: String,
    pub role: Role,
    /// Newly uploaded image, if any.
    pub image: Option<ImageData>,
}

impl ModeratorEdit {
    /// Prefill from an existing record.
    #[must_use]
    pub fn from_moderator(moderator: &Moderator) -> Self {
        Self {
            name: moderator.display_name.clone(),
            email: moderator.email.clone(),
            password: String::new(),
            role: moderator.role,
            image: None,
        }
    }

    /// Merge with the current record.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a changed email that is not valid or a
    /// new password that fails the policy.
    fn merge(&self, prior: &Moderator) -> Result<(Moderator, Option<Password>), ViewError> {
        let name = non_blank(&self.name).unwrap_or(&prior.display_name).to_owned();

        let email = match non_blank(&self.email) {
            Some(email) if email != prior.email => Email::parse(email)
                .map_err(|_| ViewError::validation("email", INVALID_EMAIL))?
                .into_inner(),
            _ => prior.email.clone(),
        };

        let password = if self.password.is_empty() {
            None
        } else {
            Some(
                Password::parse(&self.password)
                    .map_err(|e| ViewError::validation("password", e.to_string()))?,
            )
        };

        let merged = Moderator {
            display_name: name,
            email,
            role: self.role,
            image: self
                .image
                .as_ref()
                .map(|i| i.as_str().to_owned())
                .or_else(|| prior.image.clone()),
            ..prior.clone()
        };
        Ok((merged, password))
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Fetch all moderators into the view.
///
/// # Errors
///
/// Returns the fetch error.
pub async fn load(
    backend: &BackendClient,
    view: &Mutex<ResourceView<Moderator>>,
) -> Result<(), ViewError> {
    mount(view, || async move { backend.list_moderators().await.map_err(ViewError::from) }).await
}

/// Create the identity account and the backend record for a new moderator.
///
/// If the backend rejects the record, the identity account created for it
/// is deleted again.
///
/// # Errors
///
/// Returns [`ViewError::NotSignedIn`] when no admin is signed in, identity
/// errors such as [`ViewError::Conflict`], or the backend's rejection.
#[instrument(
    skip(backend, identity, auth, view, new),
    fields(email = %new.email, role = %new.role)
)]
pub async fn create(
    backend: &BackendClient,
    identity: &IdentityClient,
    auth: &AuthInstance,
    view: &Mutex<ResourceView<Moderator>>,
    new: NewModerator,
) -> Result<(), ViewError> {
    if auth.current_session().is_none() {
        return Err(ViewError::NotSignedIn(ADMIN_SIGNED_OUT));
    }

    let account = identity
        .create_account(new.email.as_str(), &new.password)
        .await?;
    let account = match identity.update_display_name(&account, &new.name).await {
        Ok(updated) => updated,
        Err(e) => {
            rollback_account(identity, &account).await;
            return Err(e.into());
        }
    };

    let draft = ModeratorDraft {
        uid: account.uid.clone(),
        display_name: new.name,
        email: if account.email.is_empty() {
            new.email.into_inner()
        } else {
            account.email.clone()
        },
        role: new.role,
        image: new.image.map(ImageData::into_inner),
    };

    let ack = match backend.create_moderator(&draft).await {
        Ok(ack) => ack,
        Err(e) => {
            rollback_account(identity, &account).await;
            return Err(e.into());
        }
    };

    sync_created(
        view,
        ack,
        |id| Moderator {
            id: ModeratorId::new(id),
            uid: draft.uid,
            display_name: draft.display_name,
            email: draft.email,
            role: draft.role,
            image: draft.image,
            created_at: None,
        },
        || async move { backend.list_moderators().await.map_err(ViewError::from) },
    )
    .await
}

async fn rollback_account(identity: &IdentityClient, account: &IdentitySession) {
    if let Err(e) = identity.delete_account(account).await {
        warn!(uid = %account.uid, error = %e, "Failed to remove orphaned identity account");
    }
}

/// Update a moderator record, then the identity account if it is the
/// signed-in user's own.
///
/// The backend acknowledgment is applied to the view before the identity
/// calls, so an identity failure leaves the saved record visible.
///
/// # Errors
///
/// Returns validation errors, [`ViewError::NotFound`], the backend's
/// rejection, or [`ViewError::StaleSession`] when the identity provider
/// needs a fresh sign-in.
#[instrument(skip(backend, identity, auth, view, edit), fields(id = %id))]
pub async fn update(
    backend: &BackendClient,
    identity: &IdentityClient,
    auth: &AuthInstance,
    view: &Mutex<ResourceView<Moderator>>,
    id: &ModeratorId,
    edit: &ModeratorEdit,
) -> Result<Moderator, ViewError> {
    let prior = view
        .lock()
        .await
        .get(id)
        .cloned()
        .ok_or(ViewError::NotFound("Moderator"))?;
    let (merged, new_password) = edit.merge(&prior)?;

    let ack = backend.update_moderator(id, &merged.to_draft()).await?;
    let updated = sync_updated(view, ack, merged).await;

    if let Some(session) = auth.current_session().filter(|s| s.uid == prior.uid) {
        update_own_account(identity, auth, session, &prior, &updated, new_password.as_ref())
            .await?;
    }

    Ok(updated)
}

async fn update_own_account(
    identity: &IdentityClient,
    auth: &AuthInstance,
    session: IdentitySession,
    prior: &Moderator,
    updated: &Moderator,
    new_password: Option<&Password>,
) -> Result<(), ViewError> {
    let stale = |e| ViewError::from_identity(e, UPDATE_REMEDIATION);

    let mut session = identity
        .update_display_name(&session, &updated.display_name)
        .await
        .map_err(stale)?;
    auth.publish(Some(session.clone()));

    if updated.email != prior.email {
        session = identity
            .update_account_email(&session, &updated.email)
            .await
            .map_err(stale)?;
        auth.publish(Some(session.clone()));
    }

    if let Some(password) = new_password {
        session = identity
            .update_account_password(&session, password)
            .await
            .map_err(stale)?;
        auth.publish(Some(session));
    }

    Ok(())
}

/// Delete a moderator after confirmation.
///
/// Deleting one's own record deletes the identity account first and signs
/// the browser out.
///
/// # Errors
///
/// Returns [`ViewError::NotFound`], [`ViewError::StaleSession`] for a stale
/// own-account deletion, or the backend's rejection. Local state is only
/// changed after the backend acknowledged the delete.
#[instrument(skip(backend, identity, auth, view), fields(id = %id))]
pub async fn delete(
    backend: &BackendClient,
    identity: &IdentityClient,
    auth: &AuthInstance,
    view: &Mutex<ResourceView<Moderator>>,
    id: &ModeratorId,
    confirmation: Confirmation,
) -> Result<DeleteOutcome, ViewError> {
    if confirmation == Confirmation::Cancelled {
        return Ok(DeleteOutcome::Cancelled);
    }

    let target = view
        .lock()
        .await
        .get(id)
        .cloned()
        .ok_or(ViewError::NotFound("Moderator"))?;

    if let Some(session) = auth.current_session().filter(|s| s.uid == target.uid) {
        identity
            .delete_account(&session)
            .await
            .map_err(|e| ViewError::from_identity(e, DELETE_REMEDIATION))?;
        auth.sign_out();
    }

    backend.delete_moderator(id).await?;
    view.lock().await.apply_removed(id);
    Ok(DeleteOutcome::Deleted)
}

/// Send a password-reset email to a moderator.
///
/// # Errors
///
/// Returns the identity provider's rejection.
#[instrument(skip(identity))]
pub async fn send_password_reset(identity: &IdentityClient, email: &str) -> Result<(), ViewError> {
    identity
        .send_password_reset(email)
        .await
        .map_err(ViewError::from)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ms_apparels_core::Uid;

    use super::*;

    fn moderator() -> Moderator {
        Moderator {
            id: ModeratorId::new("m1"),
            uid: Uid::new("u1"),
            display_name: "Maria".to_string(),
            email: "maria@example.com".to_string(),
            role: Role::Moderator,
            image: Some("data:image/png;base64,AQID".to_string()),
            created_at: None,
        }
    }

    fn form(password: &str) -> ModeratorForm {
        ModeratorForm {
            name: "Maria".to_string(),
            email: "maria@example.com".to_string(),
            password: password.to_string(),
            role: Role::Moderator,
            image: None,
        }
    }

    #[test]
    fn test_validate_accepts_valid_form() {
        let new = form("Secret1!").validate().unwrap();
        assert_eq!(new.email.as_str(), "maria@example.com");
    }

    #[test]
    fn test_validate_reports_complexity_message() {
        let errors = form("password").validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "Password must contain at least one uppercase letter, one lowercase letter, one number, and one special character."
        );
    }

    #[test]
    fn test_validate_collects_every_failing_field() {
        let mut bad = form("abc");
        bad.email = "not-an-email".to_string();
        let errors = bad.validate().unwrap_err();
        let fields: Vec<_> = errors.iter().filter_map(ViewError::field).collect();
        assert_eq!(fields, ["email", "password"]);
        assert_eq!(errors[0].to_string(), INVALID_EMAIL);
        assert_eq!(
            errors[1].to_string(),
            "Password must be at least 6 characters long."
        );
    }

    #[test]
    fn test_merge_keeps_blank_fields() {
        let edit = ModeratorEdit {
            name: "  ".to_string(),
            email: String::new(),
            password: String::new(),
            role: Role::Admin,
            image: None,
        };
        let (merged, password) = edit.merge(&moderator()).unwrap();
        assert_eq!(merged.display_name, "Maria");
        assert_eq!(merged.email, "maria@example.com");
        assert_eq!(merged.role, Role::Admin);
        assert_eq!(merged.image, moderator().image);
        assert!(password.is_none());
    }

    #[test]
    fn test_merge_replaces_included_fields() {
        let edit = ModeratorEdit {
            name: "Maria Lopez".to_string(),
            email: "lopez@example.com".to_string(),
            password: "Newpass1!".to_string(),
            role: Role::Moderator,
            image: Some(ImageData::from_bytes("image/jpeg", &[9]).unwrap()),
        };
        let (merged, password) = edit.merge(&moderator()).unwrap();
        assert_eq!(merged.display_name, "Maria Lopez");
        assert_eq!(merged.email, "lopez@example.com");
        assert_eq!(merged.image.as_deref(), Some("data:image/jpeg;base64,CQ=="));
        assert!(password.is_some());
        assert_eq!(merged.id, moderator().id);
        assert_eq!(merged.uid, moderator().uid);
    }

    #[test]
    fn test_merge_rejects_invalid_new_email() {
        let edit = ModeratorEdit {
            email: "broken@".to_string(),
            ..ModeratorEdit::from_moderator(&moderator())
        };
        assert_eq!(
            edit.merge(&moderator()).unwrap_err().to_string(),
            INVALID_EMAIL
        );
    }

    #[tokio::test]
    async fn test_create_requires_signed_in_admin() {
        let backend = BackendClient::new("http://127.0.0.1:9");
        let identity = IdentityClient::new(&crate::config::IdentityConfig {
            api_key: secrecy::SecretString::from("test-key"),
            base_url: "http://127.0.0.1:9".to_string(),
        });
        let auth = AuthInstance::new();
        let view = Mutex::new(ResourceView::new());

        let err = create(&backend, &identity, &auth, &view, form("Secret1!").validate().unwrap())
            .await
            .unwrap_err();
        assert_eq!(err, ViewError::NotSignedIn(ADMIN_SIGNED_OUT));
    }
}
