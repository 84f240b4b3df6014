//! User-facing operation errors.

use thiserror::Error;

use crate::backend::BackendError;
use crate::identity::IdentityError;

/// Shown when an email or password change needs a fresh sign-in.
pub const UPDATE_REMEDIATION: &str =
    "Please sign out and sign back in to update your email or password.";

/// Shown when deleting one's own account needs a fresh sign-in.
pub const DELETE_REMEDIATION: &str = "Please sign out and sign back in to delete your account.";

/// Errors surfaced to the admin as notices.
///
/// The `Display` text is the exact copy shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    /// The server could not be reached.
    #[error("Could not reach server")]
    Unreachable,

    /// The server answered with something that is not the expected JSON.
    #[error("Malformed response from server")]
    MalformedResponse,

    /// Input rejected before any network call.
    #[error("{message}")]
    Validation {
        /// Form field the message belongs to.
        field: &'static str,
        /// Message shown next to the field.
        message: String,
    },

    /// The backend rejected the request; its message is passed through.
    #[error("{message}")]
    BackendDomain {
        /// Backend wording.
        message: String,
    },

    /// The identity session is too old for this operation.
    #[error("{remediation}")]
    StaleSession {
        /// What the user should do.
        remediation: &'static str,
    },

    /// The identity provider already has an account with this email.
    #[error("{message}")]
    Conflict {
        /// Conflict message.
        message: String,
    },

    /// Any other identity provider failure.
    #[error("{0}")]
    Identity(String),

    /// The role lookup failed or returned an unknown role.
    #[error("You Don't Have Access")]
    AccessDenied,

    /// The operation needs a signed-in user.
    #[error("{0}")]
    NotSignedIn(&'static str),

    /// The record is not in the current view.
    #[error("{0} not found")]
    NotFound(&'static str),
}

impl ViewError {
    /// A validation failure on `field`.
    #[must_use]
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Convert an identity error, using `remediation` for stale sessions.
    #[must_use]
    pub fn from_identity(error: IdentityError, remediation: &'static str) -> Self {
        match error {
            IdentityError::RequiresRecentLogin => Self::StaleSession { remediation },
            IdentityError::EmailAlreadyInUse => Self::Conflict {
                message: error.to_string(),
            },
            IdentityError::WeakPassword => Self::validation("password", error.to_string()),
            IdentityError::Request(_) | IdentityError::Url(_) => Self::Unreachable,
            IdentityError::Response(_) => Self::MalformedResponse,
            other => Self::Identity(other.to_string()),
        }
    }

    /// Form field this error belongs to, if any.
    #[must_use]
    pub const fn field(&self) -> Option<&'static str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<BackendError> for ViewError {
    fn from(error: BackendError) -> Self {
        match error {
            BackendError::Request(_) | BackendError::Url(_) => Self::Unreachable,
            BackendError::MalformedResponse { .. } => Self::MalformedResponse,
            BackendError::Domain { message, .. } => Self::BackendDomain { message },
        }
    }
}

impl From<IdentityError> for ViewError {
    fn from(error: IdentityError) -> Self {
        Self::from_identity(error, UPDATE_REMEDIATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_message_passes_through() {
        let err = ViewError::from(BackendError::Domain {
            status: 400,
            message: "Product name already exists".to_string(),
        });
        assert_eq!(
            err,
            ViewError::BackendDomain {
                message: "Product name already exists".to_string()
            }
        );
        assert_eq!(err.to_string(), "Product name already exists");
    }

    #[test]
    fn test_transport_and_parse_failures_are_distinct() {
        assert_eq!(
            ViewError::from(BackendError::Request("refused".to_string())),
            ViewError::Unreachable
        );
        assert_eq!(
            ViewError::from(BackendError::MalformedResponse {
                status: 200,
                detail: "expected value".to_string()
            }),
            ViewError::MalformedResponse
        );
    }

    #[test]
    fn test_stale_session_uses_operation_copy() {
        let update = ViewError::from(IdentityError::RequiresRecentLogin);
        assert_eq!(update.to_string(), UPDATE_REMEDIATION);

        let delete =
            ViewError::from_identity(IdentityError::RequiresRecentLogin, DELETE_REMEDIATION);
        assert_eq!(delete.to_string(), DELETE_REMEDIATION);
    }

    #[test]
    fn test_email_conflict() {
        let err = ViewError::from(IdentityError::EmailAlreadyInUse);
        assert!(matches!(err, ViewError::Conflict { .. }));
        assert_eq!(err.to_string(), "This email is already in use");
    }

    #[test]
    fn test_validation_field() {
        let err = ViewError::validation("email", "Please enter a valid email address.");
        assert_eq!(err.field(), Some("email"));
        assert_eq!(ViewError::AccessDenied.field(), None);
    }
}
