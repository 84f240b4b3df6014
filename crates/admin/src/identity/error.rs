//! Identity provider errors.

use thiserror::Error;

/// Errors that can occur when calling the identity provider.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// HTTP request failed.
    #[error("Identity request failed: {0}")]
    Request(String),

    /// Failed to parse response.
    #[error("Identity response error: {0}")]
    Response(String),

    /// An account with this email already exists.
    #[error("This email is already in use")]
    EmailAlreadyInUse,

    /// The provider rejected the password as too weak.
    #[error("Password should be at least 6 characters")]
    WeakPassword,

    /// Wrong email or password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The operation needs a fresh sign-in.
    #[error("This operation requires a recent sign-in")]
    RequiresRecentLogin,

    /// The account has been disabled.
    #[error("This account has been disabled")]
    UserDisabled,

    /// Rate limited by the provider.
    #[error("Too many attempts. Please try again later.")]
    TooManyAttempts,

    /// Any other provider error code.
    #[error("Identity provider error: {code}")]
    Api {
        /// Provider error code (e.g., `INVALID_EMAIL`).
        code: String,
    },

    /// A request URL could not be built.
    #[error("Invalid identity URL: {0}")]
    Url(String),
}

impl IdentityError {
    /// Map a provider error message such as `WEAK_PASSWORD : Password
    /// should be at least 6 characters` to a variant.
    #[must_use]
    pub fn from_provider_message(message: &str) -> Self {
        let code = message.split(" : ").next().unwrap_or(message).trim();
        match code {
            "EMAIL_EXISTS" => Self::EmailAlreadyInUse,
            "WEAK_PASSWORD" => Self::WeakPassword,
            "INVALID_LOGIN_CREDENTIALS" | "INVALID_PASSWORD" | "EMAIL_NOT_FOUND" => {
                Self::InvalidCredentials
            }
            "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" | "TOKEN_EXPIRED" | "INVALID_ID_TOKEN" => {
                Self::RequiresRecentLogin
            }
            "USER_DISABLED" => Self::UserDisabled,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => Self::TooManyAttempts,
            other => Self::Api {
                code: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_known_codes() {
        assert!(matches!(
            IdentityError::from_provider_message("EMAIL_EXISTS"),
            IdentityError::EmailAlreadyInUse
        ));
        assert!(matches!(
            IdentityError::from_provider_message(
                "WEAK_PASSWORD : Password should be at least 6 characters"
            ),
            IdentityError::WeakPassword
        ));
        assert!(matches!(
            IdentityError::from_provider_message("CREDENTIAL_TOO_OLD_LOGIN_AGAIN"),
            IdentityError::RequiresRecentLogin
        ));
        assert!(matches!(
            IdentityError::from_provider_message("INVALID_LOGIN_CREDENTIALS"),
            IdentityError::InvalidCredentials
        ));
    }

    #[test]
    fn test_unknown_code_is_preserved() {
        let err = IdentityError::from_provider_message("INVALID_EMAIL");
        assert_eq!(err.to_string(), "Identity provider error: INVALID_EMAIL");
    }
}
