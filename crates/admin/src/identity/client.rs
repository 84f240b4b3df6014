//! Identity Toolkit REST client.

use ms_apparels_core::{Password, Uid};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use super::error::IdentityError;
use super::types::{
    AccountResponse, DeleteRequest, ErrorEnvelope, IdentitySession, OobRequest, PasswordRequest,
    UpdateRequest,
};
use crate::config::IdentityConfig;

/// Identity provider client.
///
/// Stateless: every call takes the session it acts on, and none of them
/// publish to an [`super::AuthInstance`]. Callers decide which browser's
/// auth state (if any) a result belongs to.
#[derive(Clone)]
pub struct IdentityClient {
    /// HTTP client.
    client: Client,
    /// Web API key.
    api_key: SecretString,
    /// Identity Toolkit base URL.
    base_url: String,
}

impl std::fmt::Debug for IdentityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityClient")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl IdentityClient {
    /// Create a new identity client.
    #[must_use]
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
        }
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidCredentials`] for a wrong email or
    /// password, or a transport error.
    #[instrument(skip(self, password))]
    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<IdentitySession, IdentityError> {
        let response: AccountResponse = self
            .call(
                "signInWithPassword",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;
        session_from(response, None)
    }

    /// Create an account on an isolated session.
    ///
    /// The returned session belongs to the new account; the caller's own
    /// sign-in state is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::EmailAlreadyInUse`] or
    /// [`IdentityError::WeakPassword`] when the provider rejects the account.
    #[instrument(skip(self, password))]
    pub async fn create_account(
        &self,
        email: &str,
        password: &Password,
    ) -> Result<IdentitySession, IdentityError> {
        let response: AccountResponse = self
            .call(
                "signUp",
                &PasswordRequest {
                    email,
                    password: password.expose(),
                    return_secure_token: true,
                },
            )
            .await?;
        session_from(response, None)
    }

    /// Set the display name of the session's account.
    ///
    /// # Errors
    ///
    /// Returns error if the provider rejects the update.
    #[instrument(skip(self, session), fields(uid = %session.uid))]
    pub async fn update_display_name(
        &self,
        session: &IdentitySession,
        display_name: &str,
    ) -> Result<IdentitySession, IdentityError> {
        self.update(
            session,
            UpdateRequest {
                display_name: Some(display_name),
                ..UpdateRequest::default()
            },
        )
        .await
    }

    /// Change the sign-in email of the session's account.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::RequiresRecentLogin`] when the session is too
    /// old, or [`IdentityError::EmailAlreadyInUse`].
    #[instrument(skip(self, session), fields(uid = %session.uid))]
    pub async fn update_account_email(
        &self,
        session: &IdentitySession,
        email: &str,
    ) -> Result<IdentitySession, IdentityError> {
        self.update(
            session,
            UpdateRequest {
                email: Some(email),
                ..UpdateRequest::default()
            },
        )
        .await
    }

    /// Change the password of the session's account.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::RequiresRecentLogin`] when the session is too
    /// old, or [`IdentityError::WeakPassword`].
    #[instrument(skip(self, session, password), fields(uid = %session.uid))]
    pub async fn update_account_password(
        &self,
        session: &IdentitySession,
        password: &Password,
    ) -> Result<IdentitySession, IdentityError> {
        self.update(
            session,
            UpdateRequest {
                password: Some(password.expose()),
                ..UpdateRequest::default()
            },
        )
        .await
    }

    /// Delete the session's account.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::RequiresRecentLogin`] when the session is too
    /// old.
    #[instrument(skip(self, session), fields(uid = %session.uid))]
    pub async fn delete_account(&self, session: &IdentitySession) -> Result<(), IdentityError> {
        let _: serde_json::Value = self
            .call(
                "delete",
                &DeleteRequest {
                    id_token: session.id_token.expose_secret(),
                },
            )
            .await?;
        debug!("Identity account deleted");
        Ok(())
    }

    /// Send a password-reset email.
    ///
    /// # Errors
    ///
    /// Returns error if the provider rejects the request.
    #[instrument(skip(self))]
    pub async fn send_password_reset(&self, email: &str) -> Result<(), IdentityError> {
        let _: serde_json::Value = self
            .call(
                "sendOobCode",
                &OobRequest {
                    request_type: "PASSWORD_RESET",
                    email,
                },
            )
            .await?;
        Ok(())
    }

    async fn update<'a>(
        &self,
        session: &'a IdentitySession,
        mut request: UpdateRequest<'a>,
    ) -> Result<IdentitySession, IdentityError> {
        request.id_token = session.id_token.expose_secret();
        request.return_secure_token = true;
        let response: AccountResponse = self.call("update", &request).await?;
        session_from(response, Some(session))
    }

    /// POST `{base}/accounts:{operation}?key=...`.
    async fn call<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        operation: &str,
        body: &B,
    ) -> Result<T, IdentityError> {
        let mut url = Url::parse(&format!("{}/accounts:{operation}", self.base_url))
            .map_err(|e| IdentityError::Url(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("key", self.api_key.expose_secret());

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| IdentityError::Request(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| IdentityError::Request(e.to_string()))?;

        if !status.is_success() {
            let envelope: ErrorEnvelope = serde_json::from_str(&text)
                .map_err(|e| IdentityError::Response(format!("HTTP {status}: {e}")))?;
            warn!(
                operation,
                status = status.as_u16(),
                code = %envelope.error.message,
                "Identity provider rejected request"
            );
            return Err(IdentityError::from_provider_message(&envelope.error.message));
        }

        serde_json::from_str(&text).map_err(|e| IdentityError::Response(e.to_string()))
    }
}

/// Build a session from an account response, keeping fields the response
/// leaves out from `previous`.
fn session_from(
    response: AccountResponse,
    previous: Option<&IdentitySession>,
) -> Result<IdentitySession, IdentityError> {
    let id_token = response
        .id_token
        .map(SecretString::from)
        .or_else(|| previous.map(|p| p.id_token.clone()))
        .ok_or_else(|| IdentityError::Response("missing idToken".to_string()))?;
    let refresh_token = response
        .refresh_token
        .map(SecretString::from)
        .or_else(|| previous.map(|p| p.refresh_token.clone()))
        .ok_or_else(|| IdentityError::Response("missing refreshToken".to_string()))?;

    Ok(IdentitySession {
        uid: Uid::new(response.local_id),
        email: response
            .email
            .or_else(|| previous.map(|p| p.email.clone()))
            .unwrap_or_default(),
        display_name: response
            .display_name
            .or_else(|| previous.map(|p| p.display_name.clone()))
            .unwrap_or_default(),
        id_token,
        refresh_token,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn previous() -> IdentitySession {
        IdentitySession {
            uid: Uid::new("u1"),
            email: "old@example.com".to_string(),
            display_name: "Old Name".to_string(),
            id_token: SecretString::from("old-token"),
            refresh_token: SecretString::from("old-refresh"),
        }
    }

    #[test]
    fn test_session_from_sign_in_response() {
        let response: AccountResponse = serde_json::from_str(
            r#"{"localId": "u1", "email": "a@b.co", "idToken": "t", "refreshToken": "r"}"#,
        )
        .unwrap();
        let session = session_from(response, None).unwrap();
        assert_eq!(session.uid.as_str(), "u1");
        assert_eq!(session.id_token.expose_secret(), "t");
        assert!(session.display_name.is_empty());
    }

    #[test]
    fn test_session_from_update_keeps_previous_tokens() {
        let response: AccountResponse =
            serde_json::from_str(r#"{"localId": "u1", "displayName": "New Name"}"#).unwrap();
        let session = session_from(response, Some(&previous())).unwrap();
        assert_eq!(session.display_name, "New Name");
        assert_eq!(session.email, "old@example.com");
        assert_eq!(session.id_token.expose_secret(), "old-token");
    }

    #[test]
    fn test_session_from_requires_token_without_previous() {
        let response: AccountResponse = serde_json::from_str(r#"{"localId": "u1"}"#).unwrap();
        assert!(matches!(
            session_from(response, None),
            Err(IdentityError::Response(_))
        ));
    }

    #[test]
    fn test_debug_redacts_key() {
        let client = IdentityClient::new(&IdentityConfig {
            api_key: SecretString::from("AIzaSyD-secret"),
            base_url: "http://127.0.0.1:9099".to_string(),
        });
        assert!(!format!("{client:?}").contains("AIzaSyD"));
    }
}
