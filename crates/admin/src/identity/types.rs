//! Identity provider wire types.

use ms_apparels_core::Uid;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// A signed-in identity account.
///
/// Implements `Debug` manually to redact the tokens.
#[derive(Clone)]
pub struct IdentitySession {
    /// Provider account id.
    pub uid: Uid,
    /// Account email.
    pub email: String,
    /// Profile display name (may be empty).
    pub display_name: String,
    /// Short-lived token sent as the backend bearer credential.
    pub id_token: SecretString,
    /// Long-lived refresh token.
    pub refresh_token: SecretString,
}

impl std::fmt::Debug for IdentitySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentitySession")
            .field("uid", &self.uid)
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("id_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

/// Body for `accounts:signInWithPassword` and `accounts:signUp`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PasswordRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub return_secure_token: bool,
}

/// Body for `accounts:update`.
#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub(super) struct UpdateRequest<'a> {
    pub id_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<&'a str>,
    pub return_secure_token: bool,
}

/// Body for `accounts:delete`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DeleteRequest<'a> {
    pub id_token: &'a str,
}

/// Body for `accounts:sendOobCode`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct OobRequest<'a> {
    pub request_type: &'a str,
    pub email: &'a str,
}

/// Response of sign-in, sign-up and update calls.
///
/// Update only returns tokens when the email or password changed.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AccountResponse {
    pub local_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Error envelope (`{ "error": { "code": 400, "message": "EMAIL_EXISTS" } }`).
#[derive(Deserialize)]
pub(super) struct ErrorEnvelope {
    pub error: ErrorDetail,
}

#[derive(Deserialize)]
pub(super) struct ErrorDetail {
    #[serde(default)]
    pub message: String,
}
