//! EmailJS API client for the contact form.
//!
//! Sends the visitor's message through a pre-configured EmailJS template
//! (`POST /email/send`). The template receives `user_name`, `user_email`,
//! `user_phone` and `message`.

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::config::EmailJsConfig;

/// Errors that can occur when sending a contact message.
#[derive(Debug, Error)]
pub enum ContactError {
    /// A required field was blank.
    #[error("{0} is required.")]
    MissingField(&'static str),

    /// The email address is not plausible.
    #[error("Please enter a valid email address.")]
    InvalidEmail,

    /// Sending is not configured.
    #[error("Contact form delivery is not configured")]
    NotConfigured,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// A submitted contact form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactMessage {
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_email: String,
    #[serde(default)]
    pub user_phone: String,
    #[serde(default)]
    pub message: String,
}

impl ContactMessage {
    /// Trim every field and check the required ones.
    ///
    /// # Errors
    ///
    /// Returns `ContactError::MissingField` for a blank name, email or
    /// message, and `ContactError::InvalidEmail` for an implausible address.
    pub fn validated(self) -> Result<Self, ContactError> {
        let message = Self {
            user_name: self.user_name.trim().to_string(),
            user_email: self.user_email.trim().to_lowercase(),
            user_phone: self.user_phone.trim().to_string(),
            message: self.message.trim().to_string(),
        };

        if message.user_name.is_empty() {
            return Err(ContactError::MissingField("Name"));
        }
        if message.user_email.is_empty() {
            return Err(ContactError::MissingField("Email"));
        }
        if message.message.is_empty() {
            return Err(ContactError::MissingField("Message"));
        }
        if ms_apparels_core::Email::parse(&message.user_email).is_err() {
            return Err(ContactError::InvalidEmail);
        }

        Ok(message)
    }
}

/// Request body for `POST /email/send`.
#[derive(Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    #[serde(rename = "accessToken", skip_serializing_if = "Option::is_none")]
    access_token: Option<&'a str>,
    template_params: &'a ContactMessage,
}

/// EmailJS API client.
#[derive(Clone)]
pub struct EmailJsClient {
    client: reqwest::Client,
    config: EmailJsConfig,
}

impl std::fmt::Debug for EmailJsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailJsClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl EmailJsClient {
    /// Create a new EmailJS client.
    #[must_use]
    pub fn new(config: EmailJsConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Send a validated contact message.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or EmailJS rejects it.
    #[instrument(skip(self, message), fields(email = %message.user_email))]
    pub async fn send(&self, message: &ContactMessage) -> Result<(), ContactError> {
        let body = SendRequest {
            service_id: &self.config.service_id,
            template_id: &self.config.template_id,
            user_id: &self.config.public_key,
            access_token: self.config.private_key.as_ref().map(|k| k.expose_secret()),
            template_params: message,
        };

        let response = self
            .client
            .post(format!("{}/email/send", self.config.api_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ContactError::Api {
                status: status.as_u16(),
                message,
            });
        }

        tracing::info!("Contact message sent");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn message() -> ContactMessage {
        ContactMessage {
            user_name: "  Jordan ".to_string(),
            user_email: " Jordan@Example.com ".to_string(),
            user_phone: String::new(),
            message: "Do you make cricket whites?".to_string(),
        }
    }

    #[test]
    fn test_validated_trims_fields() {
        let message = message().validated().unwrap();
        assert_eq!(message.user_name, "Jordan");
        assert_eq!(message.user_email, "jordan@example.com");
    }

    #[test]
    fn test_validated_requires_message() {
        let err = ContactMessage {
            message: "   ".to_string(),
            ..message()
        }
        .validated()
        .unwrap_err();
        assert_eq!(err.to_string(), "Message is required.");
    }

    #[test]
    fn test_validated_rejects_bad_email() {
        let err = ContactMessage {
            user_email: "not-an-email".to_string(),
            ..message()
        }
        .validated()
        .unwrap_err();
        assert!(matches!(err, ContactError::InvalidEmail));
    }

    #[test]
    fn test_send_request_shape() {
        let message = message().validated().unwrap();
        let body = SendRequest {
            service_id: "service_1",
            template_id: "template_1",
            user_id: "pk_1",
            access_token: None,
            template_params: &message,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["user_id"], "pk_1");
        assert_eq!(json["template_params"]["user_name"], "Jordan");
        assert!(json.get("accessToken").is_none());
    }
}
