//! Contact form route handlers.
//!
//! Messages are delivered through EmailJS. The outcome is flashed in the
//! session and shown once by the page the POST redirects to.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use super::Layout;
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::services::{ContactError, ContactMessage};
use crate::state::AppState;

const NOTICE_KEY: &str = "contact_notice";

pub const SENT_MESSAGE: &str = "Message sent successfully!";
pub const FAILED_MESSAGE: &str = "Failed to send message. Please try again.";

/// One-shot outcome of the last submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactNotice {
    pub success: bool,
    pub message: String,
}

impl ContactNotice {
    /// CSS modifier for the template.
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        if self.success {
            "notice-success"
        } else {
            "notice-error"
        }
    }
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub layout: Layout,
    pub notice: Option<ContactNotice>,
    /// Validation problem with the submitted values.
    pub error: Option<String>,
    pub form: ContactMessage,
}

impl ContactTemplate {
    fn new(state: &AppState) -> Self {
        Self {
            layout: Layout::new(state, "/contact"),
            notice: None,
            error: None,
            form: ContactMessage::default(),
        }
    }
}

/// Display the contact page.
///
/// # Errors
///
/// Returns an error if the session store fails.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let notice = session.remove::<ContactNotice>(NOTICE_KEY).await?;

    Ok(ContactTemplate {
        notice,
        ..ContactTemplate::new(&state)
    })
}

/// Send a contact message.
///
/// Invalid input re-renders the form with the values kept. Delivery success
/// or failure is flashed and redirects back to `/contact`.
///
/// # Errors
///
/// Returns an error if the session store fails.
#[instrument(skip(state, session, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ContactMessage>,
) -> Result<Response> {
    let message = match form.clone().validated() {
        Ok(message) => message,
        Err(e) => {
            return Ok(ContactTemplate {
                error: Some(e.to_string()),
                form,
                ..ContactTemplate::new(&state)
            }
            .into_response());
        }
    };

    add_breadcrumb("contact", "Contact form submitted", None);

    let result = match state.emailjs() {
        Some(client) => client.send(&message).await,
        None => Err(ContactError::NotConfigured),
    };

    let notice = match result {
        Ok(()) => {
            tracing::info!("Contact message sent");
            ContactNotice {
                success: true,
                message: SENT_MESSAGE.to_string(),
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to send contact message");
            ContactNotice {
                success: false,
                message: FAILED_MESSAGE.to_string(),
            }
        }
    };

    session.insert(NOTICE_KEY, &notice).await?;
    Ok(Redirect::to("/contact").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_css_class() {
        let sent = ContactNotice {
            success: true,
            message: SENT_MESSAGE.to_string(),
        };
        let failed = ContactNotice {
            success: false,
            message: FAILED_MESSAGE.to_string(),
        };
        assert_eq!(sent.css_class(), "notice-success");
        assert_eq!(failed.css_class(), "notice-error");
    }
}
