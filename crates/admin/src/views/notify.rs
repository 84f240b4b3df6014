//! Transient notices (toasts).
//!
//! Notices raised while handling a request are queued in the cookie session
//! and rendered once by the next page, which dismisses them after a few
//! seconds.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::error::ViewError;
use crate::models::session_keys;

/// How long a notice stays on screen, in milliseconds.
pub const NOTICE_DURATION_MS: u32 = 4000;

/// Notice severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A single toast message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// CSS modifier for the template.
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self.level {
            NoticeLevel::Success => "notice-success",
            NoticeLevel::Error => "notice-error",
        }
    }
}

impl From<&ViewError> for Notice {
    fn from(error: &ViewError) -> Self {
        Self::error(error.to_string())
    }
}

/// Queue a notice for the next rendered page.
pub async fn push(session: &Session, notice: Notice) {
    let mut pending = pending(session).await;
    pending.push(notice);
    if let Err(e) = session.insert(session_keys::NOTICES, &pending).await {
        tracing::warn!(error = %e, "Failed to queue notice");
    }
}

/// Take all queued notices.
pub async fn take(session: &Session) -> Vec<Notice> {
    match session.remove::<Vec<Notice>>(session_keys::NOTICES).await {
        Ok(notices) => notices.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Discarding unreadable notices");
            Vec::new()
        }
    }
}

async fn pending(session: &Session) -> Vec<Notice> {
    session
        .get::<Vec<Notice>>(session_keys::NOTICES)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_notices_are_taken_once() {
        let session = session();
        push(&session, Notice::success("Product added successfully!")).await;
        push(&session, Notice::error("Could not reach server")).await;

        let notices = take(&session).await;
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].level, NoticeLevel::Success);
        assert_eq!(notices[1].message, "Could not reach server");

        assert!(take(&session).await.is_empty());
    }

    #[test]
    fn test_from_view_error() {
        let notice = Notice::from(&ViewError::AccessDenied);
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "You Don't Have Access");
        assert_eq!(notice.css_class(), "notice-error");
    }
}
