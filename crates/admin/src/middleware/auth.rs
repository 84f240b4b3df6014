//! Authentication extractor for the `/dashboard` views.
//!
//! [`AdminSession`] mounts a [`RouteGuard`] on the browser's auth instance,
//! waits for the current session, rehydrates the stored role and applies
//! the admin role gate for the requested path.

use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::{StatusCode, request::Parts},
    response::{Html, IntoResponse, Redirect, Response},
};
use ms_apparels_core::Role;
use tower_sessions::Session;

use super::guard::{AdminRoute, GateDecision, Rendering, RouteGuard, role_gate};
use crate::error::{AppError, set_sentry_user};
use crate::identity::IdentitySession;
use crate::models::{RoleStore, Workspace};
use crate::state::AppState;

/// Placeholder shown while the session is still being checked.
#[derive(Template)]
#[template(path = "loading.html")]
pub struct LoadingTemplate {
    pub target: String,
}

/// Extractor for a signed-in user allowed to open the requested view.
///
/// The route guard is held for the lifetime of the request and releases its
/// subscription when the extractor is dropped.
pub struct AdminSession {
    pub session: Session,
    pub workspace: Arc<Workspace>,
    pub roles: RoleStore<Session>,
    pub user: IdentitySession,
    _guard: RouteGuard,
}

impl AdminSession {
    /// The stored role, if any.
    #[must_use]
    pub const fn role(&self) -> Option<Role> {
        self.roles.get_role()
    }

    /// Whether the admin-only navigation should be shown.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role().is_some_and(Role::is_admin)
    }
}

/// Why an [`AdminSession`] could not be extracted.
pub enum AdminSessionRejection {
    /// The session is still being checked.
    Loading { target: String },
    /// No signed-in session.
    RedirectToLogin,
    /// Signed in, but the role may not open this view.
    RedirectToDashboard,
    /// The session layer failed.
    Internal(AppError),
}

impl IntoResponse for AdminSessionRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Loading { target } => {
                let html = LoadingTemplate { target }.render().unwrap_or_else(|e| {
                    tracing::error!("Template render error: {}", e);
                    "Loading...".to_string()
                });
                (StatusCode::OK, Html(html)).into_response()
            }
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::RedirectToDashboard => Redirect::to("/dashboard").into_response(),
            Self::Internal(error) => error.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AdminSessionRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let path = parts
            .extensions
            .get::<OriginalUri>()
            .map_or_else(|| parts.uri.path().to_owned(), |uri| uri.0.path().to_owned());

        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| {
                AdminSessionRejection::Internal(AppError::Internal(
                    "session layer missing".to_string(),
                ))
            })?;

        let workspace = state
            .workspaces()
            .for_session(&session)
            .await
            .map_err(|e| AdminSessionRejection::Internal(e.into()))?;

        let mut guard = RouteGuard::mount(&workspace.auth);
        match guard.settle().await {
            Rendering::Loading => return Err(AdminSessionRejection::Loading { target: path }),
            Rendering::RedirectToLogin => return Err(AdminSessionRejection::RedirectToLogin),
            Rendering::View => {}
        }
        let user = guard
            .session()
            .cloned()
            .ok_or(AdminSessionRejection::RedirectToLogin)?;

        let roles = RoleStore::rehydrate(session.clone()).await;
        if role_gate(AdminRoute::from_path(&path), roles.get_role())
            == GateDecision::RedirectToDashboard
        {
            tracing::debug!(path = %path, uid = %user.uid, "Admin-only view refused");
            return Err(AdminSessionRejection::RedirectToDashboard);
        }

        set_sentry_user(user.uid.as_str(), Some(&user.email));

        Ok(Self {
            session,
            workspace,
            roles,
            user,
            _guard: guard,
        })
    }
}
