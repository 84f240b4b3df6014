//! Authentication route handlers for admin.
//!
//! Email and password sign-in against the identity provider, followed by
//! the backend role lookup.

use askama::Template;
use axum::{
    Form, Router,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::render;
use crate::error::{AppError, clear_sentry_user};
use crate::filters;
use crate::models::RoleStore;
use crate::state::AppState;
use crate::views::{Notice, login, notify};

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Login page template.
#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub email: String,
    pub error: Option<String>,
    pub notices: Vec<Notice>,
    pub notice_duration_ms: u32,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/logout", post(logout))
}

/// Render the login page, or go to the dashboard when already signed in.
///
/// GET /login
async fn login_page(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let workspace = state.workspaces().for_session(&session).await?;
    if workspace.auth.current_session().is_some() {
        return Ok(Redirect::to("/dashboard").into_response());
    }

    let template = LoginTemplate {
        email: String::new(),
        error: None,
        notices: notify::take(&session).await,
        notice_duration_ms: notify::NOTICE_DURATION_MS,
    };
    Ok(render(&template).into_response())
}

/// Sign in and record the role.
///
/// POST /login
#[instrument(skip(state, session, form), fields(email = %form.email))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let workspace = state.workspaces().for_session(&session).await?;
    let mut roles = RoleStore::rehydrate(session.clone()).await;

    match login::sign_in(
        state.backend(),
        state.identity(),
        &workspace,
        &mut roles,
        &form.email,
        &form.password,
    )
    .await
    {
        Ok(_) => Ok(Redirect::to("/dashboard").into_response()),
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            let template = LoginTemplate {
                email: form.email,
                error: Some(e.to_string()),
                notices: Vec::new(),
                notice_duration_ms: notify::NOTICE_DURATION_MS,
            };
            Ok(render(&template).into_response())
        }
    }
}

/// Sign out and clear the stored role.
///
/// POST /logout
async fn logout(State(state): State<AppState>, session: Session) -> Result<Redirect, AppError> {
    let workspace = state.workspaces().for_session(&session).await?;
    let mut roles = RoleStore::rehydrate(session.clone()).await;
    login::sign_out(&workspace, &mut roles).await;
    clear_sentry_user();
    Ok(Redirect::to("/login"))
}
