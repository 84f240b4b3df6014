//! Dashboard route handlers: the signed-in moderator's own profile.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Multipart, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use ms_apparels_core::Moderator;
use tracing::instrument;

use super::moderators::{ACCOUNT_DELETED, EditModeratorTemplate, ModeratorRow, edit_from_upload};
use super::upload::UploadForm;
use super::{ConfirmForm, ConfirmTemplate, Layout, render};
use crate::error::{AppError, clear_sentry_user};
use crate::filters;
use crate::middleware::AdminSession;
use crate::state::AppState;
use crate::views::moderators;
use crate::views::{Confirmation, DeleteOutcome, Notice, ViewError, login, notify, profile};

const DASHBOARD_PATH: &str = "/dashboard";
const EDIT_PATH: &str = "/dashboard/profile/edit";
const DELETE_PATH: &str = "/dashboard/profile/delete";

/// Dashboard template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub layout: Layout,
    pub profile: Option<ModeratorRow>,
    pub missing_message: Option<&'static str>,
    pub error: Option<String>,
}

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(DASHBOARD_PATH, get(index))
        .route(EDIT_PATH, get(edit_page).post(edit))
        .route(DELETE_PATH, get(delete_page).post(delete))
        .route("/dashboard/profile/reset-password", post(reset_password))
        .route("/dashboard/{*rest}", get(index))
}

async fn current_profile(admin: &AdminSession) -> Option<Moderator> {
    profile::current(&*admin.workspace.profile.lock().await, &admin.user.uid).cloned()
}

/// The signed-in user's profile, fetched unless already loaded for them.
async fn loaded_profile(
    state: &AppState,
    admin: &AdminSession,
) -> Result<Option<Moderator>, ViewError> {
    profile::ensure_loaded(state.backend(), &admin.workspace.auth, &admin.workspace.profile).await
}

/// Own profile page. Unknown `/dashboard/*` paths land here too.
///
/// GET /dashboard
#[instrument(skip(admin, state), fields(uid = %admin.user.uid))]
async fn index(admin: AdminSession, State(state): State<AppState>) -> impl IntoResponse {
    let mut layout = Layout::new(&admin, &state, DASHBOARD_PATH).await;

    let workspace = &admin.workspace;
    let error = match profile::load(state.backend(), &workspace.auth, &workspace.profile).await {
        Ok(()) => None,
        Err(e) => {
            layout.error(&e);
            Some(e.to_string())
        }
    };

    let profile = current_profile(&admin)
        .await
        .map(|m| ModeratorRow::new(&m, &admin.user.uid));
    let missing_message = (profile.is_none() && error.is_none()).then_some(profile::MISSING);

    render(&DashboardTemplate {
        layout,
        profile,
        missing_message,
        error,
    })
}

/// GET /dashboard/profile/edit
async fn edit_page(admin: AdminSession, State(state): State<AppState>) -> Response {
    match loaded_profile(&state, &admin).await {
        Ok(Some(moderator)) => {
            let layout = Layout::new(&admin, &state, DASHBOARD_PATH).await;
            let mut template = EditModeratorTemplate::prefilled(
                layout,
                &moderator,
                EDIT_PATH.to_string(),
                DASHBOARD_PATH.to_string(),
            );
            template.show_role = false;
            render(&template).into_response()
        }
        Ok(None) => Redirect::to(DASHBOARD_PATH).into_response(),
        Err(e) => {
            notify::push(&admin.session, Notice::from(&e)).await;
            Redirect::to(DASHBOARD_PATH).into_response()
        }
    }
}

/// POST /dashboard/profile/edit
#[instrument(skip(admin, state, multipart), fields(uid = %admin.user.uid))]
async fn edit(
    admin: AdminSession,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let upload = UploadForm::read(multipart).await?;
    let current = loaded_profile(&state, &admin).await.ok().flatten();

    let (edit, upload_error) = edit_from_upload(upload);
    let result = match upload_error {
        Some(e) => Err(e),
        None => {
            profile::update(
                state.backend(),
                state.identity(),
                &admin.workspace.auth,
                &admin.workspace.profile,
                edit.clone(),
            )
            .await
        }
    };

    match result {
        Ok(_) => {
            notify::push(&admin.session, Notice::success(moderators::UPDATED)).await;
            Ok(Redirect::to(DASHBOARD_PATH).into_response())
        }
        Err(e) => {
            let Some(current) = current else {
                notify::push(&admin.session, Notice::from(&e)).await;
                return Ok(Redirect::to(DASHBOARD_PATH).into_response());
            };
            let mut layout = Layout::new(&admin, &state, DASHBOARD_PATH).await;
            layout.error(&e);
            let mut template = EditModeratorTemplate::prefilled(
                layout,
                &current,
                EDIT_PATH.to_string(),
                DASHBOARD_PATH.to_string(),
            );
            template.show_role = false;
            template.name = edit.name;
            template.email = edit.email;
            Ok(render(&template).into_response())
        }
    }
}

/// GET /dashboard/profile/delete
async fn delete_page(admin: AdminSession, State(state): State<AppState>) -> Response {
    let Some(moderator) = loaded_profile(&state, &admin).await.ok().flatten() else {
        return Redirect::to(DASHBOARD_PATH).into_response();
    };

    render(&ConfirmTemplate {
        layout: Layout::new(&admin, &state, DASHBOARD_PATH).await,
        subject: format!("your account ({})", moderator.email),
        action: DELETE_PATH.to_string(),
        cancel: DASHBOARD_PATH.to_string(),
    })
    .into_response()
}

/// Delete the own identity account and profile record, then sign out.
///
/// POST /dashboard/profile/delete
#[instrument(skip(admin, state, form), fields(uid = %admin.user.uid))]
async fn delete(
    mut admin: AdminSession,
    State(state): State<AppState>,
    Form(form): Form<ConfirmForm>,
) -> Redirect {
    let Some(moderator) = loaded_profile(&state, &admin).await.ok().flatten() else {
        return Redirect::to(DASHBOARD_PATH);
    };

    let result = moderators::delete(
        state.backend(),
        state.identity(),
        &admin.workspace.auth,
        &admin.workspace.profile,
        &moderator.id,
        Confirmation::from_form(form.confirm.as_deref()),
    )
    .await;

    if admin.workspace.auth.current_session().is_none() {
        login::sign_out(&admin.workspace, &mut admin.roles).await;
        clear_sentry_user();
        let notice = match &result {
            Ok(_) => Notice::success(ACCOUNT_DELETED),
            Err(e) => Notice::from(e),
        };
        notify::push(&admin.session, notice).await;
        return Redirect::to("/login");
    }

    match result {
        Ok(DeleteOutcome::Deleted | DeleteOutcome::Cancelled) => {}
        Err(e) => notify::push(&admin.session, Notice::from(&e)).await,
    }
    Redirect::to(DASHBOARD_PATH)
}

/// POST /dashboard/profile/reset-password
#[instrument(skip(admin, state), fields(uid = %admin.user.uid))]
async fn reset_password(admin: AdminSession, State(state): State<AppState>) -> Redirect {
    let email = match loaded_profile(&state, &admin).await {
        Ok(Some(moderator)) => moderator.email,
        _ => admin.user.email.clone(),
    };
    let notice = match moderators::send_password_reset(state.identity(), &email).await {
        Ok(()) => Notice::success(moderators::RESET_SENT),
        Err(e) => Notice::from(&e),
    };
    notify::push(&admin.session, notice).await;
    Redirect::to(DASHBOARD_PATH)
}
