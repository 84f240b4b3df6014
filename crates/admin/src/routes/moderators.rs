//! Moderator management route handlers (admin role only).
//!
//! The role gate in [`AdminSession`] redirects non-admins to `/dashboard`
//! before any of these handlers run.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Multipart, Path, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use ms_apparels_core::{Moderator, ModeratorId, Role, Uid};
use tracing::instrument;

use super::upload::UploadForm;
use super::{ConfirmForm, ConfirmTemplate, Layout, render};
use crate::error::AppError;
use crate::filters;
use crate::middleware::AdminSession;
use crate::state::AppState;
use crate::views::moderators::{self, ModeratorEdit, ModeratorForm};
use crate::views::{Confirmation, DeleteOutcome, LoadState, Notice, ViewError, login, notify};

const ADD_PATH: &str = "/dashboard/moderator/add";
const SHOW_PATH: &str = "/dashboard/moderator/show";

/// Shown after deleting one's own account.
pub const ACCOUNT_DELETED: &str = "Your account has been deleted.";

// =============================================================================
// View Types
// =============================================================================

/// Moderator row for templates.
#[derive(Debug, Clone)]
pub struct ModeratorRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub image: Option<String>,
    pub joined: String,
    pub is_self: bool,
}

impl ModeratorRow {
    #[must_use]
    pub fn new(moderator: &Moderator, own_uid: &Uid) -> Self {
        Self {
            id: moderator.id.to_string(),
            name: moderator.display_name.clone(),
            email: moderator.email.clone(),
            role: moderator.role.to_string(),
            image: moderator.image.clone(),
            joined: moderator
                .created_at
                .map(|d| d.format("%b %d, %Y").to_string())
                .unwrap_or_default(),
            is_self: &moderator.uid == own_uid,
        }
    }
}

/// Add moderator page template.
#[derive(Template)]
#[template(path = "moderators/add.html")]
pub struct AddModeratorTemplate {
    pub layout: Layout,
    pub name: String,
    pub email: String,
    pub role: String,
}

/// Moderator list page template.
#[derive(Template)]
#[template(path = "moderators/show.html")]
pub struct ModeratorListTemplate {
    pub layout: Layout,
    pub moderators: Vec<ModeratorRow>,
    pub error: Option<String>,
    pub empty_message: Option<&'static str>,
}

/// Edit form for a moderator record, shared with the own-profile page.
#[derive(Template)]
#[template(path = "moderators/edit.html")]
pub struct EditModeratorTemplate {
    pub layout: Layout,
    pub name: String,
    pub email: String,
    pub role: String,
    pub image: Option<String>,
    pub action: String,
    pub cancel: String,
    pub show_role: bool,
}

impl EditModeratorTemplate {
    /// Prefill from a record.
    #[must_use]
    pub fn prefilled(
        layout: Layout,
        moderator: &Moderator,
        action: String,
        cancel: String,
    ) -> Self {
        let edit = ModeratorEdit::from_moderator(moderator);
        Self {
            layout,
            name: edit.name,
            email: edit.email,
            role: edit.role.to_string(),
            image: moderator.image.clone(),
            action,
            cancel,
            show_role: true,
        }
    }
}

const INVALID_ROLE: &str = "Please choose a valid role.";

/// Read the edit fields of a multipart form.
///
/// Returns the typed fields, plus the first upload error to report (a
/// rejected image or an unknown role).
pub fn edit_from_upload(mut upload: UploadForm) -> (ModeratorEdit, Option<ViewError>) {
    let (image, image_error) = upload.take_image();
    let (role, role_error) = split_role(&upload.text("role"));
    let edit = ModeratorEdit {
        name: upload.text("name"),
        email: upload.text("email"),
        password: upload.text("password"),
        role,
        image,
    };
    let error = image_error
        .map(|e| ViewError::validation("image", e.to_string()))
        .or(role_error);
    (edit, error)
}

/// Parse the role select. A missing value is the default role.
fn parse_role(value: &str) -> Result<Role, ViewError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(Role::default());
    }
    value
        .parse()
        .map_err(|_| ViewError::validation("role", INVALID_ROLE))
}

fn split_role(value: &str) -> (Role, Option<ViewError>) {
    match parse_role(value) {
        Ok(role) => (role, None),
        Err(e) => (Role::default(), Some(e)),
    }
}

fn edit_path(id: &str) -> String {
    format!("/dashboard/moderator/{id}/edit")
}

/// Build the moderator router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(ADD_PATH, get(add_page).post(add))
        .route(SHOW_PATH, get(show))
        .route("/dashboard/moderator/{id}/edit", get(edit_page).post(edit))
        .route(
            "/dashboard/moderator/{id}/delete",
            get(delete_page).post(delete),
        )
        .route(
            "/dashboard/moderator/{id}/reset-password",
            post(reset_password),
        )
}

/// Fetch the list once if this workspace has never loaded it.
async fn ensure_loaded(state: &AppState, admin: &AdminSession) -> Result<(), ViewError> {
    if *admin.workspace.moderators.lock().await.state() == LoadState::Loading {
        moderators::load(state.backend(), &admin.workspace.moderators).await?;
    }
    Ok(())
}

async fn find(
    state: &AppState,
    admin: &AdminSession,
    id: &ModeratorId,
) -> Result<Option<Moderator>, ViewError> {
    ensure_loaded(state, admin).await?;
    Ok(admin.workspace.moderators.lock().await.get(id).cloned())
}

// =============================================================================
// Add
// =============================================================================

/// GET /dashboard/moderator/add
async fn add_page(admin: AdminSession, State(state): State<AppState>) -> impl IntoResponse {
    let template = AddModeratorTemplate {
        layout: Layout::new(&admin, &state, ADD_PATH).await,
        name: String::new(),
        email: String::new(),
        role: Role::default().to_string(),
    };
    render(&template)
}

/// POST /dashboard/moderator/add
#[instrument(skip_all)]
async fn add(
    admin: AdminSession,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let mut upload = UploadForm::read(multipart).await?;
    let (image, image_error) = upload.take_image();
    let (role, role_error) = split_role(&upload.text("role"));
    let form = ModeratorForm {
        name: upload.text("name"),
        email: upload.text("email"),
        password: upload.text("password"),
        role,
        image,
    };

    let mut layout = Layout::new(&admin, &state, ADD_PATH).await;
    let upload_error = image_error
        .map(|e| ViewError::validation("image", e.to_string()))
        .or(role_error);
    let errors = match (upload_error, form.validate()) {
        (Some(e), _) => vec![e],
        (None, Err(errors)) => errors,
        (None, Ok(new)) => {
            match moderators::create(
                state.backend(),
                state.identity(),
                &admin.workspace.auth,
                &admin.workspace.moderators,
                new,
            )
            .await
            {
                Ok(()) => {
                    notify::push(&admin.session, Notice::success(moderators::ADDED)).await;
                    return Ok(Redirect::to(ADD_PATH).into_response());
                }
                Err(e) => vec![e],
            }
        }
    };

    for error in &errors {
        layout.error(error);
    }
    let template = AddModeratorTemplate {
        layout,
        name: form.name,
        email: form.email,
        role: form.role.to_string(),
    };
    Ok(render(&template).into_response())
}

// =============================================================================
// List
// =============================================================================

/// GET /dashboard/moderator/show
async fn show(admin: AdminSession, State(state): State<AppState>) -> impl IntoResponse {
    let mut layout = Layout::new(&admin, &state, SHOW_PATH).await;

    let error = match moderators::load(state.backend(), &admin.workspace.moderators).await {
        Ok(()) => None,
        Err(e) => {
            layout.error(&e);
            Some(e.to_string())
        }
    };

    let rows: Vec<ModeratorRow> = admin
        .workspace
        .moderators
        .lock()
        .await
        .records()
        .iter()
        .map(|m| ModeratorRow::new(m, &admin.user.uid))
        .collect();

    let empty_message = (rows.is_empty() && error.is_none()).then_some(moderators::NO_RECORDS);
    render(&ModeratorListTemplate {
        layout,
        moderators: rows,
        error,
        empty_message,
    })
}

// =============================================================================
// Edit
// =============================================================================

/// GET /dashboard/moderator/{id}/edit
async fn edit_page(
    admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let moderator = match find(&state, &admin, &ModeratorId::new(id.clone())).await {
        Ok(Some(moderator)) => moderator,
        Ok(None) => return Err(AppError::NotFound(format!("moderator {id}"))),
        Err(e) => {
            notify::push(&admin.session, Notice::from(&e)).await;
            return Ok(Redirect::to(SHOW_PATH).into_response());
        }
    };

    let layout = Layout::new(&admin, &state, SHOW_PATH).await;
    let template = EditModeratorTemplate::prefilled(
        layout,
        &moderator,
        edit_path(&id),
        SHOW_PATH.to_string(),
    );
    Ok(render(&template).into_response())
}

/// POST /dashboard/moderator/{id}/edit
#[instrument(skip(admin, state, multipart))]
async fn edit(
    admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let upload = UploadForm::read(multipart).await?;
    let moderator_id = ModeratorId::new(id.clone());
    let current = find(&state, &admin, &moderator_id).await.ok().flatten();

    let (edit, upload_error) = edit_from_upload(upload);
    let result = match upload_error {
        Some(e) => Err(e),
        None => {
            moderators::update(
                state.backend(),
                state.identity(),
                &admin.workspace.auth,
                &admin.workspace.moderators,
                &moderator_id,
                &edit,
            )
            .await
        }
    };

    match result {
        Ok(_) => {
            notify::push(&admin.session, Notice::success(moderators::UPDATED)).await;
            Ok(Redirect::to(SHOW_PATH).into_response())
        }
        Err(e) => {
            let Some(current) = current else {
                notify::push(&admin.session, Notice::from(&e)).await;
                return Ok(Redirect::to(SHOW_PATH).into_response());
            };
            let mut layout = Layout::new(&admin, &state, SHOW_PATH).await;
            layout.error(&e);
            let mut template = EditModeratorTemplate::prefilled(
                layout,
                &current,
                edit_path(&id),
                SHOW_PATH.to_string(),
            );
            template.name = edit.name;
            template.email = edit.email;
            if e.field() != Some("role") {
                template.role = edit.role.to_string();
            }
            Ok(render(&template).into_response())
        }
    }
}

// =============================================================================
// Delete
// =============================================================================

/// GET /dashboard/moderator/{id}/delete
async fn delete_page(
    admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let Some(moderator) = find(&state, &admin, &ModeratorId::new(id.clone()))
        .await
        .ok()
        .flatten()
    else {
        return Ok(Redirect::to(SHOW_PATH).into_response());
    };

    let template = ConfirmTemplate {
        layout: Layout::new(&admin, &state, SHOW_PATH).await,
        subject: format!("{} ({})", moderator.display_name, moderator.email),
        action: format!("/dashboard/moderator/{id}/delete"),
        cancel: SHOW_PATH.to_string(),
    };
    Ok(render(&template).into_response())
}

/// POST /dashboard/moderator/{id}/delete
#[instrument(skip(admin, state, form))]
async fn delete(
    mut admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<ConfirmForm>,
) -> Result<Redirect, AppError> {
    let moderator_id = ModeratorId::new(id);
    let own_account = admin
        .workspace
        .moderators
        .lock()
        .await
        .get(&moderator_id)
        .is_some_and(|m| m.uid == admin.user.uid);

    let result = moderators::delete(
        state.backend(),
        state.identity(),
        &admin.workspace.auth,
        &admin.workspace.moderators,
        &moderator_id,
        Confirmation::from_form(form.confirm.as_deref()),
    )
    .await;

    if own_account && admin.workspace.auth.current_session().is_none() {
        login::sign_out(&admin.workspace, &mut admin.roles).await;
        let notice = match &result {
            Ok(_) => Notice::success(ACCOUNT_DELETED),
            Err(e) => Notice::from(e),
        };
        notify::push(&admin.session, notice).await;
        return Ok(Redirect::to("/login"));
    }

    match result {
        Ok(DeleteOutcome::Deleted) => {
            notify::push(&admin.session, Notice::success(moderators::DELETED)).await;
        }
        Ok(DeleteOutcome::Cancelled) => {}
        Err(e) => notify::push(&admin.session, Notice::from(&e)).await,
    }
    Ok(Redirect::to(SHOW_PATH))
}

// =============================================================================
// Password Reset
// =============================================================================

/// POST /dashboard/moderator/{id}/reset-password
#[instrument(skip(admin, state))]
async fn reset_password(
    admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let notice = match find(&state, &admin, &ModeratorId::new(id)).await {
        Ok(Some(moderator)) => {
            match moderators::send_password_reset(state.identity(), &moderator.email).await {
                Ok(()) => Notice::success(moderators::RESET_SENT),
                Err(e) => Notice::from(&e),
            }
        }
        Ok(None) => Notice::from(&ViewError::NotFound("Moderator")),
        Err(e) => Notice::from(&e),
    };
    notify::push(&admin.session, notice).await;
    Ok(Redirect::to(SHOW_PATH))
}
