//! # Admin Handlers
//!
//! Login, record listing, editing, deletion and spreadsheet export for
//! administrators.

use axum::{
    Form,
    extract::{Path, State},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use metrics::counter;
use serde::Deserialize;

use super::plant::record_login;
use super::{redirect_with_session, render_with_flashes};
use crate::auth::{ADMIN_LOGIN_PATH, RequireAdmin, Role};
use crate::error::ApiError;
use crate::export::{EXPORT_FILENAME, XLSX_MIME, export_workbook};
use crate::normalization::PlantRecordForm;
use crate::repositories::PlantRecordRepository;
use crate::server::AppState;
use crate::session::{FlashLevel, Session};
use crate::templates;

const ADMIN_HOME: &str = "/admin";
const RECORD_NOT_FOUND: &str = "Record not found";

/// Submitted admin login form
#[derive(Debug, Deserialize)]
pub struct AdminLoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// `GET /login` and `GET /admin-login`
pub async fn admin_login_form(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, ApiError> {
    render_with_flashes(&state, session, templates::admin_login_page)
}

/// `POST /login` and `POST /admin-login`
pub async fn admin_login(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<AdminLoginForm>,
) -> Result<Response, ApiError> {
    let allowed = state
        .authenticator
        .check(Role::Admin, &form.username, &form.password)
        .await?;
    record_login(Role::Admin, allowed);

    if allowed {
        tracing::info!(username = %form.username, "Administrator logged in");
        session.login_admin(&form.username);
        return redirect_with_session(&state, &session, ADMIN_HOME);
    }

    tracing::warn!(username = %form.username, "Admin login rejected");
    session.flash(FlashLevel::Danger, Role::Admin.login_failure_message());
    render_with_flashes(&state, session, templates::admin_login_page)
}

/// `GET /logout` clears the whole session.
pub async fn logout(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    if let Some(username) = session.admin_name.as_deref() {
        tracing::info!(username, "Administrator logged out");
    }
    (
        state.sessions.expire(),
        axum::response::Redirect::to(ADMIN_LOGIN_PATH),
    )
}

/// `GET /admin` lists every record, newest first.
pub async fn list_records(
    State(state): State<AppState>,
    RequireAdmin(session): RequireAdmin,
) -> Result<Response, ApiError> {
    let records = PlantRecordRepository::new(&state.db).list_all().await?;
    render_with_flashes(&state, session, |flashes| {
        templates::admin_page(&records, flashes)
    })
}

/// `GET /edit/{id}`
pub async fn edit_record_form(
    State(state): State<AppState>,
    RequireAdmin(mut session): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    match PlantRecordRepository::new(&state.db).get(id).await? {
        Some(record) => render_with_flashes(&state, session, |flashes| {
            templates::edit_page(&record, flashes)
        }),
        None => {
            session.flash(FlashLevel::Danger, RECORD_NOT_FOUND);
            redirect_with_session(&state, &session, ADMIN_HOME)
        }
    }
}

/// `POST /edit/{id}` overwrites the editable fields of one record.
pub async fn edit_record(
    State(state): State<AppState>,
    RequireAdmin(mut session): RequireAdmin,
    Path(id): Path<i32>,
    Form(form): Form<PlantRecordForm>,
) -> Result<Response, ApiError> {
    let fields = form.normalize()?;

    match PlantRecordRepository::new(&state.db).update(id, fields).await? {
        Some(_) => {
            tracing::info!(
                record_id = id,
                edited_by = session.admin_name.as_deref().unwrap_or_default(),
                "Plant record updated"
            );
            session.flash(FlashLevel::Success, format!("Record {} updated", id));
        }
        None => session.flash(FlashLevel::Danger, RECORD_NOT_FOUND),
    }
    redirect_with_session(&state, &session, ADMIN_HOME)
}

/// `GET|POST /delete/{id}`. A missing id changes nothing.
pub async fn delete_record(
    State(state): State<AppState>,
    RequireAdmin(mut session): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    if PlantRecordRepository::new(&state.db).delete(id).await? {
        tracing::info!(
            record_id = id,
            deleted_by = session.admin_name.as_deref().unwrap_or_default(),
            "Plant record deleted"
        );
        session.flash(FlashLevel::Success, format!("Record {} deleted", id));
    } else {
        session.flash(FlashLevel::Danger, RECORD_NOT_FOUND);
    }
    redirect_with_session(&state, &session, ADMIN_HOME)
}

/// `GET /export` downloads every record as an `.xlsx` workbook.
pub async fn export_records(
    State(state): State<AppState>,
    RequireAdmin(_session): RequireAdmin,
) -> Result<Response, ApiError> {
    let records = PlantRecordRepository::new(&state.db)
        .list_for_export()
        .await?;
    let bytes = export_workbook(&records)?;

    counter!("plantdata_exports_total").increment(1);
    tracing::info!(records = records.len(), "Exported plant records");

    let disposition = format!("attachment; filename=\"{}\"", EXPORT_FILENAME);
    let disposition = HeaderValue::from_str(&disposition)
        .map_err(|e| anyhow::anyhow!("invalid content disposition: {}", e))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(XLSX_MIME)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
