//! # HTTP Handlers
//!
//! Page handlers for the plant operator flow ([`plant`]), the admin flow
//! ([`admin`]) and the liveness check ([`health`]).

pub mod admin;
pub mod health;
pub mod plant;

use axum::response::{Html, IntoResponse, Redirect, Response};

use crate::error::ApiError;
use crate::server::AppState;
use crate::session::{Flash, Session};

pub use admin::{
    admin_login, admin_login_form, delete_record, edit_record, edit_record_form, export_records,
    list_records, logout,
};
pub use health::healthz;
pub use plant::{plant_login, plant_login_form, plant_logout, record_form, submit_record};

/// Render a page that consumes the pending flash messages. The session
/// cookie is only rewritten when there were messages to clear.
pub(crate) fn render_with_flashes(
    state: &AppState,
    mut session: Session,
    render: impl FnOnce(&[Flash]) -> String,
) -> Result<Response, ApiError> {
    let flashes = session.take_flashes();
    let page = Html(render(&flashes));
    if flashes.is_empty() {
        return Ok(page.into_response());
    }

    let cookie = state.sessions.persist(&session)?;
    Ok((cookie, page).into_response())
}

/// Redirect (303) after storing the updated session.
pub(crate) fn redirect_with_session(
    state: &AppState,
    session: &Session,
    to: &str,
) -> Result<Response, ApiError> {
    let cookie = state.sessions.persist(session)?;
    Ok((cookie, Redirect::to(to)).into_response())
}

#[cfg(test)]
mod tests;
