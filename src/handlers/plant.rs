//! # Plant Operator Handlers
//!
//! Login, monthly data entry and logout for plant operators.

use axum::{
    Form,
    extract::State,
    response::{Html, Response},
};
use metrics::counter;
use serde::Deserialize;

use super::{redirect_with_session, render_with_flashes};
use crate::auth::{PLANT_LOGIN_PATH, RequirePlant, Role};
use crate::error::ApiError;
use crate::normalization::PlantRecordForm;
use crate::repositories::PlantRecordRepository;
use crate::server::AppState;
use crate::session::{FlashLevel, Session};
use crate::templates;

/// Submitted plant login form
#[derive(Debug, Deserialize)]
pub struct PlantLoginForm {
    #[serde(default)]
    pub plant_name: String,
    #[serde(default)]
    pub password: String,
}

/// `GET /`
pub async fn plant_login_form(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, ApiError> {
    render_with_flashes(&state, session, templates::plant_login_page)
}

/// `POST /`
pub async fn plant_login(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<PlantLoginForm>,
) -> Result<Response, ApiError> {
    let allowed = state
        .authenticator
        .check(Role::Plant, &form.plant_name, &form.password)
        .await?;
    record_login(Role::Plant, allowed);

    if allowed {
        tracing::info!(plant_name = %form.plant_name, "Plant operator logged in");
        session.login_plant(&form.plant_name);
        return redirect_with_session(&state, &session, "/form");
    }

    tracing::warn!(plant_name = %form.plant_name, "Plant login rejected");
    session.flash(FlashLevel::Danger, Role::Plant.login_failure_message());
    render_with_flashes(&state, session, templates::plant_login_page)
}

/// `GET /plant-logout` drops the plant role only.
pub async fn plant_logout(
    State(state): State<AppState>,
    mut session: Session,
) -> Result<Response, ApiError> {
    if let Some(plant_name) = session.plant_name.as_deref() {
        tracing::info!(plant_name, "Plant operator logged out");
    }
    session.logout_plant();
    redirect_with_session(&state, &session, PLANT_LOGIN_PATH)
}

/// `GET /form`
pub async fn record_form(
    State(state): State<AppState>,
    RequirePlant(session): RequirePlant,
) -> Result<Response, ApiError> {
    let plant_name = session.plant_name.clone();
    render_with_flashes(&state, session, |flashes| {
        templates::record_form_page(plant_name.as_deref(), flashes)
    })
}

/// `POST /submit`
pub async fn submit_record(
    State(state): State<AppState>,
    RequirePlant(session): RequirePlant,
    Form(form): Form<PlantRecordForm>,
) -> Result<Html<String>, ApiError> {
    let fields = form.normalize()?;
    let id = PlantRecordRepository::new(&state.db).insert(fields).await?;

    counter!("plantdata_submissions_total").increment(1);
    tracing::info!(
        record_id = id,
        submitted_by = session.plant_name.as_deref().unwrap_or_default(),
        "Plant record submitted"
    );

    Ok(Html(templates::success_page()))
}

pub(crate) fn record_login(role: Role, allowed: bool) {
    let outcome = if allowed { "success" } else { "failure" };
    counter!("plantdata_logins_total", "role" => role.as_str(), "outcome" => outcome).increment(1);
}
