//! Test utilities for database and HTTP testing.
//!
//! Sets up in-memory SQLite databases with migrations applied and drives the
//! router directly through `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, header},
    response::Response,
};
use migration::{Migrator, MigratorTrait};
use plantdata::{
    auth::{Authenticator, StaticAuthenticator, TableAuthenticator},
    config::{AppConfig, AuthMode},
    normalization::PlantRecordFields,
    server::{AppState, create_app},
    session::SESSION_COOKIE,
};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tower::ServiceExt;

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASS: &str = "admin123";
pub const PLANT_USER: &str = "plant1";
pub const PLANT_PASS: &str = "plant123";

/// Sets up an in-memory SQLite database with all migrations applied.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    // Each pooled connection to :memory: would see its own empty database.
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await?;

    Migrator::up(&db, None).await?;

    Ok(db)
}

/// Configuration for tests with the well-known credentials above.
pub fn test_config(auth_mode: AuthMode) -> AppConfig {
    AppConfig {
        profile: "test".to_string(),
        database_url: "sqlite::memory:".to_string(),
        session_secret: Some("integration-test-session-secret".to_string()),
        auth_mode,
        admin_user: Some(ADMIN_USER.to_string()),
        admin_pass: Some(ADMIN_PASS.to_string()),
        plant_user: Some(PLANT_USER.to_string()),
        plant_pass: Some(PLANT_PASS.to_string()),
        ..Default::default()
    }
}

/// A router backed by a fresh database, using static credentials.
pub async fn static_app() -> Result<(Router, DatabaseConnection)> {
    let db = setup_test_db().await?;
    let config = test_config(AuthMode::Static);
    let authenticator: Arc<dyn Authenticator> = Arc::new(StaticAuthenticator::new(
        (ADMIN_USER.to_string(), ADMIN_PASS.to_string()),
        (PLANT_USER.to_string(), PLANT_PASS.to_string()),
    ));
    let state = AppState::new(Arc::new(config), db.clone(), authenticator);
    Ok((create_app(state), db))
}

/// A router backed by a fresh database whose accounts were seeded from config.
pub async fn table_app() -> Result<(Router, DatabaseConnection)> {
    let db = setup_test_db().await?;
    let config = test_config(AuthMode::Table);
    plantdata::seeds::seed_accounts(&db, &config).await?;
    let authenticator: Arc<dyn Authenticator> = Arc::new(TableAuthenticator::new(db.clone()));
    let state = AppState::new(Arc::new(config), db.clone(), authenticator);
    Ok((create_app(state), db))
}

/// Send one request through the router.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    form: Option<&str>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let body = match form {
        Some(form) => {
            builder = builder.header(
                header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            );
            Body::from(form.to_string())
        }
        None => Body::empty(),
    };

    app.clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap()
}

/// The `name=value` pair of the session cookie set by a response, if any.
pub fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .find(|pair| pair.starts_with(SESSION_COOKIE))
        .map(str::to_string)
}

pub fn location(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

pub async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Log in as the plant operator and return the session cookie.
pub async fn plant_session(app: &Router) -> String {
    let form = format!("plant_name={}&password={}", PLANT_USER, PLANT_PASS);
    let response = send(app, Method::POST, "/", None, Some(&form)).await;
    session_cookie(&response).expect("plant login sets a session cookie")
}

/// Log in as the administrator and return the session cookie.
pub async fn admin_session(app: &Router) -> String {
    let form = format!("username={}&password={}", ADMIN_USER, ADMIN_PASS);
    let response = send(app, Method::POST, "/login", None, Some(&form)).await;
    session_cookie(&response).expect("admin login sets a session cookie")
}

/// Record fields with a plant name, a month and one metric filled in.
pub fn sample_fields(plant_name: &str, month: &str, kwh: Option<f64>) -> PlantRecordFields {
    PlantRecordFields {
        plant_name: Some(plant_name.to_string()),
        month: Some(month.to_string()),
        run_time: Some("720".to_string()),
        kwh,
        ..Default::default()
    }
}
