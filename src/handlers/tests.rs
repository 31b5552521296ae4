//! # Tests for Handlers
//!
//! Unit tests for the shared page helpers and the health check.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{StatusCode, header::SET_COOKIE},
};
use sea_orm::Database;

use crate::auth::StaticAuthenticator;
use crate::config::AppConfig;
use crate::handlers::{healthz, redirect_with_session, render_with_flashes};
use crate::server::AppState;
use crate::session::{FlashLevel, Session};

fn state_with(db: sea_orm::DatabaseConnection) -> AppState {
    let authenticator = Arc::new(StaticAuthenticator::new(
        ("admin".to_string(), "admin123".to_string()),
        ("plant1".to_string(), "plant123".to_string()),
    ));
    AppState::new(Arc::new(AppConfig::default()), db, authenticator)
}

#[tokio::test]
async fn page_without_flashes_leaves_cookie_alone() {
    let state = state_with(sea_orm::DatabaseConnection::default());

    let response = render_with_flashes(&state, Session::default(), |flashes| {
        assert!(flashes.is_empty());
        "page".to_string()
    })
    .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(SET_COOKIE).is_none());
}

#[tokio::test]
async fn page_with_flashes_clears_them_from_the_cookie() {
    let state = state_with(sea_orm::DatabaseConnection::default());
    let mut session = Session::default();
    session.login_admin("admin");
    session.flash(FlashLevel::Success, "Record 1 updated");

    let response = render_with_flashes(&state, session, |flashes| {
        assert_eq!(flashes.len(), 1);
        flashes[0].message.clone()
    })
    .unwrap();

    let cookie = response.headers()[SET_COOKIE].to_str().unwrap();
    let value = cookie
        .split(';')
        .next()
        .and_then(|pair| pair.split_once('='))
        .map(|(_, value)| value)
        .unwrap();
    let stored = state.sessions.decode(value).unwrap();
    assert!(stored.admin);
    assert!(stored.flashes.is_empty());
}

#[tokio::test]
async fn redirect_carries_session_cookie() {
    let state = state_with(sea_orm::DatabaseConnection::default());
    let mut session = Session::default();
    session.login_plant("plant1");

    let response = redirect_with_session(&state, &session, "/form").unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/form");
    assert!(response.headers().contains_key(SET_COOKIE));
}

#[tokio::test]
async fn healthz_reports_reachable_database() {
    let db = Database::connect("sqlite::memory:").await.unwrap();

    let (status, body) = healthz(State(state_with(db))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}
