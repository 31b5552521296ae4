//! # Authentication and Authorization
//!
//! Role-gated access for the two audiences of the service: plant operators
//! submitting monthly data and administrators managing it. Guarded handlers
//! take a [`RequirePlant`] or [`RequireAdmin`] extractor; a request without
//! the matching session flag is redirected to that role's login page.

pub mod credentials;
pub mod password;

use std::fmt;

use axum::{extract::FromRequestParts, http::request::Parts, response::Redirect};
use serde::{Deserialize, Serialize};

use crate::server::AppState;
use crate::session::Session;

pub use credentials::{
    Authenticator, StaticAuthenticator, TableAuthenticator, build_authenticator,
};

/// Login page for plant operators.
pub const PLANT_LOGIN_PATH: &str = "/";
/// Login page for administrators.
pub const ADMIN_LOGIN_PATH: &str = "/login";

/// The two authenticated audiences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Plant,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Plant => "plant",
            Role::Admin => "admin",
        }
    }

    /// Where an unauthenticated request for this role is sent.
    pub fn login_path(self) -> &'static str {
        match self {
            Role::Plant => PLANT_LOGIN_PATH,
            Role::Admin => ADMIN_LOGIN_PATH,
        }
    }

    /// Message flashed after a failed login attempt.
    pub fn login_failure_message(self) -> &'static str {
        match self {
            Role::Plant => "Invalid plant name or password",
            Role::Admin => "Invalid username or password",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session of a logged-in plant operator
#[derive(Debug, Clone)]
pub struct RequirePlant(pub Session);

/// Session of a logged-in administrator
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub Session);

fn deny(role: Role, parts: &Parts) -> Redirect {
    tracing::debug!(
        role = %role,
        path = %parts.uri.path(),
        "Session lacks role; redirecting to login"
    );
    Redirect::to(role.login_path())
}

impl FromRequestParts<AppState> for RequirePlant {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = state.sessions.load(&parts.headers);
        if session.plant {
            Ok(RequirePlant(session))
        } else {
            Err(deny(Role::Plant, parts))
        }
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = state.sessions.load(&parts.headers);
        if session.admin {
            Ok(RequireAdmin(session))
        } else {
            Err(deny(Role::Admin, parts))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
        response::Response,
        routing::get,
    };
    use tower::ServiceExt;

    use crate::config::AppConfig;
    use crate::session::SESSION_COOKIE;

    fn test_state() -> AppState {
        let config = Arc::new(AppConfig::default());
        let authenticator = Arc::new(StaticAuthenticator::new(
            ("admin".to_string(), "admin-password".to_string()),
            ("plant1".to_string(), "plant-password".to_string()),
        ));
        AppState::new(config, sea_orm::DatabaseConnection::default(), authenticator)
    }

    async fn call(state: AppState, uri: &str, session: Option<Session>) -> Response {
        async fn plant_only(RequirePlant(session): RequirePlant) -> String {
            session.plant_name.unwrap_or_default()
        }
        async fn admin_only(RequireAdmin(session): RequireAdmin) -> String {
            session.admin_name.unwrap_or_default()
        }

        let mut request = Request::builder().uri(uri);
        if let Some(session) = session {
            let value = state.sessions.encode(&session).unwrap();
            request = request.header(header::COOKIE, format!("{}={}", SESSION_COOKIE, value));
        }

        Router::new()
            .route("/plant", get(plant_only))
            .route("/admin", get(admin_only))
            .with_state(state)
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn anonymous_plant_request_redirects_to_plant_login() {
        let response = call(test_state(), "/plant", None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], PLANT_LOGIN_PATH);
    }

    #[tokio::test]
    async fn anonymous_admin_request_redirects_to_admin_login() {
        let response = call(test_state(), "/admin", None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], ADMIN_LOGIN_PATH);
    }

    #[tokio::test]
    async fn plant_session_does_not_grant_admin() {
        let mut session = Session::default();
        session.login_plant("plant1");

        let ok = call(test_state(), "/plant", Some(session.clone())).await;
        assert_eq!(ok.status(), StatusCode::OK);

        let denied = call(test_state(), "/admin", Some(session)).await;
        assert_eq!(denied.status(), StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn admin_session_passes_admin_guard() {
        let mut session = Session::default();
        session.login_admin("admin");

        let response = call(test_state(), "/admin", Some(session)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn role_login_paths() {
        assert_eq!(Role::Plant.login_path(), "/");
        assert_eq!(Role::Admin.login_path(), "/login");
        assert_eq!(Role::Admin.to_string(), "admin");
    }
}
