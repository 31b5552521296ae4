//! # Server Configuration
//!
//! Router assembly and startup for the plant data service.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::FromRef,
    middleware,
    routing::get,
};
use sea_orm::DatabaseConnection;
use tower_http::trace::TraceLayer;

use crate::auth::Authenticator;
use crate::config::AppConfig;
use crate::handlers;
use crate::session::SessionStore;
use crate::telemetry::trace_context_middleware;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
    pub sessions: SessionStore,
    pub authenticator: Arc<dyn Authenticator>,
}

impl AppState {
    /// Build state with a session store keyed from the configured secret.
    pub fn new(
        config: Arc<AppConfig>,
        db: DatabaseConnection,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        let sessions = SessionStore::new(
            config.effective_session_secret(),
            config.session_cookie_secure,
            Duration::from_secs(config.session_max_age_secs),
        );
        Self {
            config,
            db,
            sessions,
            authenticator,
        }
    }
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.config)
    }
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::plant_login_form).post(handlers::plant_login),
        )
        .route("/plant-logout", get(handlers::plant_logout))
        .route("/form", get(handlers::record_form))
        .route("/submit", axum::routing::post(handlers::submit_record))
        .route(
            "/login",
            get(handlers::admin_login_form).post(handlers::admin_login),
        )
        .route(
            "/admin-login",
            get(handlers::admin_login_form).post(handlers::admin_login),
        )
        .route("/logout", get(handlers::logout))
        .route("/admin", get(handlers::list_records))
        .route("/export", get(handlers::export_records))
        .route(
            "/edit/{id}",
            get(handlers::edit_record_form).post(handlers::edit_record),
        )
        .route(
            "/delete/{id}",
            get(handlers::delete_record).post(handlers::delete_record),
        )
        .route("/healthz", get(handlers::healthz))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_context_middleware))
}

/// Starts the server with the given configuration
pub async fn run_server(
    config: AppConfig,
    db: DatabaseConnection,
    authenticator: Arc<dyn Authenticator>,
) -> anyhow::Result<()> {
    let addr = config
        .bind_addr()
        .map_err(|e| anyhow::anyhow!("Invalid server address: {}", e))?;
    let profile = config.profile.clone();
    let auth_mode = authenticator.mode();

    let state = AppState::new(Arc::new(config), db, authenticator);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, %profile, %auth_mode, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
    }
}
