//! # Plant Data Main Entry Point
//!
//! Loads configuration, prepares the database and serves the web interface.

use anyhow::Context;
use migration::{Migrator, MigratorTrait};
use plantdata::{
    auth::build_authenticator,
    config::{AuthMode, ConfigLoader},
    db::init_pool,
    seeds::seed_accounts,
    server::run_server,
    telemetry::init_tracing,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::new()
        .load()
        .context("failed to load configuration")?;

    init_tracing(&config)?;

    tracing::info!(profile = %config.profile, "Loaded configuration");
    if let Ok(redacted_json) = config.redacted_json() {
        tracing::debug!(config = %redacted_json, "Effective configuration");
    }
    if config.session_secret.is_none() {
        tracing::warn!("No session secret configured; using the development secret");
    }

    let db = init_pool(&config).await?;
    Migrator::up(&db, None)
        .await
        .context("failed to run database migrations")?;

    if config.auth_mode == AuthMode::Table {
        let report = seed_accounts(&db, &config).await?;
        tracing::info!(
            created = report.created.len(),
            skipped = report.skipped.len(),
            "Seeded bootstrap accounts"
        );
    }

    let authenticator = build_authenticator(&config, db.clone())?;
    run_server(config, db, authenticator).await
}
