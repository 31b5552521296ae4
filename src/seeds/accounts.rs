//! Bootstrap account seeding
//!
//! Creates the admin and plant accounts named in configuration when they do
//! not exist yet. Existing accounts, including their passwords, are left
//! untouched.

use anyhow::Result;
use sea_orm::DatabaseConnection;

use crate::auth::Role;
use crate::config::AppConfig;
use crate::repositories::{AccountError, AccountRepository};

/// Outcome of a seeding pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub created: Vec<(Role, String)>,
    pub skipped: Vec<(Role, String)>,
}

/// Seeds the credential tables from `PLANTDATA_ADMIN_*` and `PLANTDATA_PLANT_*`.
pub async fn seed_accounts(db: &DatabaseConnection, config: &AppConfig) -> Result<SeedReport> {
    let repo = AccountRepository::new(db);
    let mut report = SeedReport::default();

    let configured = [
        (Role::Admin, config.admin_credentials()),
        (Role::Plant, config.plant_credentials()),
    ];

    for (role, credentials) in configured {
        let Some((identity, password)) = credentials else {
            continue;
        };

        if repo.exists(role, identity).await? {
            log::info!("{} account '{}' already exists, skipping", role, identity);
            report.skipped.push((role, identity.to_string()));
            continue;
        }

        match repo.create(role, identity, password).await {
            Ok(_) => {
                log::info!("Seeded {} account '{}'", role, identity);
                report.created.push((role, identity.to_string()));
            }
            // Another instance seeded it between the check and the insert.
            Err(AccountError::Duplicate { .. }) => {
                report.skipped.push((role, identity.to_string()));
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(report)
}
