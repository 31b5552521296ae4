//! Credential checking for plant and admin logins.
//!
//! Two backends sit behind the [`Authenticator`] trait: a static pair per role
//! taken from configuration, and the `plant_users` / `admin_users` tables with
//! Argon2id password hashes.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use subtle::ConstantTimeEq;

use super::Role;
use super::password::verify_password;
use crate::config::{AppConfig, AuthMode, ConfigError};
use crate::repositories::AccountRepository;

/// Checks a submitted identity and password for a role.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Returns `Ok(true)` only when the pair matches a known account for `role`.
    async fn check(&self, role: Role, identity: &str, secret: &str) -> anyhow::Result<bool>;

    fn mode(&self) -> AuthMode;
}

/// One configured identity/password pair per role.
pub struct StaticAuthenticator {
    admin: (String, String),
    plant: (String, String),
}

impl StaticAuthenticator {
    pub fn new(admin: (String, String), plant: (String, String)) -> Self {
        Self { admin, plant }
    }
}

impl std::fmt::Debug for StaticAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticAuthenticator")
            .field("admin", &self.admin.0)
            .field("plant", &self.plant.0)
            .finish_non_exhaustive()
    }
}

fn constant_time_eq(left: &str, right: &str) -> bool {
    ConstantTimeEq::ct_eq(left.as_bytes(), right.as_bytes()).into()
}

#[async_trait]
impl Authenticator for StaticAuthenticator {
    async fn check(&self, role: Role, identity: &str, secret: &str) -> anyhow::Result<bool> {
        if identity.is_empty() || secret.is_empty() {
            return Ok(false);
        }

        let (expected_identity, expected_secret) = match role {
            Role::Admin => &self.admin,
            Role::Plant => &self.plant,
        };

        // Evaluate both halves so timing does not reveal which one differed.
        let identity_ok = constant_time_eq(identity, expected_identity);
        let secret_ok = constant_time_eq(secret, expected_secret);
        Ok(identity_ok & secret_ok)
    }

    fn mode(&self) -> AuthMode {
        AuthMode::Static
    }
}

/// Accounts stored in the credential tables.
#[derive(Debug, Clone)]
pub struct TableAuthenticator {
    db: DatabaseConnection,
}

impl TableAuthenticator {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Authenticator for TableAuthenticator {
    async fn check(&self, role: Role, identity: &str, secret: &str) -> anyhow::Result<bool> {
        if identity.is_empty() || secret.is_empty() {
            return Ok(false);
        }

        let repo = AccountRepository::new(&self.db);
        let Some(stored_hash) = repo.password_hash(role, identity).await? else {
            return Ok(false);
        };

        verify_password(secret, &stored_hash).map_err(|e| anyhow::anyhow!(e))
    }

    fn mode(&self) -> AuthMode {
        AuthMode::Table
    }
}

/// Build the authenticator selected by `config.auth_mode`.
pub fn build_authenticator(
    config: &AppConfig,
    db: DatabaseConnection,
) -> Result<Arc<dyn Authenticator>, ConfigError> {
    match config.auth_mode {
        AuthMode::Table => Ok(Arc::new(TableAuthenticator::new(db))),
        AuthMode::Static => {
            let (admin_user, admin_pass) = config
                .admin_credentials()
                .ok_or(ConfigError::MissingStaticCredentials { role: "admin" })?;
            let (plant_user, plant_pass) = config
                .plant_credentials()
                .ok_or(ConfigError::MissingStaticCredentials { role: "plant" })?;
            Ok(Arc::new(StaticAuthenticator::new(
                (admin_user.to_string(), admin_pass.to_string()),
                (plant_user.to_string(), plant_pass.to_string()),
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn static_auth() -> StaticAuthenticator {
        StaticAuthenticator::new(
            ("admin".to_string(), "admin123".to_string()),
            ("plant1".to_string(), "plant123".to_string()),
        )
    }

    #[tokio::test]
    async fn static_pairs_are_role_specific() {
        let auth = static_auth();
        assert!(auth.check(Role::Plant, "plant1", "plant123").await.unwrap());
        assert!(auth.check(Role::Admin, "admin", "admin123").await.unwrap());
        assert!(!auth.check(Role::Admin, "plant1", "plant123").await.unwrap());
        assert!(!auth.check(Role::Plant, "admin", "admin123").await.unwrap());
    }

    #[tokio::test]
    async fn static_rejects_wrong_or_empty_input() {
        let auth = static_auth();
        assert!(!auth.check(Role::Plant, "plant1", "wrong").await.unwrap());
        assert!(!auth.check(Role::Plant, "", "").await.unwrap());
        assert!(!auth.check(Role::Admin, "admin", "").await.unwrap());
    }

    #[test]
    fn static_mode_requires_both_pairs() {
        let config = AppConfig {
            auth_mode: AuthMode::Static,
            admin_user: Some("admin".to_string()),
            admin_pass: Some("admin123".to_string()),
            ..Default::default()
        };
        let result = build_authenticator(&config, DatabaseConnection::default());
        assert!(matches!(
            result,
            Err(ConfigError::MissingStaticCredentials { role: "plant" })
        ));
    }

    #[test]
    fn debug_output_hides_passwords() {
        let rendered = format!("{:?}", static_auth());
        assert!(rendered.contains("plant1"));
        assert!(!rendered.contains("plant123"));
    }
}
