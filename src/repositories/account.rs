//! # Account Repository
//!
//! Credential rows for plant operators (`plant_users`) and administrators
//! (`admin_users`). Passwords are hashed with Argon2id before they reach the
//! database and are never read back in plaintext.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use thiserror::Error;

use crate::auth::Role;
use crate::auth::password::{hash_password, validate_password_strength};
use crate::db::is_unique_violation;
use crate::models::admin_user::{self, Entity as AdminUser};
use crate::models::plant_user::{self, Entity as PlantUser};

/// Minimum password length accepted for new or changed credentials.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Errors from account management
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{role} account '{identity}' already exists")]
    Duplicate { role: Role, identity: String },
    #[error("{role} identity must not be empty")]
    EmptyIdentity { role: Role },
    #[error("{0}")]
    WeakPassword(String),
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Repository for credential rows
pub struct AccountRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> AccountRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a credential row for the given role, returning its id.
    pub async fn create(
        &self,
        role: Role,
        identity: &str,
        password: &str,
    ) -> Result<i32, AccountError> {
        match role {
            Role::Plant => Ok(self.create_plant_user(identity, password).await?.id),
            Role::Admin => Ok(self.create_admin_user(identity, password).await?.id),
        }
    }

    pub async fn create_plant_user(
        &self,
        plant_name: &str,
        password: &str,
    ) -> Result<plant_user::Model, AccountError> {
        let plant_name = plant_name.trim();
        let password_hash = self.prepare(Role::Plant, plant_name, password).await?;

        let user = plant_user::ActiveModel {
            plant_name: Set(plant_name.to_string()),
            password_hash: Set(password_hash),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };
        let created = user
            .insert(self.db)
            .await
            .map_err(|err| duplicate_or(err, Role::Plant, plant_name))?;

        tracing::info!(plant_name = %created.plant_name, "Created plant user");
        Ok(created)
    }

    pub async fn create_admin_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<admin_user::Model, AccountError> {
        let username = username.trim();
        let password_hash = self.prepare(Role::Admin, username, password).await?;

        let user = admin_user::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(password_hash),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };
        let created = user
            .insert(self.db)
            .await
            .map_err(|err| duplicate_or(err, Role::Admin, username))?;

        tracing::info!(username = %created.username, "Created admin user");
        Ok(created)
    }

    pub async fn find_plant_user(&self, plant_name: &str) -> Result<Option<plant_user::Model>, DbErr> {
        PlantUser::find()
            .filter(plant_user::Column::PlantName.eq(plant_name))
            .one(self.db)
            .await
    }

    pub async fn find_admin_user(&self, username: &str) -> Result<Option<admin_user::Model>, DbErr> {
        AdminUser::find()
            .filter(admin_user::Column::Username.eq(username))
            .one(self.db)
            .await
    }

    /// Stored password hash for an identity, if the account exists.
    pub async fn password_hash(&self, role: Role, identity: &str) -> Result<Option<String>, DbErr> {
        Ok(match role {
            Role::Plant => self
                .find_plant_user(identity)
                .await?
                .map(|user| user.password_hash),
            Role::Admin => self
                .find_admin_user(identity)
                .await?
                .map(|user| user.password_hash),
        })
    }

    pub async fn exists(&self, role: Role, identity: &str) -> Result<bool, DbErr> {
        Ok(self.password_hash(role, identity).await?.is_some())
    }

    /// Identities for a role, alphabetically.
    pub async fn list(&self, role: Role) -> Result<Vec<String>, DbErr> {
        Ok(match role {
            Role::Plant => PlantUser::find()
                .order_by_asc(plant_user::Column::PlantName)
                .all(self.db)
                .await?
                .into_iter()
                .map(|user| user.plant_name)
                .collect(),
            Role::Admin => AdminUser::find()
                .order_by_asc(admin_user::Column::Username)
                .all(self.db)
                .await?
                .into_iter()
                .map(|user| user.username)
                .collect(),
        })
    }

    pub async fn list_plant_users(&self) -> Result<Vec<String>, DbErr> {
        self.list(Role::Plant).await
    }

    pub async fn list_admin_users(&self) -> Result<Vec<String>, DbErr> {
        self.list(Role::Admin).await
    }

    /// Replace the password of an existing account. Returns `false` when no such account exists.
    pub async fn set_password(
        &self,
        role: Role,
        identity: &str,
        password: &str,
    ) -> Result<bool, AccountError> {
        validate_password_strength(password, MIN_PASSWORD_LEN)
            .map_err(AccountError::WeakPassword)?;
        let password_hash =
            hash_password(password).map_err(|e| AccountError::Hash(e.to_string()))?;

        let updated = match role {
            Role::Plant => match self.find_plant_user(identity).await? {
                Some(user) => {
                    let mut active: plant_user::ActiveModel = user.into();
                    active.password_hash = Set(password_hash);
                    active.update(self.db).await?;
                    true
                }
                None => false,
            },
            Role::Admin => match self.find_admin_user(identity).await? {
                Some(user) => {
                    let mut active: admin_user::ActiveModel = user.into();
                    active.password_hash = Set(password_hash);
                    active.update(self.db).await?;
                    true
                }
                None => false,
            },
        };

        if updated {
            tracing::info!(%role, identity, "Password changed");
        }
        Ok(updated)
    }

    /// Validate a new account and hash its password.
    async fn prepare(
        &self,
        role: Role,
        identity: &str,
        password: &str,
    ) -> Result<String, AccountError> {
        if identity.is_empty() {
            return Err(AccountError::EmptyIdentity { role });
        }
        validate_password_strength(password, MIN_PASSWORD_LEN)
            .map_err(AccountError::WeakPassword)?;
        if self.exists(role, identity).await? {
            return Err(AccountError::Duplicate {
                role,
                identity: identity.to_string(),
            });
        }
        hash_password(password).map_err(|e| AccountError::Hash(e.to_string()))
    }
}

/// A concurrent insert of the same identity loses on the UNIQUE index.
fn duplicate_or(err: DbErr, role: Role, identity: &str) -> AccountError {
    if is_unique_violation(&err) {
        AccountError::Duplicate {
            role,
            identity: identity.to_string(),
        }
    } else {
        AccountError::Database(err)
    }
}
