//! Integration tests for AccountRepository, the table authenticator and seeding.

use anyhow::Result;
use plantdata::auth::{Authenticator, Role, TableAuthenticator};
use plantdata::config::AuthMode;
use plantdata::repositories::{AccountError, AccountRepository};
use plantdata::seeds::seed_accounts;

#[path = "test_utils/mod.rs"]
mod test_utils;
use test_utils::{setup_test_db, test_config};

#[tokio::test]
async fn created_accounts_store_hashes_not_passwords() -> Result<()> {
    let db = setup_test_db().await?;
    let repo = AccountRepository::new(&db);

    let user = repo.create_plant_user("plant1", "plant123").await?;
    assert_eq!(user.plant_name, "plant1");
    assert_ne!(user.password_hash, "plant123");
    assert!(user.password_hash.starts_with("$argon2"));

    let found = repo.find_plant_user("plant1").await?.expect("plant user exists");
    assert_eq!(found.id, user.id);
    assert!(repo.find_admin_user("plant1").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn duplicate_identity_is_a_conflict() -> Result<()> {
    let db = setup_test_db().await?;
    let repo = AccountRepository::new(&db);

    repo.create_admin_user("admin", "admin123").await?;
    let err = repo
        .create_admin_user("admin", "another-password")
        .await
        .expect_err("duplicate admin rejected");
    assert!(matches!(
        err,
        AccountError::Duplicate {
            role: Role::Admin,
            ..
        }
    ));

    // The same name is still free for the other role.
    repo.create_plant_user("admin", "plant-password").await?;
    Ok(())
}

#[tokio::test]
async fn weak_or_blank_input_is_rejected() -> Result<()> {
    let db = setup_test_db().await?;
    let repo = AccountRepository::new(&db);

    assert!(matches!(
        repo.create_plant_user("plant1", "short").await,
        Err(AccountError::WeakPassword(_))
    ));
    assert!(matches!(
        repo.create_plant_user("   ", "long-enough-password").await,
        Err(AccountError::EmptyIdentity { role: Role::Plant })
    ));
    assert!(repo.list_plant_users().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn table_authenticator_checks_hashed_passwords() -> Result<()> {
    let db = setup_test_db().await?;
    let repo = AccountRepository::new(&db);
    repo.create_plant_user("plant1", "plant123").await?;
    repo.create_admin_user("admin", "admin123").await?;

    let auth = TableAuthenticator::new(db.clone());
    assert_eq!(auth.mode(), AuthMode::Table);
    assert!(auth.check(Role::Plant, "plant1", "plant123").await?);
    assert!(auth.check(Role::Admin, "admin", "admin123").await?);
    assert!(!auth.check(Role::Plant, "plant1", "wrong-password").await?);
    assert!(!auth.check(Role::Admin, "plant1", "plant123").await?);
    assert!(!auth.check(Role::Plant, "nobody", "plant123").await?);
    Ok(())
}

#[tokio::test]
async fn set_password_replaces_the_old_one() -> Result<()> {
    let db = setup_test_db().await?;
    let repo = AccountRepository::new(&db);
    repo.create_admin_user("admin", "admin123").await?;

    assert!(repo.set_password(Role::Admin, "admin", "rotated-secret").await?);
    assert!(!repo.set_password(Role::Admin, "ghost", "rotated-secret").await?);

    let auth = TableAuthenticator::new(db.clone());
    assert!(!auth.check(Role::Admin, "admin", "admin123").await?);
    assert!(auth.check(Role::Admin, "admin", "rotated-secret").await?);
    Ok(())
}

#[tokio::test]
async fn seeding_is_idempotent_and_keeps_existing_passwords() -> Result<()> {
    let db = setup_test_db().await?;
    let config = test_config(AuthMode::Table);

    let first = seed_accounts(&db, &config).await?;
    assert_eq!(first.created.len(), 2);
    assert!(first.skipped.is_empty());

    let repo = AccountRepository::new(&db);
    repo.set_password(Role::Plant, "plant1", "changed-by-operator").await?;

    let second = seed_accounts(&db, &config).await?;
    assert!(second.created.is_empty());
    assert_eq!(second.skipped.len(), 2);

    let auth = TableAuthenticator::new(db.clone());
    assert!(auth.check(Role::Plant, "plant1", "changed-by-operator").await?);
    assert_eq!(repo.list_admin_users().await?, vec!["admin".to_string()]);
    Ok(())
}

#[tokio::test]
async fn concurrent_creates_of_one_identity_yield_one_duplicate() -> Result<()> {
    let db = setup_test_db().await?;
    let first = AccountRepository::new(&db);
    let second = AccountRepository::new(&db);

    let (a, b) = tokio::join!(
        first.create(Role::Plant, "north", "north-password"),
        second.create(Role::Plant, "north", "north-password"),
    );

    let outcomes = [a, b];
    assert_eq!(outcomes.iter().filter(|result| result.is_ok()).count(), 1);
    assert!(outcomes.iter().any(|result| matches!(
        result,
        Err(AccountError::Duplicate {
            role: Role::Plant,
            ..
        })
    )));
    assert_eq!(
        AccountRepository::new(&db).list_plant_users().await?,
        vec!["north".to_string()]
    );
    Ok(())
}

#[tokio::test]
async fn concurrent_seeding_both_succeed() -> Result<()> {
    let db = setup_test_db().await?;
    let config = test_config(AuthMode::Table);

    let (a, b) = tokio::join!(seed_accounts(&db, &config), seed_accounts(&db, &config));
    let (a, b) = (a?, b?);

    assert_eq!(a.created.len() + b.created.len(), 2);
    assert_eq!(a.skipped.len() + b.skipped.len(), 2);
    Ok(())
}
