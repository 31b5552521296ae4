//! Database migrations for the plant data service.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2025_12_01_000001_create_plants;
mod m2025_12_01_000002_create_plant_users;
mod m2025_12_01_000003_create_admin_users;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2025_12_01_000001_create_plants::Migration),
            Box::new(m2025_12_01_000002_create_plant_users::Migration),
            Box::new(m2025_12_01_000003_create_admin_users::Migration),
        ]
    }
}
