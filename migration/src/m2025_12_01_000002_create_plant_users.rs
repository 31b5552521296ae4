//! Migration to create the plant_users table.
//!
//! Stores operator credentials keyed by plant name. Passwords are stored as
//! Argon2id PHC strings, never in plaintext.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PlantUsers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlantUsers::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PlantUsers::PlantName)
                            .text()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(PlantUsers::PasswordHash).text().not_null())
                    .col(
                        ColumnDef::new(PlantUsers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PlantUsers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PlantUsers {
    Table,
    Id,
    PlantName,
    PasswordHash,
    CreatedAt,
}
