//! Migration to create the plants table.
//!
//! One row per monthly submission from a plant operator. Numeric metrics are
//! nullable so that blank form inputs can be stored as NULL.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Plants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Plants::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Plants::PlantName).text().null())
                    .col(ColumnDef::new(Plants::Month).text().null())
                    .col(ColumnDef::new(Plants::RunTime).text().null())
                    .col(ColumnDef::new(Plants::Fb).text().null())
                    .col(ColumnDef::new(Plants::TotalProduction).double().null())
                    .col(ColumnDef::new(Plants::TotalGas).double().null())
                    .col(ColumnDef::new(Plants::TotalSale).double().null())
                    .col(ColumnDef::new(Plants::Kwh).double().null())
                    .col(ColumnDef::new(Plants::ProdBreakdown).text().null())
                    .col(ColumnDef::new(Plants::MaintBreakdown).text().null())
                    .col(ColumnDef::new(Plants::TotalLoad).double().null())
                    .col(ColumnDef::new(Plants::Dg).text().null())
                    .col(ColumnDef::new(Plants::Diesel).double().null())
                    .col(ColumnDef::new(Plants::ElectricityBill).double().null())
                    .col(
                        ColumnDef::new(Plants::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Admin listing is always newest first
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_plants_created_at")
                    .table(Plants::Table)
                    .col(Plants::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Plants::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Plants {
    Table,
    Id,
    PlantName,
    Month,
    RunTime,
    Fb,
    TotalProduction,
    TotalGas,
    TotalSale,
    Kwh,
    ProdBreakdown,
    MaintBreakdown,
    TotalLoad,
    Dg,
    Diesel,
    ElectricityBill,
    CreatedAt,
}
